//! Fugen 辞書・規則表コンパイラのメインエントリーポイント
//!
//! このモジュールは、複合語分割用のリソースをビルドするための
//! サブコマンドを提供します。語彙リストからの辞書構築、境界規則
//! 文法のコンパイル、構築済み辞書の検査を統合したCLIツールです。

mod build;
mod inspect;
mod rules;

use clap::Parser;
use thiserror::Error;

use crate::{build::BuildError, inspect::InspectError, rules::RulesError};

/// コマンドライン引数の構造体
///
/// `clap`を使用してコマンドライン引数をパースします。
#[derive(Parser, Debug)]
#[clap(name = "compile", version)]
struct Cli {
    /// 実行するサブコマンド
    #[clap(subcommand)]
    command: Command,
}

/// 利用可能なサブコマンド
#[derive(Parser, Debug)]
enum Command {
    /// 語彙リストからバイナリ辞書を構築します
    ///
    /// CSV形式の語彙リスト(words.csv)からFST辞書を生成します。
    Build(build::Args),

    /// 境界規則文法をコンパイルします
    ///
    /// テキスト形式の規則文法(.rules)からバイナリ規則表(.brk)を生成します。
    Rules(rules::Args),

    /// 構築済み辞書の統計情報を表示します
    Inspect(inspect::Args),
}

/// コンパイラの実行中に発生する可能性のあるエラー
///
/// 各サブコマンドで発生したエラーをラップします。
#[derive(Debug, Error)]
pub enum CompileError {
    /// 辞書ビルド中のエラー
    #[error(transparent)]
    BuildError(#[from] BuildError),
    /// 規則表コンパイル中のエラー
    #[error(transparent)]
    RulesError(#[from] RulesError),
    /// 辞書検査中のエラー
    #[error(transparent)]
    InspectError(#[from] InspectError),
}

/// メイン関数
///
/// コマンドライン引数をパースし、指定されたサブコマンドを実行します。
fn main() -> Result<(), CompileError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Build(args) => Ok(build::run(args)?),
        Command::Rules(args) => Ok(rules::run(args)?),
        Command::Inspect(args) => Ok(inspect::run(args)?),
    }
}
