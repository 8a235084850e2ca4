//! 辞書の検査モジュール
//!
//! このモジュールは、構築済みのバイナリ辞書を読み込み、ヘッダと
//! 統計情報を表示する機能を提供します。

use std::io;
use std::path::PathBuf;

use fugen::errors::FugenError;
use fugen::Dictionary;

use clap::Parser;

/// 検査コマンドの引数
#[derive(Parser, Debug)]
#[clap(name = "inspect", about = "A program to inspect a compiled dictionary.")]
pub struct Args {
    /// Compiled dictionary file.
    #[clap(short = 'i', long)]
    dict_in: PathBuf,
}

/// 検査中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 辞書の読み込みエラー
    #[error("Dictionary loading failed: {0}")]
    Fugen(#[from] FugenError),
}

/// 検査コマンドを実行する
///
/// 辞書を読み込んで統計情報を標準出力へ表示します。読み込み自体が
/// フォーマット検証を兼ねます。
///
/// # 引数
///
/// * `args` - 検査コマンドの引数
pub fn run(args: Args) -> Result<(), InspectError> {
    let dict = Dictionary::from_path(&args.dict_in)?;
    println!("dictionary: {}", args.dict_in.display());
    println!("words: {}", dict.num_words());
    println!("states: {}", dict.num_states());
    println!("transitions: {}", dict.num_transitions());
    Ok(())
}
