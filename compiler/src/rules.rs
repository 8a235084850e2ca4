//! 境界規則文法のコンパイルモジュール
//!
//! このモジュールは、テキスト形式の規則文法(.rules)をバイナリ形式の
//! 規則表(.brk)へコンパイルする機能を提供します。

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::PathBuf;

use fugen::errors::FugenError;
use fugen::rules::compile_rules;

use clap::Parser;

/// 規則コンパイルコマンドの引数
#[derive(Parser, Debug)]
#[clap(name = "rules", about = "A program to compile a boundary rule grammar.")]
pub struct Args {
    /// Rule grammar file (.rules).
    #[clap(short = 'i', long)]
    rules_in: PathBuf,

    /// File to which the binary rule table is output (.brk).
    #[clap(short = 'o', long)]
    table_out: PathBuf,
}

/// 規則コンパイル中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 規則文法のコンパイルエラー
    #[error("Rule compilation failed: {0}")]
    Fugen(#[from] FugenError),
}

/// 規則コンパイルコマンドを実行する
///
/// 規則文法を読み込み、コンパイルした規則表をバイナリ形式で出力します。
///
/// # 引数
///
/// * `args` - 規則コンパイルコマンドの引数
///
/// # エラー
///
/// ファイルの読み書きや文法のコンパイルに失敗した場合、
/// `RulesError`を返します。
pub fn run(args: Args) -> Result<(), RulesError> {
    println!("Compiling the rule grammar...");
    let grammar = fs::read_to_string(&args.rules_in)?;
    let table = compile_rules(&grammar)?;

    println!("Writing the rule table...");
    let file = File::create(&args.table_out)?;
    let mut wtr = BufWriter::new(file);
    table.write(&mut wtr)?;

    println!(
        "Successfully compiled {} states and {} transitions into {}",
        table.num_states(),
        table.num_transitions(),
        args.table_out.display()
    );
    Ok(())
}
