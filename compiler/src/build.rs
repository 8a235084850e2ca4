//! 辞書のビルドモジュール
//!
//! このモジュールは、CSV形式の語彙リスト(words.csv)からバイナリ形式の
//! FST辞書を構築する機能を提供します。

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use fugen::errors::FugenError;
use fugen::DictionaryBuilder;

use clap::Parser;

/// ビルドコマンドの引数
#[derive(Parser, Debug)]
#[clap(name = "build", about = "A program to build the decompound dictionary.")]
pub struct Args {
    /// Lexicon file (words.csv), one `surface[,weight]` entry per line.
    #[clap(short = 'l', long)]
    lexicon_in: PathBuf,

    /// File to which the binary dictionary is output.
    #[clap(short = 'o', long)]
    dict_out: PathBuf,
}

/// ビルド処理中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 辞書構築エラー
    #[error("Dictionary building failed: {0}")]
    Fugen(#[from] FugenError),
}

/// ビルドコマンドを実行する
///
/// 語彙リストから辞書を構築し、バイナリ形式で出力します。
///
/// # 引数
///
/// * `args` - ビルドコマンドの引数
///
/// # エラー
///
/// ファイルの読み書きや辞書構築に失敗した場合、`BuildError`を返します。
pub fn run(args: Args) -> Result<(), BuildError> {
    println!("Compiling the dictionary...");
    let dict = DictionaryBuilder::from_reader(File::open(&args.lexicon_in)?)?;

    println!("Writing the dictionary...");
    let file = File::create(&args.dict_out)?;
    let mut wtr = BufWriter::new(file);
    dict.write(&mut wtr)?;

    println!(
        "Successfully built {} words into {}",
        dict.num_words(),
        args.dict_out.display()
    );
    Ok(())
}
