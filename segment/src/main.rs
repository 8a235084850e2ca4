//! 複合語分割を実行するユーティリティ
//!
//! このバイナリは、標準入力から読み込んだテキストを空白区切りの語として
//! 分割し、指定された出力形式（plain、detail）で結果を出力します。

use std::error::Error;
use std::io::{BufRead, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use fugen::{Dictionary, Segmenter};

use clap::Parser;

/// 出力モード
#[derive(Clone, Debug)]
enum OutputMode {
    Plain,
    Detail,
}

/// `OutputMode` の `FromStr` 実装
impl FromStr for OutputMode {
    type Err = &'static str;

    /// 文字列から出力モードをパースする
    ///
    /// # 引数
    ///
    /// * `mode` - パース対象の文字列（"plain"、"detail"のいずれか）
    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "plain" => Ok(Self::Plain),
            "detail" => Ok(Self::Detail),
            _ => Err("Could not parse a mode"),
        }
    }
}

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "segment", about = "Decompounds words")]
struct Args {
    /// Compiled dictionary file.
    #[clap(short = 'i', long)]
    dict: PathBuf,

    /// Output mode. Choices are plain and detail.
    #[clap(short = 'O', long, default_value = "plain")]
    output_mode: OutputMode,

    /// Emits subwords only, without the original token.
    #[clap(long)]
    no_original: bool,

    /// Minimum length of a subword in characters.
    #[clap(short = 'm', long)]
    min_subword_len: Option<usize>,

    /// Maximum number of segments per word.
    #[clap(short = 'd', long)]
    max_depth: Option<usize>,
}

/// メイン関数
///
/// 辞書をロードし、標準入力から読み込んだテキストを語ごとに分割して、
/// 指定された形式で結果を標準出力に出力します。
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    eprintln!("Loading the dictionary...");
    let dict = Dictionary::from_path(&args.dict)?;

    let segmenter = Segmenter::new(dict)
        .preserve_original(!args.no_original)
        .min_subword_len(args.min_subword_len.unwrap_or(2))
        .max_depth(args.max_depth.unwrap_or(0));
    let mut worker = segmenter.new_worker();

    eprintln!("Ready to segment");

    let is_tty = atty::is(atty::Stream::Stdout);

    let out = std::io::stdout();
    let mut out = BufWriter::new(out.lock());
    let lines = std::io::stdin().lock().lines();
    for line in lines {
        let line = line?;
        let mut offset = 0;
        for word in line.split(char::is_whitespace) {
            if word.is_empty() {
                offset += 1;
                continue;
            }
            worker.reset_word(word, offset);
            worker.decompound();
            match args.output_mode {
                OutputMode::Plain => {
                    for (i, token) in worker.token_iter().enumerate() {
                        if i != 0 {
                            out.write_all(b" ")?;
                        }
                        out.write_all(token.surface().as_bytes())?;
                    }
                    out.write_all(b"\n")?;
                }
                OutputMode::Detail => {
                    for token in worker.token_iter() {
                        writeln!(
                            &mut out,
                            "{}\t{}..{}\tposition_increment={}",
                            token.surface(),
                            token.start_offset(),
                            token.end_offset(),
                            token.position_increment(),
                        )?;
                    }
                    out.write_all(b"EOS\n")?;
                }
            }
            offset += word.chars().count() + 1;
        }
        if is_tty {
            out.flush()?;
        }
    }

    Ok(())
}
