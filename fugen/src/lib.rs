//! # Fugen
//!
//! Fugenは、有限状態トランスデューサ（FST）辞書に基づく複合語分割
//! （デコンパウンディング）の実装です。
//!
//! ## 概要
//!
//! このライブラリは、検索インデクシングのために複合語を構成形態素へ
//! 分割する高速なセグメンタを提供します。ドイツ語のような複合語の多い
//! 言語では、"Donaudampfschiff" のような語を "donau" / "dampf" /
//! "schiff" に分割してインデックスすることで、部分語での検索が可能に
//! なります。
//!
//! ## 主な機能
//!
//! - **最良パス分割**: 位置ごとの動的計画法による最適な分割の探索
//! - **FST辞書**: 整数IDで添字付けされた状態遷移表による高速な前方一致検索
//! - **つなぎ字（Fugenelement）**: 形態素境界の接合文字の設定可能な処理
//! - **境界規則コンパイラ**: テキスト文法から境界判定用のバイナリ規則表を生成
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use fugen::{Dictionary, DictionaryBuilder, Segmenter};
//!
//! let lexicon_csv = "donau,4\ndampf,3\nschiff,5";
//!
//! let inner = DictionaryBuilder::from_reader(lexicon_csv.as_bytes())?;
//! let dict = Dictionary::from_inner(inner);
//!
//! let segmenter = Segmenter::new(dict);
//! let mut worker = segmenter.new_worker();
//!
//! worker.reset_word("Donaudampfschiff", 0);
//! worker.decompound();
//! assert_eq!(worker.num_tokens(), 4);
//!
//! let t0 = worker.token(0);
//! assert_eq!(t0.surface(), "Donaudampfschiff");
//! assert_eq!(t0.position_increment(), 1);
//!
//! let t1 = worker.token(1);
//! assert_eq!(t1.surface(), "donau");
//! assert_eq!(t1.start_offset(), 0);
//! assert_eq!(t1.end_offset(), 5);
//! assert_eq!(t1.position_increment(), 0);
//! # Ok(())
//! # }
//! ```

#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
compile_error!("`target_pointer_width` must be 32 or 64");

/// 共通の定数定義
pub mod common;

/// 辞書データ構造とビルダー
pub mod dictionary;

/// 分割結果をトークン列へ変換するエミッタ
pub(crate) mod emitter;

/// エラー型の定義
pub mod errors;

/// 境界規則文法のコンパイラ
pub mod rules;

/// セグメンタの実装
pub mod segmenter;

/// トークン型の定義
pub mod token;

/// 入力語の内部表現
mod word;


// Re-exports
pub use dictionary::{Acceptance, Dictionary, DictionaryBuilder};
pub use rules::{compile_rules, RuleTable};
pub use segmenter::Segmenter;

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
