//! Fugenの共通定数
//!
//! このモジュールは、セグメンタ全体で共有される既定値と上限値を定義します。

/// 入力語の最大文字数。
///
/// これを超える入力は病的なケース（ランダム文字列など）とみなし、
/// セグメンタは分割を行わず恒等トークンへフォールバックします。
pub const MAX_WORD_LENGTH: usize = u16::MAX as usize;

/// 部分語の最小文字数の既定値。
///
/// この長さ未満のセグメントを生む分割候補は破棄されます。
pub const DEFAULT_MIN_SUBWORD_LEN: usize = 2;

/// 1語あたりのセグメント数の既定上限。
///
/// 上限を超える分割は採用されず、恒等トークンへフォールバックします。
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// つなぎ字（Fugenelement）の既定の候補表。
///
/// ドイツ語圏の複合語で一般的な接合要素です。辞書や言語に応じて
/// [`Segmenter::glue_morphemes`](crate::Segmenter::glue_morphemes) で
/// 差し替えられます。
pub const DEFAULT_GLUE_MORPHEMES: &[&str] = &["nen", "ens", "es", "en", "er", "e", "n", "s"];

/// セグメント境界で常に読み飛ばされる区切り文字。
///
/// ハイフン付きの複合語（"Donau-Dampfschiff" など）を辞書形の
/// 連結として扱うために使用されます。
pub const SEPARATOR_CHARS: &[char] = &['-', '\u{2010}'];
