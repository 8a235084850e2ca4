//! 最良パス探索に基づくセグメンタ。
//!
//! このモジュールは、複合語分割のためのメインセグメンタを提供します。
//! 入力語の各文字位置で辞書の前方一致検索を行い、動的計画法で
//! 最適な形態素列への分割を求めます。
//!
//! # 主要な構造体
//!
//! - [`Segmenter`]: 分割を実行するメインセグメンタ構造体
//! - [`Worker`]: セグメンタのワーカー。実際の分割処理を行う
//!
//! # 例
//!
//! ```no_run
//! use fugen::{Dictionary, Segmenter};
//!
//! let dict = Dictionary::from_path("path/to/dict.fst")?;
//! let segmenter = Segmenter::new(dict);
//! let mut worker = segmenter.new_worker();
//!
//! worker.reset_word("Jahresfeier", 0);
//! worker.decompound();
//!
//! for token in worker.token_iter() {
//!     println!("{}", token.surface());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub(crate) mod chart;
pub mod worker;

use std::sync::Arc;

use crate::common::{
    DEFAULT_GLUE_MORPHEMES, DEFAULT_MAX_DEPTH, DEFAULT_MIN_SUBWORD_LEN, SEPARATOR_CHARS,
};
use crate::dictionary::Dictionary;
use crate::segmenter::chart::{Chart, StepKind};
use crate::segmenter::worker::Worker;
use crate::word::{fold_char, Word};

/// 複合語分割を行うセグメンタ。
///
/// `Segmenter`は辞書データと分割の設定を保持し、複数の[`Worker`]
/// インスタンスを生成して並列処理を行うことができます。
///
/// 分割できない入力に対してエラーを発生させることはありません。
/// 有効な分割が見つからない語は元のまま1トークンとして出力されます。
///
/// # 例
///
/// ```no_run
/// use fugen::{Dictionary, Segmenter};
///
/// let dict = Dictionary::from_path("path/to/dict.fst")?;
/// let segmenter = Segmenter::new(dict)
///     .min_subword_len(3)
///     .preserve_original(false);
/// let mut worker = segmenter.new_worker();
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct Segmenter {
    dict: Arc<Dictionary>,
    min_subword_len: usize,
    max_depth: usize,
    preserve_original: bool,
    respect_keywords: bool,
    glue_morphemes: Arc<[Vec<char>]>,
}

impl Segmenter {
    /// 新しいセグメンタを作成します。
    ///
    /// 辞書はセグメンタに所有権が移動します。複数のセグメンタ間で
    /// 辞書を共有する必要がある場合は、
    /// [`Segmenter::from_shared_dictionary`]を使用してください。
    ///
    /// # 引数
    ///
    /// * `dict` - 分割に使用する辞書
    pub fn new(dict: Dictionary) -> Self {
        Self::from_shared_dictionary(Arc::new(dict))
    }

    /// 共有された辞書から新しいセグメンタを作成します。
    ///
    /// これは、複数のセグメンタインスタンスが辞書データを再読み込み
    /// することなく同じ辞書データを共有する必要があるマルチスレッド
    /// シナリオで便利です。
    ///
    /// # 引数
    ///
    /// * `dict` - 共有される辞書への`Arc`参照
    pub fn from_shared_dictionary(dict: Arc<Dictionary>) -> Self {
        Self {
            dict,
            min_subword_len: DEFAULT_MIN_SUBWORD_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
            preserve_original: true,
            respect_keywords: false,
            glue_morphemes: Self::fold_glue(DEFAULT_GLUE_MORPHEMES.iter()),
        }
    }

    /// 部分語の最小文字数を指定します。
    ///
    /// この長さ未満のセグメントを生む分割候補は破棄されます。
    /// 0が指定された場合は1として扱われます。
    ///
    /// # 引数
    ///
    /// * `len` - 部分語の最小文字数（デフォルトは2）
    pub fn min_subword_len(mut self, len: usize) -> Self {
        self.min_subword_len = len.max(1);
        self
    }

    /// 1語あたりのセグメント数の上限を指定します。
    ///
    /// 上限を超える分割は採用されず、元の語のまま出力されます。
    /// 0が指定された場合は既定値に戻ります。
    ///
    /// # 引数
    ///
    /// * `depth` - セグメント数の上限（デフォルトは5）
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = if depth == 0 { DEFAULT_MAX_DEPTH } else { depth };
        self
    }

    /// 元の語を出力に含めるかどうかを設定します。
    ///
    /// `true`の場合、元の表層形が最初に出力され、部分語はすべて
    /// 位置増分0で同じ位置に重ねられます。`false`の場合は部分語のみが
    /// 出力され、先頭の部分語が位置増分1を持ちます。
    ///
    /// # 引数
    ///
    /// * `yes` - 元の語を保持する場合は`true`（デフォルト）
    pub const fn preserve_original(mut self, yes: bool) -> Self {
        self.preserve_original = yes;
        self
    }

    /// キーワードトークンの分割をスキップするかどうかを設定します。
    ///
    /// `true`の場合、上流でキーワードとしてマークされたトークン
    /// （[`Worker::set_keyword`]）は分割されません。
    ///
    /// # 引数
    ///
    /// * `yes` - キーワードを尊重する場合は`true`（デフォルトは`false`）
    pub const fn respect_keywords(mut self, yes: bool) -> Self {
        self.respect_keywords = yes;
        self
    }

    /// つなぎ字（Fugenelement）の候補表を差し替えます。
    ///
    /// 照合は畳み込み済みの文字列で行われます。空の表を渡すと
    /// つなぎ字処理は無効になります。
    ///
    /// # 引数
    ///
    /// * `morphemes` - つなぎ字の候補列
    pub fn glue_morphemes<I, S>(mut self, morphemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.glue_morphemes = Self::fold_glue(morphemes);
        self
    }

    fn fold_glue<I, S>(morphemes: I) -> Arc<[Vec<char>]>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        morphemes
            .into_iter()
            .map(|m| m.as_ref().chars().map(fold_char).collect())
            .filter(|m: &Vec<char>| !m.is_empty())
            .collect()
    }

    /// 元の語を出力に含める設定かどうかを返します。
    #[inline(always)]
    pub(crate) const fn preserves_original(&self) -> bool {
        self.preserve_original
    }

    /// キーワードを尊重する設定かどうかを返します。
    #[inline(always)]
    pub(crate) const fn respects_keywords(&self) -> bool {
        self.respect_keywords
    }

    /// 部分語の最小文字数を返します。
    #[inline(always)]
    pub(crate) const fn min_len(&self) -> usize {
        self.min_subword_len
    }

    /// 新しいワーカーを作成します。
    ///
    /// ワーカーは実際の分割処理を実行するために使用されます。
    /// 各ワーカーは独立したチャート構造を保持するため、複数の
    /// ワーカーを並列に使用して同時に複数の語を処理できます。
    ///
    /// # 戻り値
    ///
    /// 新しい[`Worker`]インスタンス
    pub fn new_worker(&self) -> Worker {
        Worker::new(self.clone())
    }

    /// チャート構造を構築します。
    ///
    /// 位置を左から右へ確定させながら、各位置からの辞書セグメントと
    /// 読み飛ばしエッジを挿入します。
    ///
    /// # 引数
    ///
    /// * `word` - 入力語
    /// * `chart` - 構築するチャート構造
    pub(crate) fn build_chart(&self, word: &Word, chart: &mut Chart) {
        let folded = word.folded();
        let len_char = folded.len();
        chart.reset(len_char);

        for start in 0..len_char {
            if !chart.is_reachable(start) {
                continue;
            }

            // Skip edges never open a word or close a word. A glue
            // skip binds to the morpheme before it, so it cannot
            // follow a separator or another glue skip.
            match chart.step_kind(start) {
                StepKind::Segment => {
                    self.add_glue_edges(folded, chart, start);
                    self.add_separator_edge(folded, chart, start);
                }
                StepKind::Glue | StepKind::Separator => {
                    self.add_separator_edge(folded, chart, start);
                }
                StepKind::Root => {}
            }

            for m in self.dict.common_prefix_iterator(&folded[start..]) {
                if m.end_char < self.min_subword_len {
                    continue;
                }
                chart.insert_segment(start, start + m.end_char, m.weight, self.max_depth);
            }
        }
    }

    /// つなぎ字の読み飛ばしエッジを挿入します。
    ///
    /// 長さの異なる候補は異なる位置へ到達するため、一致した候補は
    /// すべて挿入されます。
    fn add_glue_edges(&self, folded: &[char], chart: &mut Chart, start: usize) {
        for glue in self.glue_morphemes.iter() {
            let end = start + glue.len();
            if end >= folded.len() {
                continue;
            }
            if folded[start..end] == glue[..] {
                chart.insert_skip(start, end, StepKind::Glue);
            }
        }
    }

    /// 区切り文字（ハイフン等）の読み飛ばしエッジを挿入します。
    fn add_separator_edge(&self, folded: &[char], chart: &mut Chart, start: usize) {
        if start + 1 < folded.len() && SEPARATOR_CHARS.contains(&folded[start]) {
            chart.insert_skip(start, start + 1, StepKind::Separator);
        }
    }
}
