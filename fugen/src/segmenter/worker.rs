//! 分割処理のためのルーチンを提供するモジュール。
//!
//! このモジュールは、複合語分割のための主要なワーカー構造体を提供します。
//! ワーカーは内部データ構造を保持し、再利用することで不要なメモリ
//! アロケーションを避けます。

use crate::common::MAX_WORD_LENGTH;
use crate::emitter::{self, EmittedToken};
use crate::segmenter::chart::{Chart, Span};
use crate::segmenter::Segmenter;
use crate::token::{Token, TokenIter};
use crate::word::Word;

/// 分割処理のためのルーチンを提供する構造体。
///
/// 分割に使用される内部データ構造を保持し、それらを再利用することで
/// 不要なメモリ再割り当てを回避します。
///
/// # 例
///
/// ```ignore
/// let mut worker = segmenter.new_worker();
/// worker.reset_word("Rechtsanwaltskanzleien", 0);
/// worker.decompound();
/// for token in worker.token_iter() {
///     println!("{}", token.surface());
/// }
/// ```
pub struct Worker {
    segmenter: Segmenter,
    word: Word,
    chart: Chart,
    spans: Vec<Span>,
    tokens: Vec<EmittedToken>,
    keyword: bool,
}

impl Worker {
    /// 新しいインスタンスを作成します。
    ///
    /// # 引数
    ///
    /// * `segmenter` - 使用するセグメンタ
    pub(crate) fn new(segmenter: Segmenter) -> Self {
        Self {
            segmenter,
            word: Word::new(),
            chart: Chart::default(),
            spans: vec![],
            tokens: vec![],
            keyword: false,
        }
    }

    /// 分割する入力語をリセットします。
    ///
    /// 新しい語を設定し、以前の状態（キーワードフラグを含む）を
    /// クリアします。
    ///
    /// # 引数
    ///
    /// * `surface` - 分割する語の表層形
    /// * `start_offset` - 元文書内でのこの語の開始文字オフセット
    pub fn reset_word<S>(&mut self, surface: S, start_offset: usize)
    where
        S: AsRef<str>,
    {
        self.word.clear();
        self.tokens.clear();
        self.spans.clear();
        self.keyword = false;
        let surface = surface.as_ref();
        if !surface.is_empty() {
            self.word.set_word(surface, start_offset);
        }
    }

    /// 現在の語をキーワードとしてマークします。
    ///
    /// セグメンタが[`respect_keywords`](Segmenter::respect_keywords)で
    /// 構成されている場合、キーワードの語は分割されずそのまま
    /// 出力されます。
    ///
    /// # 引数
    ///
    /// * `yes` - キーワードとしてマークする場合は`true`
    pub fn set_keyword(&mut self, yes: bool) {
        self.keyword = yes;
    }

    /// 設定された入力語を分割します。
    ///
    /// 分割結果は内部状態に保存され、`token_iter()`や`token()`
    /// メソッドでアクセスできます。空の語が設定されている場合は
    /// 何も行いません。
    ///
    /// 有効な分割（2セグメント以上）が見つからない場合、元の語が
    /// そのまま1トークンとして出力されます。この処理がエラーを
    /// 返すことはありません。
    pub fn decompound(&mut self) {
        self.tokens.clear();
        self.spans.clear();
        let len_char = self.word.len_char();
        if len_char == 0 {
            return;
        }

        if self.keyword && self.segmenter.respects_keywords() {
            emitter::emit_identity(&self.word, &mut self.tokens);
            return;
        }

        // Length guards: too-long inputs are pathological, too-short
        // inputs cannot contain two subwords.
        if len_char > MAX_WORD_LENGTH || len_char < self.segmenter.min_len() * 2 {
            emitter::emit_identity(&self.word, &mut self.tokens);
            return;
        }

        self.segmenter.build_chart(&self.word, &mut self.chart);
        if !self.chart.append_best_spans(&mut self.spans) || self.spans.len() < 2 {
            emitter::emit_identity(&self.word, &mut self.tokens);
            return;
        }

        emitter::emit_decomposition(
            &self.word,
            &self.spans,
            self.segmenter.preserves_original(),
            &mut self.tokens,
        );
    }

    /// 分割結果のトークン数を取得します。
    #[inline(always)]
    pub fn num_tokens(&self) -> usize {
        self.tokens.len()
    }

    /// `i`番目のトークンを取得します。
    ///
    /// # 引数
    ///
    /// * `i` - トークンのインデックス（0から始まる）
    #[inline(always)]
    pub fn token<'w>(&'w self, i: usize) -> Token<'w> {
        Token::new(self, i)
    }

    /// 分割結果のイテレータを作成します。
    #[inline(always)]
    pub fn token_iter<'w>(&'w self) -> TokenIter<'w> {
        TokenIter::new(self)
    }

    /// `i`番目の出力レコードへの参照を返します。
    #[inline(always)]
    pub(crate) fn emitted(&self, i: usize) -> &EmittedToken {
        &self.tokens[i]
    }

    /// 現在の入力語への参照を返します。
    #[inline(always)]
    pub(crate) fn word(&self) -> &Word {
        &self.word
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{Dictionary, DictionaryBuilder};

    fn build_segmenter(lexicon_csv: &str) -> Segmenter {
        let inner = DictionaryBuilder::from_reader(lexicon_csv.as_bytes()).unwrap();
        Segmenter::new(Dictionary::from_inner(inner))
    }

    fn surfaces(worker: &Worker) -> Vec<String> {
        worker
            .token_iter()
            .map(|t| t.surface().to_string())
            .collect()
    }

    #[test]
    fn test_decompound_basic() {
        let segmenter = build_segmenter("donau,4\ndampf,3\nschiff,5");
        let mut worker = segmenter.new_worker();
        worker.reset_word("Donaudampfschiff", 0);
        worker.decompound();
        assert_eq!(
            surfaces(&worker),
            vec!["Donaudampfschiff", "donau", "dampf", "schiff"]
        );

        {
            let t = worker.token(0);
            assert_eq!(t.start_offset(), 0);
            assert_eq!(t.end_offset(), 16);
            assert_eq!(t.position_increment(), 1);
            assert!(t.is_original());
        }
        {
            let t = worker.token(2);
            assert_eq!(t.surface(), "dampf");
            assert_eq!(t.start_offset(), 5);
            assert_eq!(t.end_offset(), 10);
            assert_eq!(t.position_increment(), 0);
            assert!(!t.is_original());
        }
    }

    #[test]
    fn test_decompound_empty() {
        let segmenter = build_segmenter("donau,4");
        let mut worker = segmenter.new_worker();
        worker.reset_word("", 0);
        worker.decompound();
        assert_eq!(worker.num_tokens(), 0);
    }

    #[test]
    fn test_decompound_unknown_word() {
        let segmenter = build_segmenter("donau,4");
        let mut worker = segmenter.new_worker();
        worker.reset_word("xyzzy", 3);
        worker.decompound();
        assert_eq!(surfaces(&worker), vec!["xyzzy"]);
        let t = worker.token(0);
        assert_eq!(t.start_offset(), 3);
        assert_eq!(t.end_offset(), 8);
    }

    #[test]
    fn test_decompound_single_dictionary_word() {
        // The whole word itself is in the dictionary; a one-segment
        // decomposition is not a split.
        let segmenter = build_segmenter("schiff,5");
        let mut worker = segmenter.new_worker();
        worker.reset_word("Schiff", 0);
        worker.decompound();
        assert_eq!(surfaces(&worker), vec!["Schiff"]);
    }

    #[test]
    fn test_decompound_short_word() {
        let segmenter = build_segmenter("ab,1\ncd,1");
        let mut worker = segmenter.new_worker();
        // Shorter than twice the minimum subword length.
        worker.reset_word("abc", 0);
        worker.decompound();
        assert_eq!(surfaces(&worker), vec!["abc"]);
    }

    #[test]
    fn test_decompound_keyword() {
        let segmenter = build_segmenter("donau,4\ndampf,3\nschiff,5").respect_keywords(true);
        let mut worker = segmenter.new_worker();
        worker.reset_word("Donaudampfschiff", 0);
        worker.set_keyword(true);
        worker.decompound();
        assert_eq!(surfaces(&worker), vec!["Donaudampfschiff"]);

        // The flag is cleared by the next reset.
        worker.reset_word("Donaudampfschiff", 0);
        worker.decompound();
        assert_eq!(worker.num_tokens(), 4);
    }

    #[test]
    fn test_decompound_multibyte_ranges() {
        let segmenter = build_segmenter("ökos,2\nteuer,3");
        let mut worker = segmenter.new_worker();
        worker.reset_word("Ökosteuer", 0);
        worker.decompound();
        assert_eq!(surfaces(&worker), vec!["Ökosteuer", "ökos", "teuer"]);
        {
            let t = worker.token(1);
            assert_eq!(t.range_char(), 0..4);
            // 'Ö' occupies two bytes.
            assert_eq!(t.range_byte(), 0..5);
        }
        {
            let t = worker.token(2);
            assert_eq!(t.range_char(), 4..9);
            assert_eq!(t.range_byte(), 5..10);
        }
    }

    #[test]
    fn test_decompound_subwords_only() {
        let segmenter = build_segmenter("jahres,2\nfeier,3").preserve_original(false);
        let mut worker = segmenter.new_worker();
        worker.reset_word("Jahresfeier", 0);
        worker.decompound();
        assert_eq!(surfaces(&worker), vec!["jahres", "feier"]);
        assert_eq!(worker.token(0).position_increment(), 1);
        assert_eq!(worker.token(1).position_increment(), 0);
    }

    #[test]
    fn test_decompound_glue() {
        let segmenter = build_segmenter("arbeit,2\nplatz,3");
        let mut worker = segmenter.new_worker();
        worker.reset_word("Arbeitsplatz", 0);
        worker.decompound();
        assert_eq!(surfaces(&worker), vec!["Arbeitsplatz", "arbeit", "platz"]);
        // The glue 's' occupies the offset gap between the subwords.
        assert_eq!(worker.token(1).end_offset(), 6);
        assert_eq!(worker.token(2).start_offset(), 7);
    }

    #[test]
    fn test_decompound_hyphenated() {
        let segmenter = build_segmenter("donau,4\ndampf,3\nschiff,5");
        let mut worker = segmenter.new_worker();
        worker.reset_word("Donau-Dampfschiff", 0);
        worker.decompound();
        assert_eq!(
            surfaces(&worker),
            vec!["Donau-Dampfschiff", "donau", "dampf", "schiff"]
        );
    }

    #[test]
    fn test_decompound_prefers_direct_split_over_glue() {
        // "jahres" is a dictionary stem; no glue step is needed.
        let segmenter = build_segmenter("jahr,1\njahres,2\nfeier,3");
        let mut worker = segmenter.new_worker();
        worker.reset_word("Jahresfeier", 0);
        worker.decompound();
        assert_eq!(surfaces(&worker), vec!["Jahresfeier", "jahres", "feier"]);
    }

    #[test]
    fn test_decompound_max_depth_fallback() {
        let segmenter = build_segmenter("ab,1\ncd,1\nef,1").max_depth(2);
        let mut worker = segmenter.new_worker();
        worker.reset_word("abcdef", 0);
        worker.decompound();
        // Three segments would be needed; beyond the bound the
        // engine degrades to no split.
        assert_eq!(surfaces(&worker), vec!["abcdef"]);
    }

    #[test]
    fn test_decompound_min_subword_len() {
        let segmenter = build_segmenter("a,1\nbcde,1\nab,1\ncde,1").min_subword_len(2);
        let mut worker = segmenter.new_worker();
        worker.reset_word("abcde", 0);
        worker.decompound();
        // "a" + "bcde" is rejected by the length threshold.
        assert_eq!(surfaces(&worker), vec!["abcde", "ab", "cde"]);
    }
}
