//! 分割結果をトークン列へ変換するエミッタ
//!
//! このモジュールは、採用された分割候補をホストのインデクシング
//! パイプラインへ渡すトークン列に変換します。オフセットは元文書内の
//! 絶対文字位置で、位置増分は検索インデックスの慣例に従います。
//! 隣接する同一表層形の除去は下流の`unique`ステージに委ねられ、
//! ここでは行いません。

use crate::segmenter::chart::Span;
use crate::word::Word;

/// 出力トークンの内部レコード。
///
/// [`Token`](crate::token::Token)ビューが参照する実データです。
#[derive(Debug, Clone)]
pub(crate) struct EmittedToken {
    /// トークンの表層形
    pub surface: String,
    /// 語内での文字位置範囲
    pub range_char: std::ops::Range<usize>,
    /// 元文書内での開始文字オフセット
    pub start_offset: usize,
    /// 元文書内での終端文字オフセット
    pub end_offset: usize,
    /// 位置増分
    pub position_increment: u32,
    /// 元の語そのものかどうか
    pub original: bool,
}

/// 入力語を分割せず、そのまま1トークンとして出力します。
pub(crate) fn emit_identity(word: &Word, out: &mut Vec<EmittedToken>) {
    let len_char = word.len_char();
    out.push(EmittedToken {
        surface: word.surface().to_string(),
        range_char: 0..len_char,
        start_offset: word.base_offset(),
        end_offset: word.base_offset() + len_char,
        position_increment: 1,
        original: true,
    });
}

/// 採用された分割候補をトークン列へ変換します。
///
/// `preserve_original`が`true`の場合、元の表層形が位置増分1で最初に
/// 出力され、続く部分語はすべて位置増分0で同じ位置に重ねられます。
/// `false`の場合は部分語のみが出力され、先頭の部分語が位置増分1を
/// 持ちます。
///
/// 部分語の表層形は畳み込み済みの文字で出力されます。複合語の構成
/// 要素は慣例として小文字でインデックスされるためです。つなぎ字は
/// どのセグメントにも属さず、隣接するトークンのオフセットの間隙と
/// して現れます。
pub(crate) fn emit_decomposition(
    word: &Word,
    spans: &[Span],
    preserve_original: bool,
    out: &mut Vec<EmittedToken>,
) {
    debug_assert!(!spans.is_empty());
    let base = word.base_offset();

    if preserve_original {
        emit_identity(word, out);
    }

    let folded = word.folded();
    for (i, span) in spans.iter().enumerate() {
        let first = i == 0;
        out.push(EmittedToken {
            surface: folded[span.start_char..span.end_char].iter().collect(),
            range_char: span.start_char..span.end_char,
            start_offset: base + span.start_char,
            end_offset: base + span.end_char,
            position_increment: u32::from(!preserve_original && first),
            original: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(ranges: &[(usize, usize)]) -> Vec<Span> {
        ranges
            .iter()
            .map(|&(start_char, end_char)| Span {
                start_char,
                end_char,
            })
            .collect()
    }

    #[test]
    fn test_emit_identity() {
        let mut word = Word::new();
        word.set_word("xyzzy", 10);
        let mut out = vec![];
        emit_identity(&word, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].surface, "xyzzy");
        assert_eq!(out[0].start_offset, 10);
        assert_eq!(out[0].end_offset, 15);
        assert_eq!(out[0].position_increment, 1);
        assert!(out[0].original);
    }

    #[test]
    fn test_emit_with_original() {
        let mut word = Word::new();
        word.set_word("Jahresfeier", 4);
        let mut out = vec![];
        emit_decomposition(&word, &spans(&[(0, 6), (6, 11)]), true, &mut out);

        let surfaces: Vec<&str> = out.iter().map(|t| t.surface.as_str()).collect();
        assert_eq!(surfaces, vec!["Jahresfeier", "jahres", "feier"]);
        let increments: Vec<u32> = out.iter().map(|t| t.position_increment).collect();
        assert_eq!(increments, vec![1, 0, 0]);
        assert_eq!(out[1].start_offset, 4);
        assert_eq!(out[1].end_offset, 10);
        assert_eq!(out[2].start_offset, 10);
        assert_eq!(out[2].end_offset, 15);
    }

    #[test]
    fn test_emit_subwords_only() {
        let mut word = Word::new();
        word.set_word("Donaudampfschiff", 0);
        let mut out = vec![];
        emit_decomposition(&word, &spans(&[(0, 5), (5, 10), (10, 16)]), false, &mut out);

        let surfaces: Vec<&str> = out.iter().map(|t| t.surface.as_str()).collect();
        assert_eq!(surfaces, vec!["donau", "dampf", "schiff"]);
        let increments: Vec<u32> = out.iter().map(|t| t.position_increment).collect();
        assert_eq!(increments, vec![1, 0, 0]);
    }

    #[test]
    fn test_emit_glue_gap() {
        let mut word = Word::new();
        word.set_word("Arbeitsplatz", 0);
        let mut out = vec![];
        // "arbeit" + glue "s" + "platz"
        emit_decomposition(&word, &spans(&[(0, 6), (7, 12)]), true, &mut out);
        assert_eq!(out[1].end_offset, 6);
        assert_eq!(out[2].start_offset, 7);
    }
}
