//! トークンの結果コンテナ
//!
//! このモジュールは、分割の結果として得られるトークンを表現する型を
//! 提供します。トークンは[`Worker`]が保持するデータへの軽量な参照で
//! あり、表層形、絶対オフセット、位置増分へのアクセスを提供します。

use std::ops::Range;

use crate::segmenter::worker::Worker;

/// 分割の結果トークン
///
/// このトークンは[`Worker`]への軽量な参照であり、実際のデータは
/// Workerが保持しています。トークンはWorkerが生存している間のみ
/// 有効です。
///
/// トークンからは以下の情報にアクセスできます：
/// - 表層形（元の語、または畳み込み済みの部分語）
/// - 元文書内での絶対文字オフセット
/// - 位置増分
pub struct Token<'w> {
    worker: &'w Worker,
    index: usize,
}

impl<'w> Token<'w> {
    #[inline(always)]
    pub(crate) const fn new(worker: &'w Worker, index: usize) -> Self {
        Self { worker, index }
    }

    /// トークンの表層形を取得します。
    ///
    /// 元の語のトークンは元の表記を保持し、部分語のトークンは
    /// 畳み込み済みの表記を持ちます。
    ///
    /// Gets the surface string of the token.
    #[inline(always)]
    pub fn surface(&self) -> &'w str {
        &self.worker.emitted(self.index).surface
    }

    /// 元文書内での開始文字オフセットを取得します。
    ///
    /// Gets the absolute start offset of the token in characters.
    #[inline(always)]
    pub fn start_offset(&self) -> usize {
        self.worker.emitted(self.index).start_offset
    }

    /// 元文書内での終端文字オフセットを取得します。
    ///
    /// Gets the absolute end offset of the token in characters.
    #[inline(always)]
    pub fn end_offset(&self) -> usize {
        self.worker.emitted(self.index).end_offset
    }

    /// トークンの位置増分を取得します。
    ///
    /// Gets the position increment of the token.
    #[inline(always)]
    pub fn position_increment(&self) -> u32 {
        self.worker.emitted(self.index).position_increment
    }

    /// 語内での文字位置範囲を取得します。
    ///
    /// Gets the position range of the token within the input word.
    #[inline(always)]
    pub fn range_char(&self) -> Range<usize> {
        self.worker.emitted(self.index).range_char.clone()
    }

    /// 語内でのバイト位置範囲を取得します。
    ///
    /// Gets the position range of the token within the input word
    /// in bytes.
    #[inline(always)]
    pub fn range_byte(&self) -> Range<usize> {
        let word = self.worker.word();
        let range = &self.worker.emitted(self.index).range_char;
        word.byte_position(range.start)..word.byte_position(range.end)
    }

    /// このトークンが元の語そのものかどうかを返します。
    ///
    /// Returns whether this token is the unsplit original word.
    #[inline(always)]
    pub fn is_original(&self) -> bool {
        self.worker.emitted(self.index).original
    }

    /// このトークンビューを所有型の[`TokenBuf`]に変換します。
    ///
    /// スレッド間でトークン情報を送信したり、長期保存する際に有用です。
    pub fn to_buf(&self) -> TokenBuf {
        TokenBuf {
            surface: self.surface().to_string(),
            start_offset: self.start_offset(),
            end_offset: self.end_offset(),
            position_increment: self.position_increment(),
        }
    }
}

impl std::fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("surface", &self.surface())
            .field("start_offset", &self.start_offset())
            .field("end_offset", &self.end_offset())
            .field("position_increment", &self.position_increment())
            .field("is_original", &self.is_original())
            .finish()
    }
}

/// トークンのイテレータ
///
/// 分割の結果得られたトークン列を順次取得するためのイテレータです。
/// 前方および後方からの走査をサポートしています
/// （[`DoubleEndedIterator`]を実装）。
///
/// Iterator of tokens.
pub struct TokenIter<'w> {
    worker: &'w Worker,
    front: usize,
    back: usize,
}

impl<'w> TokenIter<'w> {
    #[inline(always)]
    pub(crate) fn new(worker: &'w Worker) -> Self {
        let num_tokens = worker.num_tokens();
        Self {
            worker,
            front: 0,
            back: num_tokens,
        }
    }
}

impl<'w> Iterator for TokenIter<'w> {
    type Item = Token<'w>;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            let t = self.worker.token(self.front);
            self.front += 1;
            Some(t)
        } else {
            None
        }
    }
}

impl<'w> DoubleEndedIterator for TokenIter<'w> {
    #[inline(always)]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            self.back -= 1;
            let t = self.worker.token(self.back);
            Some(t)
        } else {
            None
        }
    }
}

/// 所有型の自己完結したトークン
///
/// このトークンは[`Token`]の所有型版です。分割の結果を長期保存したり、
/// スレッド間で送信する際に有用です。
///
/// An owned, self-contained token.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TokenBuf {
    /// トークンの表層形
    ///
    /// The surface string of the token.
    pub surface: String,

    /// 元文書内での開始文字オフセット
    ///
    /// The absolute start offset of the token in characters.
    pub start_offset: usize,

    /// 元文書内での終端文字オフセット
    ///
    /// The absolute end offset of the token in characters.
    pub end_offset: usize,

    /// 位置増分
    ///
    /// The position increment of the token.
    pub position_increment: u32,
}

impl<'w> From<Token<'w>> for TokenBuf {
    fn from(token: Token<'w>) -> Self {
        token.to_buf()
    }
}

#[cfg(test)]
mod tests {
    use crate::dictionary::{Dictionary, DictionaryBuilder};
    use crate::segmenter::Segmenter;

    #[test]
    fn test_iter() {
        let lexicon_csv = "donau,4\ndampf,3\nschiff,5";
        let inner = DictionaryBuilder::from_reader(lexicon_csv.as_bytes()).unwrap();

        let mut buffer = Vec::new();
        inner.write(&mut buffer).unwrap();
        let dict = Dictionary::read(buffer.as_slice()).unwrap();

        let segmenter = Segmenter::new(dict);
        let mut worker = segmenter.new_worker();
        worker.reset_word("Donaudampfschiff", 0);
        worker.decompound();
        assert_eq!(worker.num_tokens(), 4);

        let mut it = worker.token_iter();
        for i in 0..worker.num_tokens() {
            let lhs = worker.token(i);
            let rhs = it.next().unwrap();
            assert_eq!(lhs.surface(), rhs.surface());
        }
        assert!(it.next().is_none());
    }

    #[test]
    fn test_iter_rev() {
        let lexicon_csv = "donau,4\ndampf,3\nschiff,5";
        let inner = DictionaryBuilder::from_reader(lexicon_csv.as_bytes()).unwrap();
        let dict = Dictionary::from_inner(inner);

        let segmenter = Segmenter::new(dict);
        let mut worker = segmenter.new_worker();
        worker.reset_word("Donaudampfschiff", 0);
        worker.decompound();

        let surfaces: Vec<String> = worker
            .token_iter()
            .rev()
            .map(|t| t.surface().to_string())
            .collect();
        assert_eq!(surfaces, vec!["schiff", "dampf", "donau", "Donaudampfschiff"]);
    }
}
