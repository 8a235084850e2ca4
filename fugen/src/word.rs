//! 入力語の内部表現を提供するモジュール
//!
//! このモジュールは、上流のトークナイザから渡された1語を分割処理の
//! ために保持する内部データ構造を提供します。元の表層形に加えて、
//! 辞書照合用の大文字小文字畳み込み済み文字列と、文字位置から
//! バイト位置へのマッピングを計算・保持します。

/// 1文字の大文字小文字畳み込みを行います。
///
/// 小文字化の結果が1文字に収まる場合のみ畳み込みを適用します。
/// 複数文字へ展開されるマッピングは文字数とオフセットの1対1対応を
/// 壊すため、元の文字をそのまま保持します。
#[inline(always)]
pub(crate) fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// 入力語の内部表現を保持する構造体
///
/// # フィールド
///
/// * `surface` - 元の表層形
/// * `base_offset` - 元文書内でのこの語の開始文字オフセット
/// * `folded` - 辞書照合用に畳み込んだ文字配列
/// * `c2b` - 文字位置からバイト位置へのマッピング配列
#[derive(Default, Clone, Debug)]
pub(crate) struct Word {
    surface: String,
    base_offset: usize,
    folded: Vec<char>,
    c2b: Vec<usize>,
}

impl Word {
    /// 新しい空の `Word` インスタンスを生成します
    pub fn new() -> Self {
        Self::default()
    }

    /// 内部状態をクリアします
    #[inline(always)]
    pub fn clear(&mut self) {
        self.surface.clear();
        self.base_offset = 0;
        self.folded.clear();
        self.c2b.clear();
    }

    /// 入力語を設定し、内部データ構造を構築します
    ///
    /// # 引数
    ///
    /// * `surface` - 設定する表層形
    /// * `base_offset` - 元文書内でのこの語の開始文字オフセット
    pub fn set_word<S>(&mut self, surface: S, base_offset: usize)
    where
        S: AsRef<str>,
    {
        self.clear();
        self.surface.push_str(surface.as_ref());
        self.base_offset = base_offset;
        for (bi, ch) in self.surface.char_indices() {
            self.folded.push(fold_char(ch));
            self.c2b.push(bi);
        }
        self.c2b.push(self.surface.len());
    }

    /// 元の表層形を返します。
    #[inline(always)]
    pub fn surface(&self) -> &str {
        &self.surface
    }

    /// 元文書内でのこの語の開始文字オフセットを返します。
    #[inline(always)]
    pub const fn base_offset(&self) -> usize {
        self.base_offset
    }

    /// 畳み込み済みの文字配列を返します。
    #[inline(always)]
    pub fn folded(&self) -> &[char] {
        &self.folded
    }

    /// 語の文字数を返します。
    #[inline(always)]
    pub fn len_char(&self) -> usize {
        self.folded.len()
    }

    /// 文字位置に対応するバイト位置を返します。
    #[inline(always)]
    pub fn byte_position(&self, pos_char: usize) -> usize {
        self.c2b[pos_char]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_word() {
        let mut word = Word::new();
        word.set_word("Ökosteuer", 7);
        assert_eq!(word.len_char(), 9);
        assert_eq!(word.base_offset(), 7);
        assert_eq!(word.surface(), "Ökosteuer");
        assert_eq!(word.folded()[0], 'ö');
        assert_eq!(word.byte_position(0), 0);
        // 'Ö' is two bytes in UTF-8.
        assert_eq!(word.byte_position(1), 2);
        assert_eq!(word.byte_position(9), "Ökosteuer".len());
    }

    #[test]
    fn test_fold_char_keeps_width() {
        assert_eq!(fold_char('A'), 'a');
        assert_eq!(fold_char('ß'), 'ß');
        // 'İ' lowercases to two chars; the original must be kept.
        assert_eq!(fold_char('İ'), 'İ');
    }

    #[test]
    fn test_clear() {
        let mut word = Word::new();
        word.set_word("schiff", 3);
        word.clear();
        assert_eq!(word.len_char(), 0);
        assert_eq!(word.surface(), "");
        assert_eq!(word.base_offset(), 0);
    }
}
