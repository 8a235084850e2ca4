//! 状態遷移表による有限状態オートマトン
//!
//! このモジュールは、整数IDで添字付けされた状態のアリーナと
//! 状態ごとの遷移表からなる明示的なオートマトン表現を提供します。
//! ポインタグラフを持たないフラットな配列表現のため、そのまま
//! シリアライズでき、スレッド間で安全に共有できます。

use rkyv::{Archive, Deserialize, Serialize};

use crate::word::fold_char;

/// 開始状態のID。
pub(crate) const ROOT_STATE: u32 = 0;

/// オートマトン内の1状態。
///
/// 遷移はすべての状態で共有されるフラットな遷移配列のスライス
/// （`trans_offset` から `trans_len` 個）として保持されます。
#[derive(Archive, Serialize, Deserialize, Clone, Copy, Debug)]
pub(crate) struct FstState {
    /// 共有遷移配列内での開始位置
    pub trans_offset: u32,
    /// この状態から出る遷移の数
    pub trans_len: u32,
    /// 受理状態の場合の重み
    pub weight: i32,
    /// 受理状態かどうか
    pub is_final: bool,
}

/// ラベル付き遷移。
///
/// ラベルは畳み込み済み文字のコードポイントです。
/// 1状態内の遷移はラベル昇順に並びます。
#[derive(Archive, Serialize, Deserialize, Clone, Copy, Debug)]
pub(crate) struct FstTransition {
    /// 遷移ラベル（コードポイント）
    pub label: u32,
    /// 遷移先の状態ID
    pub target: u32,
}

/// 語形集合を受理する有限状態オートマトン。
///
/// 構築後は不変であり、ロックなしで並行に参照できます。
#[derive(Archive, Serialize, Deserialize)]
pub(crate) struct Fst {
    states: Vec<FstState>,
    transitions: Vec<FstTransition>,
}

/// 前方一致検索のマッチング結果
#[derive(Debug, Eq, PartialEq, Clone)]
pub(crate) struct FstMatch {
    /// マッチした語形の終端文字位置（検索開始位置からの文字数）
    pub end_char: usize,
    /// マッチした語形の辞書重み
    pub weight: i32,
}

impl Fst {
    pub(crate) fn from_parts(states: Vec<FstState>, transitions: Vec<FstTransition>) -> Self {
        Self {
            states,
            transitions,
        }
    }

    /// 状態数を返します。
    #[inline(always)]
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// 遷移数を返します。
    #[inline(always)]
    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// 状態 `state` から文字 `c` で遷移した先の状態を返します。
    ///
    /// 入力文字は照合前に畳み込まれます。遷移が存在しない場合は
    /// `None` を返します。
    #[inline(always)]
    pub fn step(&self, state: u32, c: char) -> Option<u32> {
        let s = &self.states[state as usize];
        let label = fold_char(c) as u32;
        let start = s.trans_offset as usize;
        let trans = &self.transitions[start..start + s.trans_len as usize];
        trans
            .binary_search_by_key(&label, |t| t.label)
            .ok()
            .map(|i| trans[i].target)
    }

    /// 状態が受理状態かどうかを返します。
    #[inline(always)]
    pub fn is_final(&self, state: u32) -> bool {
        self.states[state as usize].is_final
    }

    /// 受理状態の重みを返します。
    #[inline(always)]
    pub fn weight(&self, state: u32) -> i32 {
        self.states[state as usize].weight
    }

    /// 状態から出る遷移があるかどうかを返します。
    #[inline(always)]
    pub fn has_outgoing(&self, state: u32) -> bool {
        self.states[state as usize].trans_len != 0
    }

    /// 入力の接頭辞に一致する辞書語を列挙するイテレータを取得します。
    #[inline(always)]
    pub fn common_prefix_iterator<'a>(&'a self, suffix: &'a [char]) -> FstPrefixIter<'a> {
        FstPrefixIter {
            fst: self,
            suffix,
            state: ROOT_STATE,
            pos: 0,
        }
    }
}

/// 前方一致検索のイテレータ
///
/// 遷移が途切れた時点で探索を打ち切ります。
pub(crate) struct FstPrefixIter<'a> {
    fst: &'a Fst,
    suffix: &'a [char],
    state: u32,
    pos: usize,
}

impl Iterator for FstPrefixIter<'_> {
    type Item = FstMatch;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.suffix.len() {
            let next = self.fst.step(self.state, self.suffix[self.pos])?;
            self.state = next;
            self.pos += 1;
            if self.fst.is_final(next) {
                return Some(FstMatch {
                    end_char: self.pos,
                    weight: self.fst.weight(next),
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::builder::DictionaryBuilder;

    fn build_fst(words: &str) -> Fst {
        DictionaryBuilder::from_reader(words.as_bytes())
            .unwrap()
            .into_fst()
    }

    #[test]
    fn test_step_and_final() {
        let fst = build_fst("dampf,3\ndonau,4");
        let mut state = ROOT_STATE;
        for c in "dampf".chars() {
            state = fst.step(state, c).unwrap();
        }
        assert!(fst.is_final(state));
        assert_eq!(fst.weight(state), 3);
        assert!(!fst.has_outgoing(state));
    }

    #[test]
    fn test_step_folds_case() {
        let fst = build_fst("donau,4");
        let mut state = ROOT_STATE;
        for c in "DONAU".chars() {
            state = fst.step(state, c).unwrap();
        }
        assert!(fst.is_final(state));
    }

    #[test]
    fn test_common_prefix_iterator() {
        let fst = build_fst("jahr,1\njahres,2\njahreszeit,3");
        let input: Vec<char> = "jahreszeiten".chars().collect();
        let matches: Vec<FstMatch> = fst.common_prefix_iterator(&input).collect();
        assert_eq!(
            matches,
            vec![
                FstMatch {
                    end_char: 4,
                    weight: 1
                },
                FstMatch {
                    end_char: 6,
                    weight: 2
                },
                FstMatch {
                    end_char: 10,
                    weight: 3
                },
            ]
        );
    }

    #[test]
    fn test_common_prefix_iterator_no_match() {
        let fst = build_fst("donau,4");
        let input: Vec<char> = "xyzzy".chars().collect();
        assert!(fst.common_prefix_iterator(&input).next().is_none());
    }
}
