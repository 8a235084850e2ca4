//! 規則パターンからの決定性オートマトン構築
//!
//! このモジュールは、解決済みの規則パターンをThompson構成法で
//! ε遷移付きの非決定性オートマトン（NFA）へ変換し、部分集合構成法で
//! 決定性オートマトン（DFA）へ変換します。遷移はコードポイント範囲で
//! ラベル付けされ、DFA構築時に互いに素な区間へ分割されます。

use hashbrown::HashMap;

use crate::rules::grammar::{Pattern, Rule};

/// NFA内の1状態。
#[derive(Default)]
struct NfaState {
    /// ε遷移の遷移先
    eps: Vec<u32>,
    /// 範囲ラベル付き遷移 `(lo, hi, target)`
    trans: Vec<(u32, u32, u32)>,
    /// 受理状態の場合の規則番号
    accept: Option<u32>,
}

/// 規則集合を受理する非決定性オートマトン。
pub(crate) struct Nfa {
    states: Vec<NfaState>,
    start: u32,
}

impl Nfa {
    /// 解決済みの規則列からNFAを構築します。
    ///
    /// 共通の開始状態から各規則の断片へε遷移を張り、各断片の
    /// 受理状態に規則番号を付与します。
    pub(crate) fn from_rules(rules: &[Rule]) -> Self {
        let mut nfa = Self {
            states: vec![],
            start: 0,
        };
        nfa.start = nfa.new_state();
        for rule in rules {
            let (frag_start, frag_end) = nfa.add_pattern(&rule.pattern);
            let start = nfa.start;
            nfa.states[start as usize].eps.push(frag_start);
            nfa.states[frag_end as usize].accept = Some(rule.id);
        }
        nfa
    }

    fn new_state(&mut self) -> u32 {
        let id = self.states.len() as u32;
        self.states.push(NfaState::default());
        id
    }

    /// Thompson構成法でパターンの断片を追加します。
    ///
    /// # 戻り値
    ///
    /// 断片の開始状態と終了状態の組
    fn add_pattern(&mut self, pattern: &Pattern) -> (u32, u32) {
        match pattern {
            Pattern::Ranges(ranges) => {
                let start = self.new_state();
                let end = self.new_state();
                for &(lo, hi) in ranges {
                    self.states[start as usize].trans.push((lo, hi, end));
                }
                (start, end)
            }
            Pattern::Concat(parts) => {
                let mut iter = parts.iter();
                let (start, mut end) = match iter.next() {
                    Some(first) => self.add_pattern(first),
                    None => {
                        let s = self.new_state();
                        (s, s)
                    }
                };
                for part in iter {
                    let (next_start, next_end) = self.add_pattern(part);
                    self.states[end as usize].eps.push(next_start);
                    end = next_end;
                }
                (start, end)
            }
            Pattern::Alt(branches) => {
                let start = self.new_state();
                let end = self.new_state();
                for branch in branches {
                    let (frag_start, frag_end) = self.add_pattern(branch);
                    self.states[start as usize].eps.push(frag_start);
                    self.states[frag_end as usize].eps.push(end);
                }
                (start, end)
            }
            Pattern::Star(inner) => {
                let start = self.new_state();
                let end = self.new_state();
                let (frag_start, frag_end) = self.add_pattern(inner);
                self.states[start as usize].eps.push(frag_start);
                self.states[start as usize].eps.push(end);
                self.states[frag_end as usize].eps.push(end);
                self.states[frag_end as usize].eps.push(frag_start);
                (start, end)
            }
            Pattern::Plus(inner) => {
                let start = self.new_state();
                let end = self.new_state();
                let (frag_start, frag_end) = self.add_pattern(inner);
                self.states[start as usize].eps.push(frag_start);
                self.states[frag_end as usize].eps.push(end);
                self.states[frag_end as usize].eps.push(frag_start);
                (start, end)
            }
            Pattern::Opt(inner) => {
                let start = self.new_state();
                let end = self.new_state();
                let (frag_start, frag_end) = self.add_pattern(inner);
                self.states[start as usize].eps.push(frag_start);
                self.states[start as usize].eps.push(end);
                self.states[frag_end as usize].eps.push(end);
                (start, end)
            }
            // Variables are substituted during grammar resolution.
            Pattern::Var { .. } => unreachable!(),
        }
    }

    /// 状態集合のε閉包を計算し、昇順に正規化して返します。
    fn closure(&self, seeds: &[u32]) -> Vec<u32> {
        let mut set = seeds.to_vec();
        let mut stack = seeds.to_vec();
        while let Some(state) = stack.pop() {
            for &next in &self.states[state as usize].eps {
                if !set.contains(&next) {
                    set.push(next);
                    stack.push(next);
                }
            }
        }
        set.sort_unstable();
        set
    }
}

/// DFA内の1状態。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DfaState {
    /// 受理状態の場合の規則番号（複数の規則が競合する場合は最小値）
    pub accept: Option<u32>,
    /// 昇順にソートされた範囲ラベル付き遷移 `(lo, hi, target)`
    pub trans: Vec<(u32, u32, u32)>,
}

/// 規則集合を受理する決定性オートマトン。
///
/// 状態0が開始状態です。
pub(crate) struct Dfa {
    pub states: Vec<DfaState>,
}

impl Dfa {
    /// 部分集合構成法でNFAをDFAへ変換します。
    pub(crate) fn from_nfa(nfa: &Nfa) -> Self {
        let mut states: Vec<DfaState> = vec![];
        let mut index: HashMap<Vec<u32>, u32> = HashMap::new();
        let mut worklist: Vec<Vec<u32>> = vec![];

        let start_set = nfa.closure(&[nfa.start]);
        index.insert(start_set.clone(), 0);
        states.push(DfaState {
            accept: accept_of(nfa, &start_set),
            trans: vec![],
        });
        worklist.push(start_set);

        while let Some(set) = worklist.pop() {
            let dfa_id = index[&set];

            // Split the outgoing ranges of all member states into
            // disjoint intervals before grouping targets.
            let mut points = vec![];
            for &state in &set {
                for &(lo, hi, _) in &nfa.states[state as usize].trans {
                    points.push(lo);
                    points.push(hi.saturating_add(1));
                }
            }
            points.sort_unstable();
            points.dedup();

            let mut trans = vec![];
            for window in points.windows(2) {
                let (lo, next) = (window[0], window[1]);
                let hi = next - 1;
                let mut targets = vec![];
                for &state in &set {
                    for &(tlo, thi, target) in &nfa.states[state as usize].trans {
                        if tlo <= lo && hi <= thi && !targets.contains(&target) {
                            targets.push(target);
                        }
                    }
                }
                if targets.is_empty() {
                    continue;
                }
                let target_set = nfa.closure(&targets);
                let target_id = match index.get(&target_set) {
                    Some(&id) => id,
                    None => {
                        let id = states.len() as u32;
                        index.insert(target_set.clone(), id);
                        states.push(DfaState {
                            accept: accept_of(nfa, &target_set),
                            trans: vec![],
                        });
                        worklist.push(target_set);
                        id
                    }
                };
                trans.push((lo, hi, target_id));
            }

            // Merge adjacent intervals that share a target.
            trans.sort_unstable();
            let mut merged: Vec<(u32, u32, u32)> = vec![];
            for (lo, hi, target) in trans {
                match merged.last_mut() {
                    Some(last) if last.2 == target && last.1.saturating_add(1) == lo => {
                        last.1 = hi;
                    }
                    _ => merged.push((lo, hi, target)),
                }
            }
            states[dfa_id as usize].trans = merged;
        }

        Self { states }
    }
}

/// 状態集合に含まれる受理状態のうち最小の規則番号を返します。
fn accept_of(nfa: &Nfa, set: &[u32]) -> Option<u32> {
    set.iter()
        .filter_map(|&state| nfa.states[state as usize].accept)
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::grammar::parse_grammar;

    fn build_dfa(text: &str) -> Dfa {
        let rules = parse_grammar(text).unwrap();
        Dfa::from_nfa(&Nfa::from_rules(&rules))
    }

    fn run(dfa: &Dfa, input: &str) -> Option<u32> {
        let mut state = 0usize;
        for c in input.chars() {
            let cp = c as u32;
            let next = dfa.states[state]
                .trans
                .iter()
                .find(|&&(lo, hi, _)| lo <= cp && cp <= hi)
                .map(|&(_, _, target)| target);
            state = next? as usize;
        }
        dfa.states[state].accept
    }

    #[test]
    fn test_letter_run() {
        let dfa = build_dfa("$Letter = [A-Za-z];\n1: $Letter+;");
        assert_eq!(run(&dfa, "abc"), Some(1));
        assert_eq!(run(&dfa, "Z"), Some(1));
        assert_eq!(run(&dfa, "a1"), None);
        assert_eq!(run(&dfa, ""), None);
    }

    #[test]
    fn test_alternation() {
        let dfa = build_dfa("1: ab|cd;");
        assert_eq!(run(&dfa, "ab"), Some(1));
        assert_eq!(run(&dfa, "cd"), Some(1));
        assert_eq!(run(&dfa, "ac"), None);
    }

    #[test]
    fn test_optional_and_star() {
        let dfa = build_dfa("1: a b? c*;");
        assert_eq!(run(&dfa, "a"), Some(1));
        assert_eq!(run(&dfa, "ab"), Some(1));
        assert_eq!(run(&dfa, "accc"), Some(1));
        assert_eq!(run(&dfa, "abb"), None);
    }

    #[test]
    fn test_overlapping_rules_prefer_smallest_id() {
        let dfa = build_dfa("1: [a-z]+;\n2: [a-m]+;");
        assert_eq!(run(&dfa, "abc"), Some(1));
        assert_eq!(run(&dfa, "xyz"), Some(1));
    }

    #[test]
    fn test_disjoint_rules() {
        let dfa = build_dfa("1: [a-z]+;\n2: [0-9]+;");
        assert_eq!(run(&dfa, "abc"), Some(1));
        assert_eq!(run(&dfa, "42"), Some(2));
        assert_eq!(run(&dfa, "a2"), None);
    }

    #[test]
    fn test_range_splitting() {
        // The two classes overlap on [e-m]; splitting must keep the
        // transitions deterministic.
        let dfa = build_dfa("1: [a-m][e-z];");
        assert_eq!(run(&dfa, "az"), Some(1));
        assert_eq!(run(&dfa, "me"), Some(1));
        assert_eq!(run(&dfa, "ad"), None);
        for state in &dfa.states {
            for pair in state.trans.windows(2) {
                assert!(pair[0].1 < pair[1].0);
            }
        }
    }
}
