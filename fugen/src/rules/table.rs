//! コンパイル済み境界規則表
//!
//! このモジュールは、規則文法のコンパイル結果であるフラットな
//! 状態遷移表と、その固定レイアウトのバイナリ入出力を提供します。
//!
//! # バイナリフォーマット
//!
//! すべての値はリトルエンディアンです。
//!
//! ```text
//! magic: u32, version: u32, state_count: u32, transition_count: u32
//! 状態表:   state_count 個の (accept: i32, trans_offset: u32, trans_len: u32)
//! 遷移表:   transition_count 個の (lo: u32, hi: u32, target: u32)
//! ```

use std::io::{Read, Write};

use crate::errors::{FugenError, Result};
use crate::rules::automaton::Dfa;

/// 規則表を識別するマジックナンバー。
pub const RULES_MAGIC: u32 = u32::from_le_bytes(*b"FGRT");

/// 規則表フォーマットのバージョン番号。
pub const RULES_VERSION: u32 = 1;

/// 受理状態でないことを表す番兵値。
const NO_ACCEPT: i32 = -1;

/// 規則表内の1状態。
#[derive(Debug, Clone, Copy)]
struct RuleState {
    accept: i32,
    trans_offset: u32,
    trans_len: u32,
}

/// 範囲ラベル付き遷移。
#[derive(Debug, Clone, Copy)]
struct RuleTransition {
    lo: u32,
    hi: u32,
    target: u32,
}

/// コンパイル済みの境界規則表。
///
/// 規則文法のコンパイル結果であり、構築後は不変です。上流の
/// トークナイザが文・語境界の判定に使用します。状態0が開始状態です。
#[derive(Debug)]
pub struct RuleTable {
    states: Vec<RuleState>,
    transitions: Vec<RuleTransition>,
}

/// 規則表のマッチング結果
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RuleMatch {
    /// マッチした文字数
    pub len: usize,
    /// マッチした規則の番号
    pub rule: u32,
}

impl RuleTable {
    /// DFAから規則表を構築します。
    pub(crate) fn from_dfa(dfa: &Dfa) -> Result<Self> {
        let mut states = Vec::with_capacity(dfa.states.len());
        let mut transitions = vec![];
        for state in &dfa.states {
            states.push(RuleState {
                accept: match state.accept {
                    Some(id) => i32::try_from(id).map_err(|_| {
                        FugenError::invalid_argument("dfa", "rule number is too large")
                    })?,
                    None => NO_ACCEPT,
                },
                trans_offset: transitions.len() as u32,
                trans_len: state.trans.len() as u32,
            });
            transitions.extend(
                state
                    .trans
                    .iter()
                    .map(|&(lo, hi, target)| RuleTransition { lo, hi, target }),
            );
        }
        Ok(Self {
            states,
            transitions,
        })
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

    /// 規則表を固定レイアウトのバイナリ形式で書き出します。
    ///
    /// # エラー
    ///
    /// 書き込みに失敗した場合、[`FugenError`]を返します。
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        wtr.write_all(&RULES_MAGIC.to_le_bytes())?;
        wtr.write_all(&RULES_VERSION.to_le_bytes())?;
        wtr.write_all(&(self.states.len() as u32).to_le_bytes())?;
        wtr.write_all(&(self.transitions.len() as u32).to_le_bytes())?;
        for state in &self.states {
            wtr.write_all(&state.accept.to_le_bytes())?;
            wtr.write_all(&state.trans_offset.to_le_bytes())?;
            wtr.write_all(&state.trans_len.to_le_bytes())?;
        }
        for t in &self.transitions {
            wtr.write_all(&t.lo.to_le_bytes())?;
            wtr.write_all(&t.hi.to_le_bytes())?;
            wtr.write_all(&t.target.to_le_bytes())?;
        }
        Ok(())
    }

    /// リーダーから規則表を読み込みます。
    ///
    /// ヘッダと表の整合性を検証します。
    ///
    /// # エラー
    ///
    /// マジックナンバーまたはバージョンが一致しない場合、表の内容が
    /// 壊れている場合に[`FugenError`]を返します。
    pub fn read<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let magic = read_u32(&mut rdr)?;
        if magic != RULES_MAGIC {
            return Err(FugenError::invalid_format(
                "rule_table",
                "The magic number of the input table mismatches.",
            ));
        }
        let version = read_u32(&mut rdr)?;
        if version != RULES_VERSION {
            return Err(FugenError::invalid_format(
                "rule_table",
                format!("Unsupported table version: {version}"),
            ));
        }
        let state_count = read_u32(&mut rdr)? as usize;
        let transition_count = read_u32(&mut rdr)? as usize;
        if state_count == 0 {
            return Err(FugenError::invalid_format(
                "rule_table",
                "The table must contain at least one state.",
            ));
        }

        let mut states = Vec::with_capacity(state_count);
        for _ in 0..state_count {
            let accept = read_u32(&mut rdr)? as i32;
            let trans_offset = read_u32(&mut rdr)?;
            let trans_len = read_u32(&mut rdr)?;
            let end = trans_offset as usize + trans_len as usize;
            if accept < NO_ACCEPT || end > transition_count {
                return Err(FugenError::invalid_format(
                    "rule_table",
                    "The state table is corrupted.",
                ));
            }
            states.push(RuleState {
                accept,
                trans_offset,
                trans_len,
            });
        }
        let mut transitions = Vec::with_capacity(transition_count);
        for _ in 0..transition_count {
            let lo = read_u32(&mut rdr)?;
            let hi = read_u32(&mut rdr)?;
            let target = read_u32(&mut rdr)?;
            if lo > hi || target as usize >= state_count {
                return Err(FugenError::invalid_format(
                    "rule_table",
                    "The transition table is corrupted.",
                ));
            }
            transitions.push(RuleTransition { lo, hi, target });
        }
        Ok(Self {
            states,
            transitions,
        })
    }

    /// 状態 `state` からコードポイント `cp` で遷移した先を返します。
    #[inline(always)]
    fn step(&self, state: u32, cp: u32) -> Option<u32> {
        let s = &self.states[state as usize];
        let start = s.trans_offset as usize;
        let trans = &self.transitions[start..start + s.trans_len as usize];
        let i = trans.partition_point(|t| t.hi < cp);
        match trans.get(i) {
            Some(t) if t.lo <= cp => Some(t.target),
            _ => None,
        }
    }

    /// 入力の先頭から最長一致を探索します。
    ///
    /// 空のマッチは返しません（最低1文字を消費します）。
    ///
    /// # 引数
    ///
    /// * `chars` - 照合する文字列
    ///
    /// # 戻り値
    ///
    /// 一致が存在する場合はその長さと規則番号、存在しない場合は`None`
    pub fn longest_match<I>(&self, chars: I) -> Option<RuleMatch>
    where
        I: IntoIterator<Item = char>,
    {
        let mut state = 0u32;
        let mut len = 0usize;
        let mut last = None;
        for c in chars {
            match self.step(state, c as u32) {
                Some(next) => {
                    state = next;
                    len += 1;
                    let accept = self.states[state as usize].accept;
                    if accept >= 0 {
                        last = Some(RuleMatch {
                            len,
                            rule: accept as u32,
                        });
                    }
                }
                None => break,
            }
        }
        last
    }

    /// テキスト内の境界を列挙するイテレータを取得します。
    ///
    /// 各境界は、先頭から順に最長一致を適用した単位の終端です。
    /// どの規則にも一致しない文字は、規則番号0の1文字単位として
    /// 切り出されます。
    pub fn boundaries<'a>(&'a self, text: &'a str) -> Boundaries<'a> {
        Boundaries {
            table: self,
            text,
            pos_byte: 0,
            pos_char: 0,
        }
    }
}

/// リーダーからリトルエンディアンのu32を1つ読み込みます。
fn read_u32<R: Read>(rdr: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    rdr.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// テキストの境界単位
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Boundary {
    /// 単位の終端文字位置
    pub end_char: usize,
    /// 単位の終端バイト位置
    pub end_byte: usize,
    /// 単位を受理した規則の番号（一致しない1文字の場合は0）
    pub rule: u32,
}

/// 境界のイテレータ
///
/// [`RuleTable::boundaries`]によって生成されます。
pub struct Boundaries<'a> {
    table: &'a RuleTable,
    text: &'a str,
    pos_byte: usize,
    pos_char: usize,
}

impl Iterator for Boundaries<'_> {
    type Item = Boundary;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.pos_byte..];
        let mut iter = rest.chars();
        let first = iter.next()?;
        let (len_char, rule) = match self.table.longest_match(rest.chars()) {
            Some(m) => (m.len, m.rule),
            None => (1, 0),
        };
        let len_byte: usize = std::iter::once(first)
            .chain(iter)
            .take(len_char)
            .map(|c| c.len_utf8())
            .sum();
        self.pos_byte += len_byte;
        self.pos_char += len_char;
        Some(Boundary {
            end_char: self.pos_char,
            end_byte: self.pos_byte,
            rule,
        })
    }
}
