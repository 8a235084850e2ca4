//! 辞書構築のためのビルダー
//!
//! このモジュールは、CSV形式の語彙リストから [`DictionaryInner`] を
//! 構築するためのビルダーを提供します。語彙リストの各行は
//! `表層形[,重み]` の形式で、重みを省略した場合は0になります。

use std::io::Read;

use csv_core::ReadFieldResult;

use crate::dictionary::fst::{Fst, FstState, FstTransition};
use crate::dictionary::DictionaryInner;
use crate::errors::{FugenError, Result};
use crate::word::fold_char;

/// 構築途中の可変な状態表現。
///
/// 凍結時にフラットな遷移配列へ変換されます。
#[derive(Default)]
struct BuildState {
    trans: Vec<(u32, u32)>,
    weight: i32,
    is_final: bool,
}

/// 語彙リストから [`DictionaryInner`] を構築するビルダー
pub struct DictionaryBuilder {}

impl DictionaryBuilder {
    /// CSV形式の語彙リストのリーダーから新しい [`DictionaryInner`] を作成します。
    ///
    /// 表層形は構築時に畳み込まれます。同じ表層形が複数回現れた場合は
    /// 最大の重みが採用されます。
    ///
    /// # 引数
    ///
    /// * `lexicon_rdr` - 語彙リスト `words.csv` のリーダー
    ///
    /// # エラー
    ///
    /// 入力フォーマットが不正な場合、または語彙が空の場合に
    /// [`FugenError`] を返します。
    pub fn from_reader<R>(mut lexicon_rdr: R) -> Result<DictionaryInner>
    where
        R: Read,
    {
        let mut lexicon_buf = vec![];
        lexicon_rdr.read_to_end(&mut lexicon_buf)?;
        let entries = Self::parse_csv(&lexicon_buf, "words.csv")?;
        Self::from_entries(&entries)
    }

    /// 表層形と重みの組から新しい [`DictionaryInner`] を作成します。
    pub(crate) fn from_entries(entries: &[(String, i32)]) -> Result<DictionaryInner> {
        if entries.is_empty() {
            return Err(FugenError::invalid_argument(
                "entries",
                "The lexicon must contain at least one word.",
            ));
        }

        let mut states = vec![BuildState::default()];
        let mut num_words = 0u32;
        for (surface, weight) in entries {
            let mut cursor = 0usize;
            for c in surface.chars().map(fold_char) {
                let label = c as u32;
                cursor = match states[cursor].trans.iter().find(|&&(l, _)| l == label) {
                    Some(&(_, target)) => target as usize,
                    None => {
                        let next = states.len();
                        states.push(BuildState::default());
                        states[cursor].trans.push((label, next as u32));
                        next
                    }
                };
            }
            if states[cursor].is_final {
                states[cursor].weight = states[cursor].weight.max(*weight);
            } else {
                states[cursor].is_final = true;
                states[cursor].weight = *weight;
                num_words += 1;
            }
        }

        Ok(DictionaryInner::new(Self::freeze(states), num_words))
    }

    /// 可変な状態表現をフラットな状態遷移表へ凍結します。
    fn freeze(mut states: Vec<BuildState>) -> Fst {
        let mut flat_states = Vec::with_capacity(states.len());
        let mut transitions = vec![];
        for state in &mut states {
            state.trans.sort_unstable_by_key(|&(label, _)| label);
            flat_states.push(FstState {
                trans_offset: transitions.len() as u32,
                trans_len: state.trans.len() as u32,
                weight: state.weight,
                is_final: state.is_final,
            });
            transitions.extend(
                state
                    .trans
                    .iter()
                    .map(|&(label, target)| FstTransition { label, target }),
            );
        }
        Fst::from_parts(flat_states, transitions)
    }

    /// CSV形式の語彙リストをパースします。
    ///
    /// 空行は読み飛ばされ、空の表層形を持つ行は拒否されます。
    pub(crate) fn parse_csv(mut bytes: &[u8], name: &'static str) -> Result<Vec<(String, i32)>> {
        let mut entries = vec![];

        let mut rdr = csv_core::Reader::new();
        let mut output = [0; 4096];
        let mut field_buf: Vec<u8> = vec![];
        let mut fields: Vec<String> = vec![];

        loop {
            let (result, nin, nout) = rdr.read_field(bytes, &mut output);
            bytes = &bytes[nin..];
            field_buf.extend_from_slice(&output[..nout]);
            match result {
                // The final unterminated field is flushed by a
                // subsequent call with empty input.
                ReadFieldResult::InputEmpty | ReadFieldResult::OutputFull => {}
                ReadFieldResult::Field { record_end } => {
                    fields.push(std::str::from_utf8(&field_buf)?.to_string());
                    field_buf.clear();
                    if record_end {
                        Self::push_entry(&mut entries, &mut fields, name)?;
                    }
                }
                ReadFieldResult::End => break,
            }
        }
        Ok(entries)
    }

    /// 1レコード分のフィールドをエントリへ変換します。
    fn push_entry(
        entries: &mut Vec<(String, i32)>,
        fields: &mut Vec<String>,
        name: &'static str,
    ) -> Result<()> {
        // A blank line comes through as a single empty field.
        if fields.len() == 1 && fields[0].is_empty() {
            fields.clear();
            return Ok(());
        }
        if fields.len() > 2 {
            let msg = format!(
                "A lexicon row must have at most two fields, got {:?}",
                fields.join(","),
            );
            return Err(FugenError::invalid_format(name, msg));
        }
        if fields[0].is_empty() {
            return Err(FugenError::invalid_format(
                name,
                "A lexicon row must have a non-empty surface.",
            ));
        }
        let weight = match fields.get(1) {
            Some(w) => w.parse()?,
            None => 0,
        };
        entries.push((std::mem::take(&mut fields[0]), weight));
        fields.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv() {
        let data = "donau,4\ndampf\nschiff,-2";
        let entries = DictionaryBuilder::parse_csv(data.as_bytes(), "test").unwrap();
        assert_eq!(
            entries,
            vec![
                ("donau".to_string(), 4),
                ("dampf".to_string(), 0),
                ("schiff".to_string(), -2),
            ]
        );
    }

    #[test]
    fn test_parse_csv_skips_empty_lines() {
        let data = "donau,4\n\ndampf,3\n";
        let entries = DictionaryBuilder::parse_csv(data.as_bytes(), "test").unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_parse_csv_empty_surface() {
        let data = "donau,4\n,3";
        let result = DictionaryBuilder::parse_csv(data.as_bytes(), "test");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_csv_invalid_weight() {
        let data = "donau,vier";
        let result = DictionaryBuilder::parse_csv(data.as_bytes(), "test");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_csv_too_many_fields() {
        let data = "donau,4,extra";
        let result = DictionaryBuilder::parse_csv(data.as_bytes(), "test");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_reader_empty() {
        let result = DictionaryBuilder::from_reader("".as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_surfaces_keep_max_weight() {
        let dict = DictionaryBuilder::from_reader("haus,1\nHaus,7".as_bytes()).unwrap();
        assert_eq!(dict.num_words(), 1);
        let fst = dict.into_fst();
        let input: Vec<char> = "haus".chars().collect();
        let m = fst.common_prefix_iterator(&input).next().unwrap();
        assert_eq!(m.weight, 7);
    }
}
