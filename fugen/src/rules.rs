//! 境界規則文法のコンパイラ
//!
//! このモジュールは、文・語境界の判定規則を記述したテキスト文法を
//! コンパクトなバイナリ状態遷移表へコンパイルします。生成された
//! [`RuleTable`]は、分割エンジンの上流にあるトークナイザが消費します。
//!
//! # 文法
//!
//! ```text
//! # 英字の連続を1単位とする
//! $Letter = [A-Za-z];
//! 1: $Letter+;
//! ```
//!
//! 変数定義は再帰的に解決されます。未定義の変数参照や循環定義は
//! [`GrammarError`](crate::errors::GrammarError)になります。

mod automaton;
mod grammar;
mod table;

use crate::errors::{FugenError, Result};
use crate::rules::automaton::{Dfa, Nfa};

pub use crate::rules::table::{
    Boundaries, Boundary, RuleMatch, RuleTable, RULES_MAGIC, RULES_VERSION,
};

/// 規則文法のテキストをコンパイルします。
///
/// 解析、変数解決、NFA構築、決定化を経て[`RuleTable`]を生成します。
///
/// # 引数
///
/// * `text` - 規則文法のテキスト
///
/// # エラー
///
/// 文法が不正な場合に[`FugenError::Grammar`]を返します。
/// 規則が1つも含まれない文法も不正です。
///
/// # 例
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use fugen::rules::compile_rules;
///
/// let table = compile_rules("$Letter = [A-Za-z];\n1: $Letter+;")?;
/// let m = table.longest_match("compound".chars()).unwrap();
/// assert_eq!(m.len, 8);
/// assert_eq!(m.rule, 1);
/// # Ok(())
/// # }
/// ```
pub fn compile_rules(text: &str) -> Result<RuleTable> {
    let rules = grammar::parse_grammar(text)?;
    if rules.is_empty() {
        return Err(FugenError::grammar(1, "the grammar contains no rules"));
    }
    let nfa = Nfa::from_rules(&rules);
    let dfa = Dfa::from_nfa(&nfa);
    RuleTable::from_dfa(&dfa)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_rules() {
        let table = compile_rules("$Letter = [A-Za-z];\n1: $Letter+;").unwrap();
        assert!(table.num_states() >= 2);
        let m = table.longest_match("Grenzen".chars()).unwrap();
        assert_eq!(m.len, 7);
    }

    #[test]
    fn test_compile_empty_grammar() {
        assert!(compile_rules("# only comments\n").is_err());
        assert!(compile_rules("$Letter = [A-Za-z];").is_err());
    }

    #[test]
    fn test_compile_undefined_variable() {
        let err = compile_rules("1: $Letter+;").unwrap_err();
        assert!(matches!(err, FugenError::Grammar(_)));
    }
}
