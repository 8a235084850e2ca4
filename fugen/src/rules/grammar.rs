//! 境界規則文法のパーサ
//!
//! このモジュールは、行指向の規則文法をパターン構文木へ解析します。
//! 文法は `$名前 = パターン;` の変数定義と `番号: パターン;` の
//! 規則文から構成され、`#` 以降はコメントとして無視されます。
//!
//! パターンには、リテラル文字、文字クラス `[a-z]`（範囲・否定・
//! エスケープ対応）、変数参照 `$名前`、グループ化 `(...)`、後置の
//! `* + ?`、選択 `|` が使用できます。

use hashbrown::HashMap;

use crate::errors::{FugenError, Result};

/// Unicodeコードポイントの上限。
const MAX_CODE_POINT: u32 = 0x10FFFF;

/// サロゲート領域（否定クラスの補集合から除外される）。
const SURROGATE_RANGE: (u32, u32) = (0xD800, 0xDFFF);

/// パターン構文木。
///
/// 文字集合はすべて包含コードポイント範囲のリストへ正規化されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Pattern {
    /// 文字集合（昇順にソートされた非重複範囲）
    Ranges(Vec<(u32, u32)>),
    /// 変数参照（解決前のみ存在）
    Var { name: String, line: usize },
    /// 連接
    Concat(Vec<Pattern>),
    /// 選択
    Alt(Vec<Pattern>),
    /// 0回以上の繰り返し
    Star(Box<Pattern>),
    /// 1回以上の繰り返し
    Plus(Box<Pattern>),
    /// 省略可能
    Opt(Box<Pattern>),
}

/// 解決済みの規則文。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rule {
    /// 規則番号
    pub id: u32,
    /// 規則文の行番号（1始まり）
    pub line: usize,
    /// 変数解決済みのパターン
    pub pattern: Pattern,
}

/// 文法テキストを解析し、変数解決済みの規則列を返します。
///
/// # エラー
///
/// 構文が不正な場合、変数が未定義の場合、定義が循環している場合に
/// [`FugenError::Grammar`]を返します。
pub(crate) fn parse_grammar(text: &str) -> Result<Vec<Rule>> {
    let statements = split_statements(text);

    let mut defs: HashMap<String, (usize, Pattern)> = HashMap::new();
    let mut raw_rules: Vec<(u32, usize, Pattern)> = vec![];

    for (line, stmt) in &statements {
        let chars: Vec<char> = stmt.chars().collect();
        let mut parser = PatternParser {
            chars: &chars,
            pos: 0,
            line: *line,
        };
        parser.skip_ws();
        if parser.peek() == Some('$') {
            parser.bump();
            let name = parser.parse_var_name()?;
            parser.skip_ws();
            parser.expect('=')?;
            let pattern = parser.parse_to_end()?;
            if defs.insert(name.clone(), (*line, pattern)).is_some() {
                return Err(FugenError::grammar(
                    *line,
                    format!("variable '${name}' is defined twice"),
                ));
            }
        } else {
            let id = parser.parse_rule_id()?;
            parser.skip_ws();
            parser.expect(':')?;
            let pattern = parser.parse_to_end()?;
            if raw_rules.iter().any(|&(other, _, _)| other == id) {
                return Err(FugenError::grammar(
                    *line,
                    format!("rule {id} is defined twice"),
                ));
            }
            raw_rules.push((id, *line, pattern));
        }
    }

    let mut rules = Vec::with_capacity(raw_rules.len());
    for (id, line, pattern) in &raw_rules {
        let mut stack = vec![];
        rules.push(Rule {
            id: *id,
            line: *line,
            pattern: resolve(pattern, &defs, &mut stack)?,
        });
    }
    Ok(rules)
}

/// テキストを `;` 区切りの文に分割します。
///
/// コメントを除去し、各文の開始行番号を記録します。`;` と `#` は
/// 文字クラス内およびエスケープ直後では区切りとして扱われません。
fn split_statements(text: &str) -> Vec<(usize, String)> {
    let mut statements = vec![];
    let mut current = String::new();
    let mut start_line = 1;
    let mut line = 1;
    let mut in_class = false;
    let mut escaped = false;
    let mut in_comment = false;

    for c in text.chars() {
        if c == '\n' {
            line += 1;
            in_comment = false;
            current.push(' ');
            continue;
        }
        if in_comment {
            continue;
        }
        if escaped {
            escaped = false;
            current.push(c);
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                current.push(c);
            }
            '#' if !in_class => {
                in_comment = true;
            }
            '[' if !in_class => {
                in_class = true;
                current.push(c);
            }
            ']' if in_class => {
                in_class = false;
                current.push(c);
            }
            ';' if !in_class => {
                if !current.trim().is_empty() {
                    statements.push((start_line, std::mem::take(&mut current)));
                } else {
                    current.clear();
                }
                start_line = line;
            }
            _ => {
                if current.trim().is_empty() && !c.is_whitespace() {
                    start_line = line;
                }
                current.push(c);
            }
        }
    }
    if !current.trim().is_empty() {
        statements.push((start_line, current));
    }
    statements
}

/// 変数参照を再帰的に解決します。
///
/// `stack` は現在解決中の変数名を保持し、循環定義の検出に使用されます。
fn resolve(
    pattern: &Pattern,
    defs: &HashMap<String, (usize, Pattern)>,
    stack: &mut Vec<String>,
) -> Result<Pattern> {
    match pattern {
        Pattern::Ranges(r) => Ok(Pattern::Ranges(r.clone())),
        Pattern::Var { name, line } => {
            if stack.iter().any(|n| n == name) {
                return Err(FugenError::grammar(
                    *line,
                    format!("variable '${name}' is defined cyclically"),
                ));
            }
            let (_, body) = defs.get(name).ok_or_else(|| {
                FugenError::grammar(*line, format!("variable '${name}' is not defined"))
            })?;
            stack.push(name.clone());
            let resolved = resolve(body, defs, stack)?;
            stack.pop();
            Ok(resolved)
        }
        Pattern::Concat(ps) => Ok(Pattern::Concat(
            ps.iter()
                .map(|p| resolve(p, defs, stack))
                .collect::<Result<_>>()?,
        )),
        Pattern::Alt(ps) => Ok(Pattern::Alt(
            ps.iter()
                .map(|p| resolve(p, defs, stack))
                .collect::<Result<_>>()?,
        )),
        Pattern::Star(p) => Ok(Pattern::Star(Box::new(resolve(p, defs, stack)?))),
        Pattern::Plus(p) => Ok(Pattern::Plus(Box::new(resolve(p, defs, stack)?))),
        Pattern::Opt(p) => Ok(Pattern::Opt(Box::new(resolve(p, defs, stack)?))),
    }
}

/// 1文のパターンを解析する再帰下降パーサ。
struct PatternParser<'a> {
    chars: &'a [char],
    pos: usize,
    line: usize,
}

impl PatternParser<'_> {
    fn err<S: Into<String>>(&self, msg: S) -> FugenError {
        FugenError::grammar(self.line, msg)
    }

    #[inline(always)]
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    #[inline(always)]
    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.err(format!("expected '{expected}', found '{c}'"))),
            None => Err(self.err(format!("expected '{expected}', found end of statement"))),
        }
    }

    fn parse_var_name(&mut self) -> Result<String> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            name.push(c);
            self.pos += 1;
        }
        if name.is_empty() {
            return Err(self.err("expected a variable name after '$'"));
        }
        Ok(name)
    }

    fn parse_rule_id(&mut self) -> Result<u32> {
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            self.pos += 1;
        }
        if digits.is_empty() {
            return Err(self.err("expected a rule number"));
        }
        digits
            .parse()
            .map_err(|_| self.err(format!("invalid rule number '{digits}'")))
    }

    /// 文末までをパターンとして解析します。
    fn parse_to_end(&mut self) -> Result<Pattern> {
        let pattern = self.parse_alt()?;
        self.skip_ws();
        if let Some(c) = self.peek() {
            return Err(self.err(format!("unexpected '{c}'")));
        }
        Ok(pattern)
    }

    fn parse_alt(&mut self) -> Result<Pattern> {
        let mut branches = vec![self.parse_concat()?];
        loop {
            self.skip_ws();
            if self.peek() == Some('|') {
                self.bump();
                branches.push(self.parse_concat()?);
            } else {
                break;
            }
        }
        if branches.len() == 1 {
            Ok(branches.swap_remove(0))
        } else {
            Ok(Pattern::Alt(branches))
        }
    }

    fn parse_concat(&mut self) -> Result<Pattern> {
        let mut parts = vec![];
        loop {
            self.skip_ws();
            match self.peek() {
                None | Some('|') | Some(')') => break,
                _ => parts.push(self.parse_repeat()?),
            }
        }
        if parts.is_empty() {
            return Err(self.err("expected a pattern"));
        }
        if parts.len() == 1 {
            Ok(parts.swap_remove(0))
        } else {
            Ok(Pattern::Concat(parts))
        }
    }

    fn parse_repeat(&mut self) -> Result<Pattern> {
        let mut atom = self.parse_atom()?;
        loop {
            match self.peek() {
                Some('*') => {
                    self.bump();
                    atom = Pattern::Star(Box::new(atom));
                }
                Some('+') => {
                    self.bump();
                    atom = Pattern::Plus(Box::new(atom));
                }
                Some('?') => {
                    self.bump();
                    atom = Pattern::Opt(Box::new(atom));
                }
                _ => break,
            }
        }
        Ok(atom)
    }

    fn parse_atom(&mut self) -> Result<Pattern> {
        match self.peek() {
            Some('(') => {
                self.bump();
                let inner = self.parse_alt()?;
                self.skip_ws();
                self.expect(')')?;
                Ok(inner)
            }
            Some('[') => {
                self.bump();
                self.parse_class()
            }
            Some('$') => {
                self.bump();
                let name = self.parse_var_name()?;
                Ok(Pattern::Var {
                    name,
                    line: self.line,
                })
            }
            Some('\\') => {
                self.bump();
                let c = self.parse_escape()?;
                Ok(Pattern::Ranges(vec![(c, c)]))
            }
            Some(c) if !"*+?)|]".contains(c) => {
                self.bump();
                Ok(Pattern::Ranges(vec![(c as u32, c as u32)]))
            }
            Some(c) => Err(self.err(format!("unexpected '{c}'"))),
            None => Err(self.err("unexpected end of statement")),
        }
    }

    /// 文字クラス `[...]` の内側を解析します。
    ///
    /// 先頭の `^` は否定を表します。`-` は範囲の区切りですが、
    /// クラスの先頭または末尾ではリテラルとして扱われます。
    fn parse_class(&mut self) -> Result<Pattern> {
        let negated = if self.peek() == Some('^') {
            self.bump();
            true
        } else {
            false
        };

        let mut ranges: Vec<(u32, u32)> = vec![];
        loop {
            let lo = match self.peek() {
                Some(']') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    self.parse_escape()?
                }
                Some(c) => {
                    self.bump();
                    c as u32
                }
                None => return Err(self.err("unterminated character class")),
            };
            // A '-' followed by anything but ']' forms a range.
            if self.peek() == Some('-') && self.chars.get(self.pos + 1) != Some(&']') {
                self.bump();
                let hi = match self.peek() {
                    Some('\\') => {
                        self.bump();
                        self.parse_escape()?
                    }
                    Some(c) => {
                        self.bump();
                        c as u32
                    }
                    None => return Err(self.err("unterminated character class")),
                };
                if hi < lo {
                    return Err(self.err("character range is out of order"));
                }
                ranges.push((lo, hi));
            } else {
                ranges.push((lo, lo));
            }
        }
        if ranges.is_empty() {
            return Err(self.err("empty character class"));
        }

        let normalized = normalize_ranges(ranges);
        if negated {
            Ok(Pattern::Ranges(complement_ranges(&normalized)))
        } else {
            Ok(Pattern::Ranges(normalized))
        }
    }

    /// バックスラッシュ直後のエスケープを解析します。
    fn parse_escape(&mut self) -> Result<u32> {
        match self.bump() {
            Some('n') => Ok('\n' as u32),
            Some('r') => Ok('\r' as u32),
            Some('t') => Ok('\t' as u32),
            Some('0') => Ok(0),
            Some('u') => {
                self.expect('{')?;
                let mut digits = String::new();
                while let Some(c) = self.peek() {
                    if !c.is_ascii_hexdigit() {
                        break;
                    }
                    digits.push(c);
                    self.pos += 1;
                }
                self.expect('}')?;
                let value = u32::from_str_radix(&digits, 16)
                    .map_err(|_| self.err("invalid unicode escape"))?;
                if value > MAX_CODE_POINT {
                    return Err(self.err("unicode escape is out of range"));
                }
                Ok(value)
            }
            Some(c) => Ok(c as u32),
            None => Err(self.err("unexpected end of statement after '\\'")),
        }
    }
}

/// 範囲リストを昇順・非重複に正規化します。
fn normalize_ranges(mut ranges: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
    ranges.sort_unstable();
    let mut merged: Vec<(u32, u32)> = vec![];
    for (lo, hi) in ranges {
        match merged.last_mut() {
            Some(last) if lo <= last.1.saturating_add(1) => {
                last.1 = last.1.max(hi);
            }
            _ => merged.push((lo, hi)),
        }
    }
    merged
}

/// 正規化済み範囲リストの補集合を返します。
///
/// サロゲート領域は補集合から除外されます。
fn complement_ranges(ranges: &[(u32, u32)]) -> Vec<(u32, u32)> {
    let mut result = vec![];
    let mut next = 0u32;
    for &(lo, hi) in ranges {
        if lo > next {
            result.push((next, lo - 1));
        }
        next = hi.saturating_add(1);
    }
    if next <= MAX_CODE_POINT {
        result.push((next, MAX_CODE_POINT));
    }
    // Carve the surrogate block out of the complement.
    let mut carved = vec![];
    for (lo, hi) in result {
        if hi < SURROGATE_RANGE.0 || lo > SURROGATE_RANGE.1 {
            carved.push((lo, hi));
            continue;
        }
        if lo < SURROGATE_RANGE.0 {
            carved.push((lo, SURROGATE_RANGE.0 - 1));
        }
        if hi > SURROGATE_RANGE.1 {
            carved.push((SURROGATE_RANGE.1 + 1, hi));
        }
    }
    carved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(pairs: &[(char, char)]) -> Pattern {
        Pattern::Ranges(pairs.iter().map(|&(a, b)| (a as u32, b as u32)).collect())
    }

    #[test]
    fn test_parse_simple_rule() {
        let rules = parse_grammar("$Letter = [A-Za-z];\n1: $Letter+;").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, 1);
        assert_eq!(
            rules[0].pattern,
            Pattern::Plus(Box::new(ranges(&[('A', 'Z'), ('a', 'z')])))
        );
    }

    #[test]
    fn test_parse_concat_and_alt() {
        let rules = parse_grammar("1: ab|c;").unwrap();
        assert_eq!(
            rules[0].pattern,
            Pattern::Alt(vec![
                Pattern::Concat(vec![ranges(&[('a', 'a')]), ranges(&[('b', 'b')])]),
                ranges(&[('c', 'c')]),
            ])
        );
    }

    #[test]
    fn test_parse_nested_vars() {
        let text = "$A = [ab];\n$B = $A+;\n1: $B $A;";
        let rules = parse_grammar(text).unwrap();
        assert_eq!(
            rules[0].pattern,
            Pattern::Concat(vec![
                Pattern::Plus(Box::new(ranges(&[('a', 'b')]))),
                ranges(&[('a', 'b')]),
            ])
        );
    }

    #[test]
    fn test_undefined_variable() {
        let err = parse_grammar("1: $Missing+;").unwrap_err();
        match err {
            FugenError::Grammar(e) => {
                assert_eq!(e.line(), 1);
                assert!(e.message().contains("not defined"));
            }
            _ => panic!("expected a grammar error"),
        }
    }

    #[test]
    fn test_cyclic_definition() {
        let text = "$A = $B;\n$B = $A;\n1: $A;";
        let err = parse_grammar(text).unwrap_err();
        match err {
            FugenError::Grammar(e) => assert!(e.message().contains("cyclically")),
            _ => panic!("expected a grammar error"),
        }
    }

    #[test]
    fn test_self_cycle() {
        let err = parse_grammar("$A = $A+;\n1: $A;").unwrap_err();
        assert!(matches!(err, FugenError::Grammar(_)));
    }

    #[test]
    fn test_duplicate_definition() {
        let err = parse_grammar("$A = [a];\n$A = [b];\n1: $A;").unwrap_err();
        assert!(matches!(err, FugenError::Grammar(_)));
    }

    #[test]
    fn test_comments_and_blank_statements() {
        let text = "# comment line\n$L = [a-z]; # trailing\n\n1: $L+;\n";
        let rules = parse_grammar(text).unwrap();
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_error_line_number() {
        let text = "$L = [a-z];\n\n2: $L [;\n";
        let err = parse_grammar(text).unwrap_err();
        match err {
            FugenError::Grammar(e) => assert_eq!(e.line(), 3),
            _ => panic!("expected a grammar error"),
        }
    }

    #[test]
    fn test_negated_class_excludes_surrogates() {
        let rules = parse_grammar("1: [^a];").unwrap();
        match &rules[0].pattern {
            Pattern::Ranges(rs) => {
                assert!(rs.iter().all(|&(lo, hi)| hi < 0xD800 || lo > 0xDFFF));
                assert!(rs.iter().any(|&(lo, hi)| lo <= 'b' as u32 && hi >= 'b' as u32));
                assert!(!rs.iter().any(|&(lo, hi)| lo <= 'a' as u32 && hi >= 'a' as u32));
            }
            _ => panic!("expected a character set"),
        }
    }

    #[test]
    fn test_unicode_escape() {
        let rules = parse_grammar("1: [\\u{1000}-\\u{102A}]+;").unwrap();
        assert_eq!(
            rules[0].pattern,
            Pattern::Plus(Box::new(Pattern::Ranges(vec![(0x1000, 0x102A)])))
        );
    }

    #[test]
    fn test_literal_escape() {
        let rules = parse_grammar("1: \\-+;").unwrap();
        assert_eq!(
            rules[0].pattern,
            Pattern::Plus(Box::new(ranges(&[('-', '-')])))
        );
    }
}
