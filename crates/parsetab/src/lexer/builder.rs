//! Assembles the whole lexer pipeline: rule text → NFAs → combined NFA →
//! DFA → minimized DFA → transition table.
//!
//! Rules listed later take precedence: priorities are assigned
//! `total − index − 1`, so the last rule gets 0 and lowest-number-wins
//! tie-breaking favors it.

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::error::LexerBuildError;
use crate::lexer::dfa::Dfa;
use crate::lexer::minimize::minimize;
use crate::lexer::nfa::Nfa;
use crate::lexer::table::LexerDefinition;

/// One lexical rule: a pattern and the token name it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalRule {
    pub pattern: CompactString,
    pub token: CompactString,
}

impl LexicalRule {
    #[must_use]
    pub fn new(pattern: impl Into<CompactString>, token: impl Into<CompactString>) -> Self {
        Self {
            pattern: pattern.into(),
            token: token.into(),
        }
    }
}

/// Parse the line-oriented `regex;TOKEN` format.
///
/// Blank lines and lines whose first non-whitespace character is `#` are
/// skipped. The split is on the first `;`; both sides are trimmed. Order is
/// preserved — it is what the priority assignment works from.
///
/// # Errors
///
/// Returns [`LexerBuildError::MalformedRule`] with the 1-based line number
/// of the first non-comment line lacking a `;`.
pub fn parse_rules(text: &str) -> Result<Vec<LexicalRule>, LexerBuildError> {
    let mut rules = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (pattern, token) = line
            .split_once(';')
            .ok_or(LexerBuildError::MalformedRule { line: idx + 1 })?;
        rules.push(LexicalRule::new(pattern.trim(), token.trim()));
    }
    Ok(rules)
}

/// Everything the pipeline produced for one rule set. The intermediate
/// automata stay available for inspection and testing.
#[derive(Debug, Clone)]
pub struct CompiledLexer {
    pub nfa: Nfa,
    pub dfa: Dfa,
    pub minimized: Dfa,
    pub definition: LexerDefinition,
}

/// Builder over a rule list and an alphabet.
///
/// The alphabet is caller-supplied — the pipeline does not infer it from
/// the patterns. A pattern literal outside the alphabet silently becomes a
/// dead column unless [`strict_alphabet`] is enabled.
///
/// [`strict_alphabet`]: LexerBuilder::strict_alphabet
#[derive(Debug, Clone, Default)]
pub struct LexerBuilder {
    rules: SmallVec<[LexicalRule; 16]>,
    alphabet: Vec<char>,
    strict: bool,
}

impl LexerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one rule. Later rules win priority ties.
    #[must_use]
    pub fn rule(mut self, pattern: &str, token: &str) -> Self {
        self.rules.push(LexicalRule::new(pattern, token));
        self
    }

    /// Append rules parsed from `regex;TOKEN` text.
    ///
    /// # Errors
    ///
    /// See [`parse_rules`].
    pub fn rules_text(mut self, text: &str) -> Result<Self, LexerBuildError> {
        self.rules.extend(parse_rules(text)?);
        Ok(self)
    }

    /// Set the input alphabet, which also fixes table column order.
    #[must_use]
    pub fn alphabet(mut self, alphabet: impl IntoIterator<Item = char>) -> Self {
        self.alphabet = alphabet.into_iter().collect();
        self
    }

    /// Fail the build when a pattern literal is missing from the alphabet
    /// instead of leaving an unreachable transition.
    #[must_use]
    pub fn strict_alphabet(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Run the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`LexerBuildError::NoRules`] for an empty rule list,
    /// [`LexerBuildError::Regex`] for an uncompilable pattern, and
    /// [`LexerBuildError::AlphabetMismatch`] in strict mode.
    pub fn build(self) -> Result<CompiledLexer, LexerBuildError> {
        if self.rules.is_empty() {
            return Err(LexerBuildError::NoRules);
        }

        let total = self.rules.len();
        let mut automata = Vec::with_capacity(total);
        for (index, rule) in self.rules.iter().enumerate() {
            let mut nfa = Nfa::compile(&rule.pattern).map_err(|source| LexerBuildError::Regex {
                token: rule.token.clone(),
                source,
            })?;
            if self.strict {
                for symbol in nfa.literal_symbols() {
                    if !self.alphabet.contains(&symbol) {
                        return Err(LexerBuildError::AlphabetMismatch {
                            token: rule.token.clone(),
                            symbol,
                        });
                    }
                }
            }
            // Later rules take precedence: the last rule gets priority 0.
            let priority = i32::try_from(total - index - 1).unwrap_or(i32::MAX);
            nfa.set_accept(rule.token.clone(), priority);
            automata.push(nfa);
        }

        let nfa = Nfa::union(automata);
        let dfa = Dfa::from_nfa(&nfa, &self.alphabet);
        let minimized = minimize(&dfa, &self.alphabet);
        let definition = LexerDefinition::from_dfa(&minimized, &self.alphabet);

        Ok(CompiledLexer {
            nfa,
            dfa,
            minimized,
            definition,
        })
    }
}
