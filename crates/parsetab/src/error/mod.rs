//! # Error Types
//!
//! Error and diagnostic types for the lexer pipeline, grammar analysis and
//! table construction.
//!
//! Inner algorithms return structured values; higher layers aggregate them.
//! Every condition here is a deterministic function of the inputs — nothing
//! is retried.

use std::path::PathBuf;

use compact_str::CompactString;
use thiserror::Error;

use crate::grammar::{Production, Symbol};
use crate::parser::lalr::Action;

/// Errors produced while turning a regular expression into an NFA.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegexError {
    /// A postfix operator was applied with too few operands on the stack.
    #[error("operator `{operator}` at postfix position {position} is missing an operand")]
    MissingOperand { operator: char, position: usize },

    /// Parentheses did not pair up. The postfix converter is deliberately
    /// lenient; the dangling delimiter surfaces here instead.
    #[error("unbalanced parentheses in pattern")]
    UnbalancedParentheses,

    /// The pattern contained no operands at all.
    #[error("empty pattern")]
    EmptyPattern,

    /// Conversion finished with more than one fragment on the stack,
    /// i.e. operands were never connected by an operator.
    #[error("pattern leaves {count} unconnected fragments")]
    DanglingFragments { count: usize },
}

/// Errors produced while building a lexer from a set of rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexerBuildError {
    /// A rule's pattern failed regex-to-NFA conversion.
    #[error("rule `{token}`: {source}")]
    Regex {
        token: CompactString,
        #[source]
        source: RegexError,
    },

    /// A non-comment line in a token definition file had no `;` separator.
    #[error("line {line}: expected `regex;TOKEN`")]
    MalformedRule { line: usize },

    /// Strict mode only: a pattern literal is absent from the supplied
    /// alphabet. Without strict mode this shows up as a missing transition.
    #[error("rule `{token}`: literal '{symbol}' is not in the lexer alphabet")]
    AlphabetMismatch { token: CompactString, symbol: char },

    /// The builder was asked to build with no rules at all.
    #[error("no lexical rules were provided")]
    NoRules,
}

/// Errors produced while reading grammar text or assembling a [`Grammar`].
///
/// [`Grammar`]: crate::grammar::Grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// A non-comment line had no `->` separator.
    #[error("line {line}: expected `Name -> symbols`")]
    MalformedProduction { line: usize },

    /// No productions survived parsing.
    #[error("grammar has no productions")]
    Empty,

    /// An explicit start symbol never appears on a left-hand side.
    #[error("start symbol `{name}` never appears on a left-hand side")]
    UnknownStart { name: CompactString },
}

/// An LL(1) table cell would receive two distinct productions.
///
/// The grammar is rejected; both contenders are reported so the caller can
/// see exactly which alternatives overlap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("grammar is not LL(1): M[{non_terminal}, {lookahead}] receives both `{first}` and `{second}`")]
pub struct LlConflict {
    pub non_terminal: Symbol,
    pub lookahead: Symbol,
    pub first: Production,
    pub second: Production,
}

/// Invariant violations during LALR(1) table construction.
///
/// Ordinary Shift/Reduce and Reduce/Reduce conflicts are *not* errors; they
/// are collected as [`Conflict`] diagnostics and construction continues.
///
/// [`Conflict`]: crate::parser::lalr::Conflict
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LalrBuildError {
    /// The accept cell on `$` would be overwritten — the augmented start
    /// production makes this impossible for any well-formed collection.
    #[error("state {state}: accept entry on `$` collides with {existing:?}")]
    AcceptConflict { state: usize, existing: Action },
}

/// Runtime errors from the table-driven parser engines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// LL(1): the terminal on the stack does not match the current token.
    #[error("expected `{expected}`, found `{found}` at token {position}")]
    ExpectedToken {
        expected: CompactString,
        found: CompactString,
        position: usize,
    },

    /// LL(1): the predictive table has no entry for this pair.
    #[error("no rule for `{non_terminal}` on `{token}` at token {position}")]
    NoTableEntry {
        non_terminal: CompactString,
        token: CompactString,
        position: usize,
    },

    /// LALR(1): the ACTION table has no entry for this state and token.
    #[error("state {state}: no action for `{token}` at token {position}")]
    NoAction {
        state: usize,
        token: CompactString,
        position: usize,
    },

    /// LALR(1): a reduction exposed a state with no GOTO for the reduced
    /// non-terminal.
    #[error("state {state}: no goto for `{non_terminal}` after reduction")]
    NoGoto {
        state: usize,
        non_terminal: CompactString,
    },
}

/// Errors around the serialized transition table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to access `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid transition-table JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The dense matrix is ragged: row/column counts disagree with the
    /// alphabet and state arrays.
    #[error("transition table shape mismatch: {detail}")]
    Shape { detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::SymbolKind;

    #[test]
    fn regex_error_display() {
        let err = RegexError::MissingOperand {
            operator: '*',
            position: 0,
        };
        assert!(format!("{err}").contains("missing an operand"));
    }

    #[test]
    fn lexer_build_error_carries_rule_token() {
        let err = LexerBuildError::Regex {
            token: "NUMBER".into(),
            source: RegexError::EmptyPattern,
        };
        let text = format!("{err}");
        assert!(text.contains("NUMBER"));
        assert!(text.contains("empty pattern"));
    }

    #[test]
    fn ll_conflict_reports_both_productions() {
        let a = Symbol::new("A", SymbolKind::NonTerminal);
        let conflict = LlConflict {
            non_terminal: a.clone(),
            lookahead: Symbol::terminal("x"),
            first: Production::new(a.clone(), vec![Symbol::terminal("x")]),
            second: Production::new(a, vec![]),
        };
        let text = format!("{conflict}");
        assert!(text.contains("not LL(1)"));
        assert!(text.contains("A -> x"));
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::NoAction {
            state: 3,
            token: "id".into(),
            position: 2,
        };
        assert_eq!(format!("{err}"), "state 3: no action for `id` at token 2");
    }
}
