//! # parsetab
//!
//! A compiler front-end construction toolkit. From a set of lexical rules
//! (regular expressions with token names) and a context-free grammar it
//! produces:
//!
//! - a deterministic tokenizer, built through a regex → NFA → DFA →
//!   minimized-DFA pipeline and driven by maximal munch with
//!   priority-based tie-breaking, and
//! - LL(1) and LALR(1) parsing tables with driver engines that decide
//!   whether a token stream belongs to the language.
//!
//! ## Lexer pipeline
//!
//! ```
//! use parsetab::lexer::{LexerBuilder, Tokenizer};
//!
//! let compiled = LexerBuilder::new()
//!     .rule("(a|b)*c+", "ABC")
//!     .rule("d(e|f)g*", "DEFG")
//!     .alphabet("abcdefg".chars())
//!     .build()
//!     .expect("rules compile");
//!
//! let tokenizer = Tokenizer::new(&compiled.definition);
//! let tokens = tokenizer.tokenize("bbbcde");
//! assert_eq!(tokens[0].kind, "ABC");
//! assert_eq!(tokens[1].kind, "DEFG");
//! ```
//!
//! ## Grammar analysis and parsing
//!
//! ```
//! use parsetab::grammar::{analysis::GrammarAnalysis, Grammar};
//! use parsetab::parser::{LalrParser, LalrTable};
//!
//! let grammar = Grammar::parse("E -> E + T | T\nT -> T * F | F\nF -> ( E ) | id")
//!     .expect("grammar parses");
//! let table = LalrTable::build(&grammar).expect("collection is well-formed");
//! assert!(table.conflicts().is_empty());
//!
//! let parser = LalrParser::new(&table);
//! assert!(parser.parse_kinds(&["id", "+", "id", "*", "id"]).is_ok());
//! assert!(parser.parse_kinds(&["id", "+"]).is_err());
//! ```
//!
//! ## Modules
//!
//! - [`lexer`] — regex preprocessing, Thompson construction, subset
//!   construction, minimization, the transition table and its tokenizer
//! - [`grammar`] — the symbol/production/grammar model and FIRST/FOLLOW
//! - [`parser`] — LL(1) and LALR(1) table construction and drivers
//! - [`error`] — structured errors and diagnostics
//!
//! Everything is synchronous, single-threaded CPU work on value-owned data;
//! the same inputs always produce the same tables.

pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;

pub use error::{
    GrammarError, LalrBuildError, LexerBuildError, LlConflict, ParseError, RegexError, TableError,
};
pub use grammar::{Grammar, GrammarBuilder, Production, Symbol, SymbolKind};
pub use lexer::{CompiledLexer, Dfa, LexerBuilder, LexerDefinition, Nfa, Token, Tokenizer};
pub use parser::{Action, Conflict, ConflictKind, LalrParser, LalrTable, LlParser, LlTable};
