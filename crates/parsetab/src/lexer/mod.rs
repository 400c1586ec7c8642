//! # Lexer Module
//!
//! The lexer-construction pipeline and its runtime driver:
//!
//! ```text
//! regex text → postfix → NFA → combined NFA → DFA → minimized DFA → table
//! ```
//!
//! [`regex`] converts patterns to postfix, [`nfa`] runs Thompson
//! construction and the multi-rule union, [`dfa`] determinizes by subset
//! construction, [`minimize`] collapses equivalent states, [`table`] holds
//! the portable transition matrix, and [`tokenizer`] drives it with maximal
//! munch. [`builder`] wires the stages together from `regex;TOKEN` rule
//! text.
//!
//! Everything is synchronous, single-threaded CPU work on value-owned
//! graphs; two builds from the same inputs produce identical tables.

pub mod builder;
pub mod dfa;
pub mod minimize;
pub mod nfa;
pub mod regex;
pub mod table;
pub mod tokenizer;

pub use builder::{parse_rules, CompiledLexer, LexerBuilder, LexicalRule};
pub use dfa::{Dfa, DfaState};
pub use minimize::minimize;
pub use nfa::{AcceptTag, Nfa, NfaState, StateId};
pub use table::LexerDefinition;
pub use tokenizer::{Token, Tokenizer, UNKNOWN};
