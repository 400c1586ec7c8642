//! # Parser Module
//!
//! Parsing-table construction and the driver engines over token streams.
//!
//! [`ll`] builds the LL(1) predictive table from FIRST/FOLLOW and drives it
//! with an explicit symbol stack. [`lr`] constructs the canonical LR(1)
//! collection; [`lalr`] merges it by kernel into the LALR(1) ACTION/GOTO
//! tables and runs the shift/reduce loop.
//!
//! Both engines answer the same question — does this token stream belong to
//! the language — and report structured [`ParseError`]s when it does not.
//!
//! [`ParseError`]: crate::error::ParseError

pub mod lalr;
pub mod ll;
pub mod lr;

pub use lalr::{Action, Conflict, ConflictKind, LalrParser, LalrTable};
pub use ll::{LlParser, LlTable};
pub use lr::{ItemSet, Kernel, Lr1Automaton, LrItem};
