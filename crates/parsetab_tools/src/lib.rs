//! Developer command-line front end for the parsetab toolkit: build lexer
//! tables, tokenize inputs, and inspect grammar analyses and parser tables.

pub mod cli;
pub mod report;
