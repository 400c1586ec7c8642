//! CLI interface for the parsetab tools.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "parsetab")]
#[command(about = "Build lexer tables and parsing tables from rule and grammar files")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a lexer transition table from a `regex;TOKEN` rules file
    Lex {
        /// Token definition file (one `regex;TOKEN` per line)
        #[arg(short, long)]
        rules: PathBuf,

        /// Input alphabet, as a string of characters
        #[arg(short, long)]
        alphabet: String,

        /// Output file for the JSON table (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail when a pattern literal is missing from the alphabet
        #[arg(long)]
        strict: bool,
    },

    /// Tokenize text against a previously built JSON table
    Tokenize {
        /// Transition-table JSON produced by `lex`
        #[arg(short, long)]
        table: PathBuf,

        /// Text to tokenize
        #[arg(short = 'x', long)]
        text: String,
    },

    /// Print FIRST/FOLLOW sets for a grammar file
    Analyze {
        /// Grammar file (`A -> a B | b` per line)
        #[arg(short, long)]
        grammar: PathBuf,
    },

    /// Run a parser engine over a whitespace-separated token-kind stream
    Parse {
        /// Grammar file (`A -> a B | b` per line)
        #[arg(short, long)]
        grammar: PathBuf,

        /// Parsing engine
        #[arg(short, long, default_value = "lalr")]
        engine: Engine,

        /// Token kinds, whitespace-separated (e.g. "id + id")
        #[arg(short, long)]
        tokens: String,

        /// Print the conflict list instead of failing on it
        #[arg(long)]
        show_conflicts: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Engine {
    Ll,
    Lalr,
}

impl std::str::FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ll" | "ll1" | "ll(1)" => Ok(Engine::Ll),
            "lalr" | "lalr1" | "lalr(1)" => Ok(Engine::Lalr),
            _ => Err(format!("Unknown engine: {s}. Supported: ll, lalr")),
        }
    }
}
