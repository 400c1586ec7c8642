//! parsetab CLI
//!
//! Thin dispatch over the library: each subcommand reads its input files,
//! runs one pipeline stage, and prints the result.

use std::fs;

use clap::Parser;

use parsetab::grammar::analysis::GrammarAnalysis;
use parsetab::grammar::Grammar;
use parsetab::lexer::{LexerBuilder, LexerDefinition, Tokenizer};
use parsetab::parser::{LalrParser, LalrTable, LlParser, LlTable};
use parsetab_tools::cli::{Cli, Commands, Engine};
use parsetab_tools::report;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Lex {
            rules,
            alphabet,
            output,
            strict,
        } => {
            let text = fs::read_to_string(&rules)?;
            let compiled = LexerBuilder::new()
                .rules_text(&text)?
                .alphabet(alphabet.chars())
                .strict_alphabet(strict)
                .build()?;
            let json = compiled.definition.to_json()?;
            match output {
                Some(path) => fs::write(path, json)?,
                None => println!("{json}"),
            }
            eprintln!(
                "{} states ({} before minimization)",
                compiled.minimized.len(),
                compiled.dfa.len()
            );
        }

        Commands::Tokenize { table, text } => {
            let definition = LexerDefinition::load_from_file(&table)?;
            let tokenizer = Tokenizer::new(&definition);
            for token in tokenizer.tokenize(&text) {
                println!(
                    "{}..{}\t{}\t{:?}",
                    token.start, token.end, token.kind, token.lexeme
                );
            }
        }

        Commands::Analyze { grammar } => {
            let text = fs::read_to_string(&grammar)?;
            let grammar = Grammar::parse(&text)?;
            let analysis = GrammarAnalysis::analyze(&grammar);
            print!("{}", report::render_analysis(&grammar, &analysis));
        }

        Commands::Parse {
            grammar,
            engine,
            tokens,
            show_conflicts,
        } => {
            let text = fs::read_to_string(&grammar)?;
            let grammar = Grammar::parse(&text)?;
            let kinds: Vec<&str> = tokens.split_whitespace().collect();

            let outcome = match engine {
                Engine::Ll => {
                    let analysis = GrammarAnalysis::analyze(&grammar);
                    let table = LlTable::build(&grammar, &analysis)?;
                    LlParser::new(&table).parse_kinds(&kinds)
                }
                Engine::Lalr => {
                    let table = LalrTable::build(&grammar)?;
                    if !table.conflicts().is_empty() {
                        if show_conflicts {
                            eprint!("{}", report::render_conflicts(&table));
                        } else {
                            return Err(format!(
                                "{} conflicts in LALR table (re-run with --show-conflicts)",
                                table.conflicts().len()
                            )
                            .into());
                        }
                    }
                    LalrParser::new(&table).parse_kinds(&kinds)
                }
            };

            match outcome {
                Ok(()) => println!("accepted"),
                Err(err) => {
                    println!("rejected: {err}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
