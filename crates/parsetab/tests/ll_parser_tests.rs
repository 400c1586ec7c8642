//! Tests for LL(1) table construction and the predictive driver.

use parsetab::error::ParseError;
use parsetab::grammar::analysis::GrammarAnalysis;
use parsetab::grammar::{Grammar, Symbol};
use parsetab::lexer::{LexerBuilder, Tokenizer};
use parsetab::parser::{LlParser, LlTable};

fn table(text: &str) -> LlTable {
    let grammar = Grammar::parse(text).unwrap();
    let analysis = GrammarAnalysis::analyze(&grammar);
    LlTable::build(&grammar, &analysis).unwrap()
}

#[test]
fn right_recursive_grammar_accepts_and_rejects() {
    let table = table("S -> a S | b");
    let parser = LlParser::new(&table);

    for accepted in [&["b"][..], &["a", "b"], &["a", "a", "a", "b"]] {
        assert!(parser.parse_kinds(accepted).is_ok(), "expected {accepted:?}");
    }
    for rejected in [&[][..], &["a"], &["b", "a"]] {
        assert!(parser.parse_kinds(rejected).is_err(), "rejected {rejected:?}");
    }
}

#[test]
fn table_cells_match_first_sets() {
    let table = table("S -> a S | b");
    let s = Symbol::non_terminal("S");
    let on_a = table.production(&s, &Symbol::terminal("a")).unwrap();
    assert_eq!(
        on_a.right,
        vec![Symbol::terminal("a"), Symbol::non_terminal("S")]
    );
    let on_b = table.production(&s, &Symbol::terminal("b")).unwrap();
    assert_eq!(on_b.right, vec![Symbol::terminal("b")]);
}

#[test]
fn nullable_grammar_parses_via_follow() {
    // Classic: T -> ( T ) T | ε over balanced parentheses.
    let table = table("T -> ( T ) T | \u{03b5}");
    let parser = LlParser::new(&table);

    assert!(parser.parse_kinds(&[]).is_ok());
    assert!(parser.parse_kinds(&["(", ")"]).is_ok());
    assert!(parser.parse_kinds(&["(", "(", ")", ")", "(", ")"]).is_ok());
    assert!(parser.parse_kinds(&["("]).is_err());
    assert!(parser.parse_kinds(&[")"]).is_err());
}

#[test]
fn conflict_carries_the_colliding_productions() {
    // Common-prefix alternatives are not LL(1).
    let grammar = Grammar::parse("S -> a b | a c").unwrap();
    let analysis = GrammarAnalysis::analyze(&grammar);
    let err = LlTable::build(&grammar, &analysis).unwrap_err();
    assert_eq!(err.non_terminal, Symbol::non_terminal("S"));
    assert_eq!(err.lookahead, Symbol::terminal("a"));
    assert_ne!(err.first, err.second);
}

#[test]
fn errors_name_token_and_position() {
    let table = table("S -> a S | b");
    let parser = LlParser::new(&table);

    let err = parser.parse_kinds(&["a", "c"]).unwrap_err();
    assert_eq!(
        err,
        ParseError::NoTableEntry {
            non_terminal: "S".into(),
            token: "c".into(),
            position: 1,
        }
    );
}

#[test]
fn lexer_feeds_the_parser() {
    // Tokenize with the pipeline, parse the resulting kinds.
    let lexer = LexerBuilder::new()
        .rule("a", "a")
        .rule("b", "b")
        .alphabet("ab".chars())
        .build()
        .unwrap();
    let tokens = Tokenizer::new(&lexer.definition).tokenize("aab");

    let table = table("S -> a S | b");
    let parser = LlParser::new(&table);
    assert!(parser.parse(&tokens).is_ok());
}
