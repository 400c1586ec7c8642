//! Plain-text rendering of analysis results and table diagnostics.

use std::fmt::Write as _;

use parsetab::grammar::analysis::{AnalysisWarning, GrammarAnalysis};
use parsetab::grammar::{Grammar, Symbol};
use parsetab::parser::lalr::LalrTable;

fn sorted_names<'a>(symbols: impl IntoIterator<Item = &'a Symbol>) -> Vec<String> {
    let mut names: Vec<String> = symbols
        .into_iter()
        .map(|sym| sym.name.to_string())
        .collect();
    names.sort();
    names
}

/// FIRST and FOLLOW sets, one non-terminal per line, sorted.
#[must_use]
pub fn render_analysis(grammar: &Grammar, analysis: &GrammarAnalysis) -> String {
    let mut non_terminals: Vec<&Symbol> = grammar.non_terminals().iter().collect();
    non_terminals.sort();

    let mut out = String::new();
    for nt in &non_terminals {
        let names = sorted_names(analysis.first(nt).into_iter().flatten());
        let _ = writeln!(out, "FIRST({}) = {{ {} }}", nt.name, names.join(", "));
    }
    for nt in &non_terminals {
        let names = sorted_names(analysis.follow(nt).into_iter().flatten());
        let _ = writeln!(out, "FOLLOW({}) = {{ {} }}", nt.name, names.join(", "));
    }
    for warning in analysis.warnings() {
        match warning {
            AnalysisWarning::UnresolvedSymbol { symbol } => {
                let _ = writeln!(
                    out,
                    "warning: `{}` never appears on a left-hand side; treated as a terminal",
                    symbol.name
                );
            }
        }
    }
    out
}

/// One line per conflict, with both contending actions spelled out.
#[must_use]
pub fn render_conflicts(table: &LalrTable) -> String {
    let mut out = String::new();
    for conflict in table.conflicts() {
        let _ = writeln!(
            out,
            "{:?} conflict in state {} on `{}`: kept {:?}, refused {:?}",
            conflict.kind, conflict.state, conflict.symbol.name, conflict.existing,
            conflict.attempted
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_report_lists_sets_in_order() {
        let grammar = Grammar::parse("S -> a S | b").unwrap();
        let analysis = GrammarAnalysis::analyze(&grammar);
        let report = render_analysis(&grammar, &analysis);
        assert!(report.contains("FIRST(S) = { a, b }"));
        assert!(report.contains("FOLLOW(S) = { $ }"));
    }

    #[test]
    fn conflict_report_names_the_symbol() {
        let grammar = Grammar::parse("S -> A | B\nA -> x\nB -> x").unwrap();
        let table = LalrTable::build(&grammar).unwrap();
        let report = render_conflicts(&table);
        assert!(report.contains("ReduceReduce"));
        assert!(report.contains("`x`") || report.contains("`$`"));
    }
}
