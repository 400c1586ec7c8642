//! LL(1) predictive table construction and the stack-driven parser over it.
//!
//! A cell `M[A, a]` receives the production to apply when `A` is on top of
//! the stack and `a` is the lookahead. Two distinct productions landing in
//! one cell means the grammar is not LL(1); the build aborts with both
//! contenders.

use hashbrown::HashMap;

use crate::error::{LlConflict, ParseError};
use crate::grammar::analysis::GrammarAnalysis;
use crate::grammar::{Grammar, Production, Symbol};
use crate::lexer::Token;

/// The predictive parsing table `M[non-terminal, terminal] → production`.
#[derive(Debug, Clone)]
pub struct LlTable {
    table: HashMap<(Symbol, Symbol), usize, ahash::RandomState>,
    productions: Vec<Production>,
    start: Symbol,
}

impl LlTable {
    /// Fill the table from FIRST/FOLLOW.
    ///
    /// For each production `A → α`: every terminal in `FIRST(α) \ {ε}` maps
    /// to it; when `α` is nullable, so does every terminal in `FOLLOW(A)`.
    ///
    /// # Errors
    ///
    /// Returns the first [`LlConflict`] encountered — the grammar is
    /// rejected.
    pub fn build(grammar: &Grammar, analysis: &GrammarAnalysis) -> Result<Self, LlConflict> {
        let epsilon = Symbol::epsilon();
        let mut table: HashMap<(Symbol, Symbol), usize, ahash::RandomState> = HashMap::default();
        let productions: Vec<Production> = grammar.productions().to_vec();

        for (index, production) in productions.iter().enumerate() {
            let first_alpha = analysis.first_of_sequence(&production.right);

            for terminal in &first_alpha {
                if *terminal == epsilon {
                    continue;
                }
                Self::insert(&mut table, &productions, production, index, terminal)?;
            }

            if first_alpha.contains(&epsilon) {
                if let Some(follow_a) = analysis.follow(&production.left) {
                    for terminal in follow_a {
                        Self::insert(&mut table, &productions, production, index, terminal)?;
                    }
                }
            }
        }

        Ok(Self {
            table,
            productions,
            start: grammar.start().clone(),
        })
    }

    fn insert(
        table: &mut HashMap<(Symbol, Symbol), usize, ahash::RandomState>,
        productions: &[Production],
        production: &Production,
        index: usize,
        terminal: &Symbol,
    ) -> Result<(), LlConflict> {
        let key = (production.left.clone(), terminal.clone());
        match table.get(&key) {
            Some(&existing) if existing != index && productions[existing] != *production => {
                Err(LlConflict {
                    non_terminal: production.left.clone(),
                    lookahead: terminal.clone(),
                    first: productions[existing].clone(),
                    second: production.clone(),
                })
            }
            _ => {
                table.entry(key).or_insert(index);
                Ok(())
            }
        }
    }

    /// The production for `(non_terminal, lookahead)`, if any.
    #[must_use]
    pub fn production(&self, non_terminal: &Symbol, lookahead: &Symbol) -> Option<&Production> {
        self.table
            .get(&(non_terminal.clone(), lookahead.clone()))
            .map(|&index| &self.productions[index])
    }

    #[must_use]
    pub fn start(&self) -> &Symbol {
        &self.start
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Stack-driven predictive parser.
#[derive(Debug, Clone, Copy)]
pub struct LlParser<'a> {
    table: &'a LlTable,
}

impl<'a> LlParser<'a> {
    #[must_use]
    pub fn new(table: &'a LlTable) -> Self {
        Self { table }
    }

    /// Decide whether the token stream belongs to the language. Terminals
    /// match on token-type name.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] naming the offending token and position.
    pub fn parse(&self, tokens: &[Token]) -> Result<(), ParseError> {
        let kinds: Vec<&str> = tokens.iter().map(|t| t.kind.as_str()).collect();
        self.parse_kinds(&kinds)
    }

    /// Same as [`parse`], over bare token-type names.
    ///
    /// # Errors
    ///
    /// See [`parse`].
    ///
    /// [`parse`]: LlParser::parse
    pub fn parse_kinds(&self, kinds: &[&str]) -> Result<(), ParseError> {
        let mut stack: Vec<Symbol> = vec![Symbol::end(), self.table.start().clone()];
        let mut position = 0;

        while let Some(top) = stack.last().cloned() {
            // The input is the token kinds with a virtual `$` appended.
            let current = kinds
                .get(position)
                .copied()
                .unwrap_or(crate::grammar::END_MARKER);
            if top.is_terminal() {
                if top.is_epsilon() {
                    // ε never belongs on the stack; tolerate and move on.
                    stack.pop();
                    continue;
                }
                if top.name == current {
                    stack.pop();
                    position += 1;
                } else {
                    return Err(ParseError::ExpectedToken {
                        expected: top.name.clone(),
                        found: current.into(),
                        position,
                    });
                }
            } else {
                let terminal = Symbol::terminal(current);
                let Some(production) = self.table.production(&top, &terminal) else {
                    return Err(ParseError::NoTableEntry {
                        non_terminal: top.name.clone(),
                        token: current.into(),
                        position,
                    });
                };
                stack.pop();
                for symbol in production.right.iter().rev() {
                    if symbol.is_epsilon() {
                        continue;
                    }
                    stack.push(symbol.clone());
                }
            }
        }

        // The `$` sentinel at the stack bottom only matches the virtual
        // end-of-input, so an emptied stack means the input is consumed.
        Ok(())
    }
}
