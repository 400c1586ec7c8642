//! The portable transition table: a dense matrix view of a DFA plus its
//! JSON wire format.
//!
//! Column order follows the alphabet order handed to the builder, which
//! fixes the external layout. `-1` marks a missing transition.

// State counts are far below i32::MAX; the dense matrix stores them narrow.
#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

use std::path::Path;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::lexer::dfa::Dfa;

/// A DFA flattened into a dense transition table.
///
/// Serializes to the JSON object
/// `{"alphabet", "startState", "transitions", "isFinal", "tokenTypeNames"}`
/// with rows = states and columns = alphabet entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexerDefinition {
    pub alphabet: Vec<char>,
    pub start_state: usize,
    pub transitions: Vec<Vec<i32>>,
    pub is_final: Vec<bool>,
    pub token_type_names: Vec<Option<CompactString>>,
}

impl LexerDefinition {
    /// Flatten `dfa` over `alphabet` (which also fixes column order).
    #[must_use]
    pub fn from_dfa(dfa: &Dfa, alphabet: &[char]) -> Self {
        let states = dfa.states();
        let mut transitions = Vec::with_capacity(states.len());
        let mut is_final = Vec::with_capacity(states.len());
        let mut token_type_names = Vec::with_capacity(states.len());

        for state in states {
            let row: Vec<i32> = alphabet
                .iter()
                .map(|&c| state.transition(c).map_or(-1, |t| t as i32))
                .collect();
            transitions.push(row);
            is_final.push(state.is_final());
            token_type_names.push(state.token_name().map(CompactString::from));
        }

        Self {
            alphabet: alphabet.to_vec(),
            start_state: dfa.start(),
            transitions,
            is_final,
            token_type_names,
        }
    }

    /// Column index of `c`, if it is in the alphabet.
    #[must_use]
    pub fn alphabet_index(&self, c: char) -> Option<usize> {
        self.alphabet.iter().position(|&a| a == c)
    }

    #[must_use]
    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    /// Next state from `state` on alphabet column `column`, or `None` for
    /// the `-1` sentinel.
    #[must_use]
    pub fn next_state(&self, state: usize, column: usize) -> Option<usize> {
        let target = *self.transitions.get(state)?.get(column)?;
        usize::try_from(target).ok()
    }

    /// Check the dense-matrix invariants: one row per state, one column per
    /// alphabet entry, parallel final/name arrays.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Shape`] describing the first mismatch.
    pub fn validate(&self) -> Result<(), TableError> {
        let rows = self.transitions.len();
        if self.is_final.len() != rows || self.token_type_names.len() != rows {
            return Err(TableError::Shape {
                detail: format!(
                    "{rows} transition rows but {} final flags and {} token names",
                    self.is_final.len(),
                    self.token_type_names.len()
                ),
            });
        }
        if let Some(row) = self
            .transitions
            .iter()
            .find(|row| row.len() != self.alphabet.len())
        {
            return Err(TableError::Shape {
                detail: format!(
                    "row of width {} against alphabet of {}",
                    row.len(),
                    self.alphabet.len()
                ),
            });
        }
        if rows > 0 && self.start_state >= rows {
            return Err(TableError::Shape {
                detail: format!("start state {} out of {rows} states", self.start_state),
            });
        }
        let state_count = i64::try_from(rows).unwrap_or(i64::MAX);
        for (row_index, row) in self.transitions.iter().enumerate() {
            for &target in row {
                if i64::from(target) >= state_count || target < -1 {
                    return Err(TableError::Shape {
                        detail: format!("row {row_index} points at missing state {target}"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Serialize to the JSON wire format.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn to_json(&self) -> Result<String, TableError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from the JSON wire format and validate the shape.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Json`] on malformed JSON and
    /// [`TableError::Shape`] on ragged matrices.
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let definition: Self = serde_json::from_str(json)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Write the JSON form to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Io`] or serializer failures.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), TableError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a definition previously written by [`LexerDefinition::save_to_file`].
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Io`], [`TableError::Json`], or
    /// [`TableError::Shape`].
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::nfa::Nfa;

    fn sample() -> LexerDefinition {
        let mut nfa = Nfa::compile("ab").unwrap();
        nfa.set_accept("AB", 0);
        let alphabet = ['a', 'b'];
        let dfa = Dfa::from_nfa(&nfa, &alphabet);
        LexerDefinition::from_dfa(&dfa, &alphabet)
    }

    #[test]
    fn dense_matrix_shape() {
        let def = sample();
        assert_eq!(def.state_count(), 3);
        assert!(def.validate().is_ok());
        for row in &def.transitions {
            assert_eq!(row.len(), def.alphabet.len());
        }
    }

    #[test]
    fn missing_transitions_are_minus_one() {
        let def = sample();
        // No state consumes `a` twice.
        let a = def.alphabet_index('a').unwrap();
        let after_a = def.next_state(def.start_state, a).unwrap();
        assert_eq!(def.transitions[after_a][a], -1);
        assert_eq!(def.next_state(after_a, a), None);
    }

    #[test]
    fn json_uses_the_fixed_key_layout() {
        let def = sample();
        let json = def.to_json().unwrap();
        for key in [
            "\"alphabet\"",
            "\"startState\"",
            "\"transitions\"",
            "\"isFinal\"",
            "\"tokenTypeNames\"",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
        // Non-final states serialize a null token name.
        assert!(json.contains("null"));
    }

    #[test]
    fn json_round_trip_is_identity() {
        let def = sample();
        let restored = LexerDefinition::from_json(&def.to_json().unwrap()).unwrap();
        assert_eq!(def, restored);
    }

    #[test]
    fn ragged_matrix_is_rejected() {
        let mut def = sample();
        def.transitions[1].pop();
        assert!(matches!(def.validate(), Err(TableError::Shape { .. })));
    }

    #[test]
    fn out_of_range_targets_are_rejected() {
        let mut def = sample();
        def.transitions[0][0] = 99;
        assert!(matches!(def.validate(), Err(TableError::Shape { .. })));
    }

    #[test]
    fn mismatched_array_lengths_are_rejected() {
        let mut def = sample();
        def.is_final.pop();
        assert!(matches!(def.validate(), Err(TableError::Shape { .. })));
    }

    #[test]
    fn quote_and_backslash_survive_round_trip() {
        let mut def = sample();
        def.token_type_names[2] = Some(CompactString::from("WEIRD\"\\NAME"));
        let json = def.to_json().unwrap();
        let restored = LexerDefinition::from_json(&json).unwrap();
        assert_eq!(def, restored);
    }
}
