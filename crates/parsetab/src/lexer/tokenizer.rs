//! Table-driven tokenizer: maximal munch over a [`LexerDefinition`].
//!
//! At each position the driver advances the DFA as far as the table allows,
//! remembering the last accepting state it passed; on halt it emits that
//! token and resumes right after its lexeme. When no accepting state was
//! reached at all it emits an [`UNKNOWN`] token covering exactly one
//! character. Characters outside the alphabet halt the current run exactly
//! like a missing transition.

use compact_str::CompactString;

use crate::lexer::table::LexerDefinition;

/// Token name used for single-character fallbacks.
pub const UNKNOWN: &str = "UNKNOWN";

/// A recognized piece of input. Offsets are byte positions into the source,
/// `start..end` spanning the lexeme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: CompactString,
    pub lexeme: CompactString,
    pub start: usize,
    pub end: usize,
}

impl Token {
    #[must_use]
    pub fn new(
        kind: impl Into<CompactString>,
        lexeme: impl Into<CompactString>,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            kind: kind.into(),
            lexeme: lexeme.into(),
            start,
            end,
        }
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.kind == UNKNOWN
    }
}

/// Maximal-munch driver over a transition table.
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer<'a> {
    definition: &'a LexerDefinition,
}

impl<'a> Tokenizer<'a> {
    #[must_use]
    pub fn new(definition: &'a LexerDefinition) -> Self {
        Self { definition }
    }

    /// Tokenize the whole input. Total: every byte of `input` is covered by
    /// exactly one token.
    #[must_use]
    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut position = 0;
        while position < input.len() {
            let token = self.next_token(input, position);
            position = token.end;
            tokens.push(token);
        }
        tokens
    }

    /// Longest match starting at byte offset `position`, or the
    /// single-character [`UNKNOWN`] fallback.
    fn next_token(&self, input: &str, position: usize) -> Token {
        let def = self.definition;
        let mut state = def.start_state;
        let mut last_accept: Option<(usize, usize)> = None;

        for (offset, c) in input[position..].char_indices() {
            let Some(column) = def.alphabet_index(c) else {
                break;
            };
            let Some(next) = def.next_state(state, column) else {
                break;
            };
            state = next;
            if def.is_final[state] {
                last_accept = Some((state, position + offset + c.len_utf8()));
            }
        }

        match last_accept {
            Some((accept_state, end)) => {
                let kind = def.token_type_names[accept_state]
                    .clone()
                    .unwrap_or_else(|| CompactString::from(UNKNOWN));
                Token::new(kind, &input[position..end], position, end)
            }
            None => {
                let width = input[position..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
                let end = position + width;
                Token::new(UNKNOWN, &input[position..end], position, end)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::builder::LexerBuilder;

    fn definition(rules: &str, alphabet: &str) -> LexerDefinition {
        LexerBuilder::new()
            .rules_text(rules)
            .unwrap()
            .alphabet(alphabet.chars())
            .build()
            .unwrap()
            .definition
    }

    fn kinds(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.kind.as_str()).collect()
    }

    #[test]
    fn single_rule_stream() {
        let def = definition("(a|b)*c+;ABC", "abc");
        let tokenizer = Tokenizer::new(&def);
        let tokens = tokenizer.tokenize("abcc");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, "ABC");
        assert_eq!(tokens[0].lexeme, "abcc");
        assert_eq!((tokens[0].start, tokens[0].end), (0, 4));
    }

    #[test]
    fn maximal_munch_prefers_longest_match() {
        // `iff` must come out as one IDENTIFIER, not KEYWORD + `f`.
        let def = definition("if;KEYWORD\n(i|f)(i|f)*;IDENTIFIER", "if");
        let tokenizer = Tokenizer::new(&def);
        assert_eq!(kinds(&tokenizer.tokenize("iff")), vec!["IDENTIFIER"]);
    }

    #[test]
    fn priority_breaks_equal_length_ties() {
        // Same length: the later rule (lower priority number) wins.
        let def = definition("if;IDENTIFIER\nif;KEYWORD", "if");
        let tokenizer = Tokenizer::new(&def);
        assert_eq!(kinds(&tokenizer.tokenize("if")), vec!["KEYWORD"]);
    }

    #[test]
    fn unknown_fallback_covers_one_character() {
        let def = definition("a+;AS", "ab");
        let tokenizer = Tokenizer::new(&def);
        let tokens = tokenizer.tokenize("aba");
        assert_eq!(kinds(&tokens), vec!["AS", "UNKNOWN", "AS"]);
        assert_eq!(tokens[1].lexeme, "b");
        assert_eq!((tokens[1].start, tokens[1].end), (1, 2));
    }

    #[test]
    fn out_of_alphabet_character_halts_the_run() {
        let def = definition("a+;AS", "a");
        let tokenizer = Tokenizer::new(&def);
        let tokens = tokenizer.tokenize("aa!a");
        assert_eq!(kinds(&tokens), vec!["AS", "UNKNOWN", "AS"]);
        assert_eq!(tokens[1].lexeme, "!");
    }

    #[test]
    fn tokens_cover_every_byte() {
        let def = definition("a;A\nb;B", "ab");
        let tokenizer = Tokenizer::new(&def);
        let input = "abxba";
        let tokens = tokenizer.tokenize(input);
        let mut position = 0;
        for token in &tokens {
            assert_eq!(token.start, position);
            position = token.end;
        }
        assert_eq!(position, input.len());
    }

    #[test]
    fn resumes_after_each_lexeme() {
        let def = definition("ab;AB\na;A", "ab");
        let tokenizer = Tokenizer::new(&def);
        // `aba` = AB then A: munch takes `ab`, restarts at offset 2.
        assert_eq!(kinds(&tokenizer.tokenize("aba")), vec!["AB", "A"]);
    }

    #[test]
    fn tokenization_is_not_compositional_across_concatenation() {
        // tokenize(x) ++ tokenize(y) need not equal tokenize(x ++ y):
        // a greedy run across the seam swallows both halves.
        let def = definition("a;A\naa;AA", "a");
        let tokenizer = Tokenizer::new(&def);
        let separate = [tokenizer.tokenize("a"), tokenizer.tokenize("a")].concat();
        let joined = tokenizer.tokenize("aa");
        assert_eq!(kinds(&separate), vec!["A", "A"]);
        assert_eq!(kinds(&joined), vec!["AA"]);
        assert_ne!(kinds(&separate), kinds(&joined));
    }

    #[test]
    fn empty_input_produces_no_tokens() {
        let def = definition("a;A", "a");
        assert!(Tokenizer::new(&def).tokenize("").is_empty());
    }
}
