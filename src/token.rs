//! Tokenizer: turns source text into a flat, ordered sequence of tokens.
//!
//! Tokens are produced once and never mutated; the parser holds a cursor
//! (index) into the resulting `Vec<Token>` rather than walking a linked
//! list, which keeps the same forward-only traversal without hand-rolled
//! pointer chasing.

use crate::diagnostics::{Diagnostics, Span};

const KEYWORDS: [&str; 7] = ["return", "if", "else", "for", "while", "int", "sizeof"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Num,
    Punc,
    Ident,
    Keyword,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Only meaningful for `TokenKind::Num`.
    pub value: i64,
}

impl Token {
    /// The lexeme this token covers, borrowed from the original source.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.offset..self.span.offset + self.span.len]
    }

    pub fn is(&self, source: &str, s: &str) -> bool {
        self.text(source) == s
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Produces the full token stream for `source`, ending in exactly one EOF
/// token. Never returns partial output: any lexical error is fatal.
pub fn tokenize(source: &str, diag: &Diagnostics) -> Vec<Token> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < len {
        let c = bytes[i] as char;

        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < len && (bytes[i] as char).is_ascii_digit() {
                i += 1;
            }
            // Accumulate digit-by-digit with wrapping arithmetic so an
            // unsigned-long-style overflow truncates instead of aborting
            // compilation, mirroring `strtoul` followed by a narrowing
            // cast rather than treating an unusually long literal as a
            // lexical error.
            let mut val: u64 = 0;
            for b in source[start..i].bytes() {
                let digit = (b - b'0') as u64;
                val = val.wrapping_mul(10).wrapping_add(digit);
            }
            tokens.push(Token {
                kind: TokenKind::Num,
                span: Span::new(start, i - start),
                value: val as u32 as i32 as i64,
            });
            continue;
        }

        if let Some(plen) = punct_len(&source[i..]) {
            tokens.push(Token {
                kind: TokenKind::Punc,
                span: Span::new(i, plen),
                value: 0,
            });
            i += plen;
            continue;
        }

        if let Some(klen) = keyword_len(&source[i..]) {
            tokens.push(Token {
                kind: TokenKind::Keyword,
                span: Span::new(i, klen),
                value: 0,
            });
            i += klen;
            continue;
        }

        if is_ident_start(c) {
            let start = i;
            i += 1;
            while i < len && is_ident_continue(bytes[i] as char) {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident,
                span: Span::new(start, i - start),
                value: 0,
            });
            continue;
        }

        diag.bail_at(Span::new(i, 1), "invalid token");
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(len, 0),
        value: 0,
    });
    tokens
}

/// Length of a punctuator starting at `rest`, trying the two-char forms
/// before falling back to any single ASCII punctuation byte.
fn punct_len(rest: &str) -> Option<usize> {
    for two in ["==", "!=", "<=", ">="] {
        if rest.starts_with(two) {
            return Some(2);
        }
    }
    let c = rest.chars().next()?;
    if c.is_ascii_punctuation() {
        Some(c.len_utf8())
    } else {
        None
    }
}

/// Length of a keyword prefix at `rest`, honoring the identifier-boundary
/// rule: the keyword only counts if the next byte does not continue an
/// identifier (so `return_x` lexes as one IDENT, not `return` + `_x`).
fn keyword_len(rest: &str) -> Option<usize> {
    for kw in KEYWORDS {
        if let Some(after) = rest.strip_prefix(kw) {
            let boundary_ok = match after.chars().next() {
                Some(c) => !is_ident_continue(c),
                None => true,
            };
            if boundary_ok {
                return Some(kw.len());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(src: &str) -> Vec<Token> {
        let diag = Diagnostics::new(src);
        tokenize(src, &diag)
    }

    #[test]
    fn empty_source_is_just_eof() {
        let t = toks("");
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].kind, TokenKind::Eof);
        assert_eq!(t[0].span.offset, 0);
    }

    #[test]
    fn classifies_number_punct_ident_keyword() {
        let src = "int x = 12 + y;";
        let t = toks(src);
        let kinds: Vec<TokenKind> = t.iter().map(|tok| tok.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword, // int
                TokenKind::Ident,   // x
                TokenKind::Punc,    // =
                TokenKind::Num,     // 12
                TokenKind::Punc,    // +
                TokenKind::Ident,   // y
                TokenKind::Punc,    // ;
                TokenKind::Eof,
            ]
        );
        assert_eq!(t[3].value, 12);
    }

    #[test]
    fn keyword_identifier_boundary() {
        // "return_x" must be one IDENT, not "return" + "_x".
        let src = "return_x";
        let t = toks(src);
        assert_eq!(t[0].kind, TokenKind::Ident);
        assert_eq!(t[0].text(src), "return_x");
    }

    #[test]
    fn multi_char_punctuators_are_greedy() {
        let src = "a == b != c <= d >= e";
        let t = toks(src);
        let puncts: Vec<&str> = t
            .iter()
            .filter(|tok| tok.kind == TokenKind::Punc)
            .map(|tok| tok.text(src))
            .collect();
        assert_eq!(puncts, vec!["==", "!=", "<=", ">="]);
    }

    #[test]
    fn single_char_punctuators_fall_back() {
        let src = "a = b < c";
        let t = toks(src);
        let puncts: Vec<&str> = t
            .iter()
            .filter(|tok| tok.kind == TokenKind::Punc)
            .map(|tok| tok.text(src))
            .collect();
        assert_eq!(puncts, vec!["=", "<"]);
    }

    #[test]
    fn number_truncates_to_32_bit_signed() {
        let t = toks("4294967296"); // 2^32, truncates to 0
        assert_eq!(t[0].value, 0);
    }

    #[test]
    fn number_overflowing_u64_wraps_instead_of_erroring() {
        // 20 nines overflows even a u64 accumulator; it must wrap around
        // rather than aborting the tokenizer with a fatal diagnostic.
        let t = toks("99999999999999999999");
        assert_eq!(t[0].kind, TokenKind::Num);
        assert_eq!(t[0].value, 1661992959);
    }
}
