use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Fold full-width forms to ASCII and lowercase the result.
fn fold(c: char) -> char {
    let c = match c {
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        '\u{3000}' => ' ',
        _ => c,
    };
    c.to_lowercase().next().unwrap_or(c)
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    /// A digit run with leading zeros removed.
    Digits(String),
    Char(char),
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Token::Digits(a), Token::Digits(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            // A digit run sits where '0' would in character order.
            (Token::Digits(_), Token::Char(c)) => '0'.cmp(c),
            (Token::Char(c), Token::Digits(_)) => c.cmp(&'0'),
            (Token::Char(a), Token::Char(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct Tokens<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Tokens<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            chars: s.chars().peekable(),
        }
    }
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let c = fold(self.chars.next()?);
        if !c.is_ascii_digit() {
            return Some(Token::Char(c));
        }

        let mut digits = String::new();
        if c != '0' {
            digits.push(c);
        }
        while let Some(&next) = self.chars.peek() {
            let next = fold(next);
            if !next.is_ascii_digit() {
                break;
            }
            self.chars.next();
            if !(digits.is_empty() && next == '0') {
                digits.push(next);
            }
        }
        Some(Token::Digits(digits))
    }
}

/// Natural string order: digit runs compare by numeric value, other
/// characters compare case-insensitively with full-width forms folded
/// to their ASCII counterparts.
///
/// Strings that differ only in case, width, or leading zeros compare
/// equal; callers wanting a strict order tie-break on the raw strings.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    Tokens::new(a).cmp(Tokens::new(b))
}
