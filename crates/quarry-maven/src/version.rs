//! Maven version parsing and ordering.
//!
//! This module provides:
//! - Tokenization of free-form version strings into Maven's list-of-lists item structure
//! - Canonicalization (trailing zeros and release aliases are insignificant)
//! - A total order over versions that reproduces Maven's qualifier table

use num_bigint::BigUint;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors raised while parsing version strings, version ranges and coordinates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A version string could not be parsed.
    #[error("invalid version '{version}': {reason}")]
    Version { version: String, reason: String },

    /// A single bracketed restriction is malformed.
    #[error("invalid restriction '{spec}': {reason}")]
    Restriction { spec: String, reason: String },

    /// A version range specification is malformed.
    #[error("invalid version range '{spec}': {reason}")]
    VersionRange { spec: String, reason: String },

    /// An artifact coordinate is malformed.
    #[error("invalid artifact coordinate '{coordinate}': {reason}")]
    Artifact { coordinate: String, reason: String },
}

/// Qualifiers with a fixed rank. The empty string marks a release.
const QUALIFIERS: [&str; 7] = ["alpha", "beta", "milestone", "rc", "snapshot", "", "sp"];

/// Rank of the release marker within [`QUALIFIERS`].
const RELEASE_RANK: usize = 5;

/// One token of a parsed version, in pre-order.
///
/// Nested segments are bracketed by `Open` and `Close`, so the structure is stored flat and
/// no traversal recurses, however deep the nesting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Token {
    /// A numeric run, leading zeros stripped.
    Int(BigUint),
    /// A lowercase qualifier with aliases applied.
    Qualifier(String),
    /// Start of a nested segment, opened by `-` or by a digit/letter transition.
    Open,
    /// End of a nested segment.
    Close,
}

impl Token {
    fn int(digits: &str) -> Self {
        // Only ASCII digits reach this point, so parsing cannot fail.
        Self::Int(digits.parse().unwrap_or_default())
    }

    fn qualifier(text: &str, followed_by_digit: bool) -> Self {
        let expanded = if followed_by_digit && text.len() == 1 {
            match text {
                "a" => "alpha",
                "b" => "beta",
                "m" => "milestone",
                other => other,
            }
        } else {
            text
        };
        let canonical = match expanded {
            "ga" | "final" => "",
            "cr" => "rc",
            other => other,
        };
        Self::Qualifier(canonical.to_string())
    }

    fn scalar(text: &str, is_digit: bool) -> Self {
        if is_digit {
            Self::int(text)
        } else {
            Self::qualifier(text, false)
        }
    }

    /// Whether a scalar is equivalent to an absent item.
    fn is_null(&self) -> bool {
        match self {
            Self::Int(value) => *value == BigUint::default(),
            Self::Qualifier(value) => value.is_empty(),
            Self::Open | Self::Close => false,
        }
    }

    /// Compare a scalar against padding.
    fn compare_null(&self) -> Ordering {
        match self {
            Self::Int(value) if *value == BigUint::default() => Ordering::Equal,
            Self::Int(_) => Ordering::Greater,
            Self::Qualifier(value) => qualifier_key(value).cmp(&release_key()),
            Self::Open | Self::Close => Ordering::Equal,
        }
    }
}

/// Sort key for a qualifier: known qualifiers by rank, then unknown ones alphabetically.
fn qualifier_key(value: &str) -> (usize, &str) {
    match QUALIFIERS.iter().position(|known| *known == value) {
        Some(rank) => (rank, ""),
        None => (QUALIFIERS.len(), value),
    }
}

fn release_key() -> (usize, &'static str) {
    (RELEASE_RANK, "")
}

/// The item starting at `index`, or `None` at the end of the current segment.
fn peek(tokens: &[Token], index: usize) -> Option<&Token> {
    tokens
        .get(index)
        .filter(|token| !matches!(token, Token::Close))
}

/// Compare two items when at least one side is a scalar.
fn compare_items(left: Option<&Token>, right: Option<&Token>) -> Ordering {
    match (left, right) {
        (Some(Token::Int(a)), Some(Token::Int(b))) => a.cmp(b),
        (Some(Token::Qualifier(a)), Some(Token::Qualifier(b))) => {
            qualifier_key(a).cmp(&qualifier_key(b))
        }
        (Some(Token::Int(_)), Some(_)) => Ordering::Greater,
        (Some(Token::Qualifier(_)), Some(_)) => Ordering::Less,
        (Some(Token::Open), Some(Token::Int(_))) => Ordering::Less,
        (Some(Token::Open), Some(_)) => Ordering::Greater,
        (Some(Token::Close), Some(_)) => unreachable!("peek never yields Close"),
        (Some(item), None) => item.compare_null(),
        (None, Some(item)) => item.compare_null().reverse(),
        (None, None) => Ordering::Equal,
    }
}

/// Element-wise comparison of two token streams, padding the shorter segment with absent
/// items.
///
/// Each frame is one open segment and records which sides are real rather than padding at
/// that depth.
fn compare_tokens(left: &[Token], right: &[Token]) -> Ordering {
    let (mut l, mut r) = (0, 0);
    let mut frames = vec![(true, true)];

    while let Some(&(left_active, right_active)) = frames.last() {
        let lhs = if left_active { peek(left, l) } else { None };
        let rhs = if right_active { peek(right, r) } else { None };

        match (lhs, rhs) {
            (None, None) => {
                frames.pop();
                if !frames.is_empty() {
                    l += usize::from(left_active);
                    r += usize::from(right_active);
                }
            }
            (Some(Token::Open), Some(Token::Open)) => {
                l += 1;
                r += 1;
                frames.push((true, true));
            }
            (Some(Token::Open), None) => {
                l += 1;
                frames.push((true, false));
            }
            (None, Some(Token::Open)) => {
                r += 1;
                frames.push((false, true));
            }
            (lhs, rhs) => {
                let ordering = compare_items(lhs, rhs);
                if ordering.is_ne() {
                    return ordering;
                }
                l += usize::from(lhs.is_some());
                r += usize::from(rhs.is_some());
            }
        }
    }
    Ordering::Equal
}

/// Builds the segment chain while scanning a version string.
///
/// Every `-` or digit/letter transition opens a segment nested in the current one. Segments
/// stay open until the end of input, so they form a chain.
struct Tokenizer {
    /// Open segments; the last one receives new items.
    segments: Vec<Vec<Token>>,
}

impl Tokenizer {
    fn new() -> Self {
        Self {
            segments: vec![Vec::new()],
        }
    }

    fn push(&mut self, token: Token) {
        if let Some(current) = self.segments.last_mut() {
            current.push(token);
        }
    }

    fn open_segment(&mut self) {
        self.segments.push(Vec::new());
    }

    /// Drop insignificant trailing items and flatten the chain into tokens.
    ///
    /// Null items are removed from the end of every segment, including directly before a
    /// nested segment. Innermost segments left empty vanish along with their brackets.
    fn finish(mut self) -> Vec<Token> {
        for segment in &mut self.segments {
            while segment.last().is_some_and(Token::is_null) {
                segment.pop();
            }
        }
        let depth = self
            .segments
            .iter()
            .rposition(|segment| !segment.is_empty())
            .unwrap_or(0);

        let mut tokens = Vec::new();
        for (index, segment) in self.segments.into_iter().take(depth + 1).enumerate() {
            if index > 0 {
                tokens.push(Token::Open);
            }
            tokens.extend(segment);
        }
        tokens.resize(tokens.len() + depth, Token::Close);
        tokens
    }
}

fn tokenize(version: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new();
    let chars: Vec<char> = version.chars().collect();
    let mut is_digit = false;
    let mut start = 0;

    for (index, &ch) in chars.iter().enumerate() {
        match ch {
            '.' | '-' => {
                if index == start {
                    tokenizer.push(Token::Int(BigUint::default()));
                } else {
                    let text: String = chars[start..index].iter().collect();
                    tokenizer.push(Token::scalar(&text, is_digit));
                }
                start = index + 1;
                if ch == '-' {
                    tokenizer.open_segment();
                }
            }
            c if c.is_ascii_digit() => {
                if !is_digit && index > start {
                    let text: String = chars[start..index].iter().collect();
                    tokenizer.push(Token::qualifier(&text, true));
                    start = index;
                    tokenizer.open_segment();
                }
                is_digit = true;
            }
            _ => {
                if is_digit && index > start {
                    let text: String = chars[start..index].iter().collect();
                    tokenizer.push(Token::int(&text));
                    start = index;
                    tokenizer.open_segment();
                }
                is_digit = false;
            }
        }
    }

    if chars.len() > start {
        let text: String = chars[start..].iter().collect();
        tokenizer.push(Token::scalar(&text, is_digit));
    }

    tokenizer.finish()
}

/// A Maven version.
///
/// Equality and ordering are defined over the canonical token sequence, so `1`, `1.0` and `1-ga`
/// are the same version. The text the version was parsed from is kept for display.
#[derive(Debug, Clone)]
pub struct Version {
    text: String,
    tokens: Vec<Token>,
}

impl Version {
    /// Parse a version string.
    ///
    /// Every non-blank input is accepted; runs that are not numbers become qualifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or only whitespace.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ParseError::Version {
                version: text.to_string(),
                reason: "version cannot be empty".to_string(),
            });
        }
        Ok(Self {
            text: trimmed.to_string(),
            tokens: tokenize(&trimmed.to_lowercase()),
        })
    }

    /// Build a version from text known to be non-blank, such as a constant.
    pub(crate) fn from_known(text: &str) -> Self {
        let trimmed = text.trim();
        Self {
            text: trimmed.to_string(),
            tokens: tokenize(&trimmed.to_lowercase()),
        }
    }

    /// The text this version was parsed from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns true if the version carries a `SNAPSHOT` marker.
    #[must_use]
    pub fn is_snapshot(&self) -> bool {
        self.text.to_lowercase().contains("snapshot")
    }

    /// Render the canonical item structure, e.g. `[1, [alpha, [1]]]` for `1a1`.
    #[must_use]
    pub fn canonical(&self) -> String {
        let mut out = String::from("[");
        let mut separate = false;
        for token in &self.tokens {
            if separate && !matches!(token, Token::Close) {
                out.push_str(", ");
            }
            match token {
                Token::Int(value) => out.push_str(&value.to_string()),
                Token::Qualifier(value) => out.push_str(value),
                Token::Open => out.push('['),
                Token::Close => out.push(']'),
            }
            separate = !matches!(token, Token::Open);
        }
        out.push(']');
        out
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tokens.hash(state);
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_tokens(&self.tokens, &other.tokens)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::str::FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
