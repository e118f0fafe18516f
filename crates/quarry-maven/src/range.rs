//! Version restrictions and ranges.
//!
//! Supports Maven range syntax:
//! - `1.0` - recommended version, matches anything
//! - `[1.0]` - exactly 1.0
//! - `[1.0,2.0)` - 1.0 inclusive to 2.0 exclusive
//! - `(,1.0],[1.2,)` - several disjoint intervals

use crate::version::{ParseError, Version};
use std::cmp::Ordering;
use std::fmt;

/// One interval over [`Version`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Restriction {
    lower: Option<Version>,
    lower_inclusive: bool,
    upper: Option<Version>,
    upper_inclusive: bool,
}

impl Restriction {
    /// A restriction with no bounds. Contains every version.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            lower: None,
            lower_inclusive: false,
            upper: None,
            upper_inclusive: false,
        }
    }

    /// Parse a single bracketed interval such as `[1.0,2.0)` or `[1.0]`.
    ///
    /// # Errors
    ///
    /// Fails on missing brackets, inverted bounds, or equal bounds with an exclusive side.
    pub fn parse(spec: &str) -> Result<Self, ParseError> {
        let error = |reason: &str| ParseError::Restriction {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let lower_inclusive = match spec.chars().next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Err(error("must start with '[' or '('")),
        };
        let upper_inclusive = match spec.chars().last() {
            Some(']') if spec.len() > 1 => true,
            Some(')') if spec.len() > 1 => false,
            _ => return Err(error("must end with ']' or ')'")),
        };
        let inner = spec[1..spec.len() - 1].trim();

        let Some((low, high)) = inner.split_once(',') else {
            if !lower_inclusive || !upper_inclusive {
                return Err(error("single version must be bounded by '[' and ']'"));
            }
            let version = Version::parse(inner).map_err(|_| error("version cannot be empty"))?;
            return Ok(Self {
                lower: Some(version.clone()),
                lower_inclusive,
                upper: Some(version),
                upper_inclusive,
            });
        };

        if high.contains(',') {
            return Err(error("expected at most one ','"));
        }

        let bound = |text: &str| -> Result<Option<Version>, ParseError> {
            let text = text.trim();
            if text.is_empty() {
                Ok(None)
            } else {
                Version::parse(text)
                    .map(Some)
                    .map_err(|err| error(&err.to_string()))
            }
        };
        let lower = bound(low)?;
        let upper = bound(high)?;

        if let (Some(lower), Some(upper)) = (&lower, &upper) {
            match lower.cmp(upper) {
                Ordering::Greater => return Err(error("lower bound is greater than upper bound")),
                Ordering::Equal if !lower_inclusive || !upper_inclusive => {
                    return Err(error("equal bounds must both be inclusive"))
                }
                _ => {}
            }
        }

        Ok(Self {
            lower,
            lower_inclusive: lower_inclusive && is_set(low),
            upper,
            upper_inclusive: upper_inclusive && is_set(high),
        })
    }

    #[must_use]
    pub fn lower(&self) -> Option<&Version> {
        self.lower.as_ref()
    }

    #[must_use]
    pub fn lower_inclusive(&self) -> bool {
        self.lower_inclusive
    }

    #[must_use]
    pub fn upper(&self) -> Option<&Version> {
        self.upper.as_ref()
    }

    #[must_use]
    pub fn upper_inclusive(&self) -> bool {
        self.upper_inclusive
    }

    /// Check if a version falls within both bounds.
    #[must_use]
    pub fn contains(&self, version: &Version) -> bool {
        let above_lower = match &self.lower {
            None => true,
            Some(lower) => match version.cmp(lower) {
                Ordering::Greater => true,
                Ordering::Equal => self.lower_inclusive,
                Ordering::Less => false,
            },
        };
        let below_upper = match &self.upper {
            None => true,
            Some(upper) => match version.cmp(upper) {
                Ordering::Less => true,
                Ordering::Equal => self.upper_inclusive,
                Ordering::Greater => false,
            },
        };
        above_lower && below_upper
    }
}

/// A side only keeps its inclusive flag while it carries a version.
fn is_set(text: &str) -> bool {
    !text.trim().is_empty()
}

impl Ord for Restriction {
    fn cmp(&self, other: &Self) -> Ordering {
        // Absent lower bounds sort first, absent upper bounds sort last.
        let lower = match (&self.lower, &other.lower) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.cmp(b),
        };
        let upper = || match (&self.upper, &other.upper) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(b),
        };
        lower
            .then_with(|| other.lower_inclusive.cmp(&self.lower_inclusive))
            .then_with(upper)
            .then_with(|| self.upper_inclusive.cmp(&other.upper_inclusive))
    }
}

impl PartialOrd for Restriction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.lower_inclusive { '[' } else { '(' };
        let close = if self.upper_inclusive { ']' } else { ')' };
        match (&self.lower, &self.upper) {
            (Some(lower), Some(upper))
                if lower == upper && self.lower_inclusive && self.upper_inclusive =>
            {
                write!(f, "[{lower}]")
            }
            (lower, upper) => {
                write!(f, "{open}")?;
                if let Some(lower) = lower {
                    write!(f, "{lower}")?;
                }
                write!(f, ",")?;
                if let Some(upper) = upper {
                    write!(f, "{upper}")?;
                }
                write!(f, "{close}")
            }
        }
    }
}

/// A version constraint: a recommended version or a set of disjoint restrictions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionRange {
    recommended: Option<Version>,
    restrictions: Vec<Restriction>,
}

impl VersionRange {
    /// Parse a range specification.
    ///
    /// # Errors
    ///
    /// Fails if any restriction is malformed, if restrictions overlap or touch, or if text
    /// trails the last restriction.
    pub fn parse(spec: &str) -> Result<Self, ParseError> {
        let trimmed = spec.trim();
        if !trimmed.starts_with(['[', '(']) {
            let version = Version::parse(trimmed).map_err(|_| ParseError::VersionRange {
                spec: spec.to_string(),
                reason: "range cannot be empty".to_string(),
            })?;
            return Ok(Self {
                recommended: Some(version),
                restrictions: vec![Restriction::unbounded()],
            });
        }

        let error = |reason: String| ParseError::VersionRange {
            spec: spec.to_string(),
            reason,
        };

        let mut restrictions = Vec::new();
        let mut rest = trimmed;
        while rest.starts_with(['[', '(']) {
            let Some(end) = rest.find([']', ')']) else {
                return Err(error("unbounded restriction".to_string()));
            };
            let restriction = Restriction::parse(&rest[..=end])
                .map_err(|err| error(err.to_string()))?;
            restrictions.push(restriction);

            rest = rest[end + 1..].trim_start();
            if rest.is_empty() {
                break;
            }
            let Some(stripped) = rest.strip_prefix(',') else {
                return Err(error(format!("expected ',' before '{rest}'")));
            };
            rest = stripped.trim_start();
            if rest.is_empty() {
                return Err(error("dangling ',' after the last restriction".to_string()));
            }
        }
        if !rest.is_empty() {
            return Err(error(format!("unexpected text '{rest}' after restrictions")));
        }

        restrictions.sort();
        for pair in restrictions.windows(2) {
            let (previous, next) = (&pair[0], &pair[1]);
            let disjoint = match (previous.upper(), next.lower()) {
                (Some(upper), Some(lower)) => lower > upper,
                _ => false,
            };
            if !disjoint {
                return Err(error(format!("ranges overlap: {previous} and {next}")));
            }
        }

        Ok(Self {
            recommended: None,
            restrictions,
        })
    }

    /// The range matching any version.
    #[must_use]
    pub fn any() -> Self {
        Self {
            recommended: None,
            restrictions: vec![Restriction::unbounded()],
        }
    }

    /// The recommended version, for bare (non-bracketed) specifications.
    #[must_use]
    pub fn recommended(&self) -> Option<&Version> {
        self.recommended.as_ref()
    }

    #[must_use]
    pub fn restrictions(&self) -> &[Restriction] {
        &self.restrictions
    }

    /// Returns true if this is a bare recommended version rather than a bracketed range.
    #[must_use]
    pub fn is_recommendation(&self) -> bool {
        self.recommended.is_some()
    }

    /// Check if a version satisfies any restriction.
    ///
    /// A recommended version carries an unbounded restriction, so it contains everything.
    #[must_use]
    pub fn contains(&self, version: &Version) -> bool {
        self.restrictions.iter().any(|r| r.contains(version))
    }

    /// Return the first contained candidate. Candidates are expected newest-first.
    #[must_use]
    pub fn select<'a>(&self, candidates: &'a [Version]) -> Option<&'a Version> {
        candidates.iter().find(|candidate| self.contains(candidate))
    }
}

impl Ord for VersionRange {
    fn cmp(&self, other: &Self) -> Ordering {
        let recommended = match (&self.recommended, &other.recommended) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.cmp(b),
        };
        recommended.then_with(|| self.restrictions.cmp(&other.restrictions))
    }
}

impl PartialOrd for VersionRange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(recommended) = &self.recommended {
            return write!(f, "{recommended}");
        }
        let parts: Vec<String> = self.restrictions.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

impl From<Version> for VersionRange {
    fn from(version: Version) -> Self {
        Self {
            recommended: Some(version),
            restrictions: vec![Restriction::unbounded()],
        }
    }
}

impl std::str::FromStr for VersionRange {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
