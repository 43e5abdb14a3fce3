//! Limit and offset arguments.
//!
//! The query engine hands pagination values over in whatever shape it got
//! them: integers, floats, strings, or nothing at all. They are parsed into a
//! [`RowBound`] exactly once, at the edge. Anything that does not read as an
//! integer becomes [`RowBound::Absent`], which every dialect simply omits.

/// A parsed limit or offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RowBound {
    /// Not given, or not an integer.
    #[default]
    Absent,
    /// An integer value. May be negative; dialects decide what that means.
    Value(i64),
}

impl RowBound {
    /// Parses an integer literal.
    ///
    /// Accepts an optional sign, `0x`/`0o`/`0b` prefixes, a leading `0` for
    /// octal, and `_` between digits. Anything else is `Absent`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        parse_int_literal(raw).map_or(Self::Absent, Self::Value)
    }

    /// Returns the value when it is present and non-negative.
    #[must_use]
    pub fn non_negative(self) -> Option<i64> {
        match self {
            Self::Value(n) if n >= 0 => Some(n),
            _ => None,
        }
    }

    /// Returns the value when it is present and strictly positive.
    #[must_use]
    pub fn positive(self) -> Option<i64> {
        match self {
            Self::Value(n) if n > 0 => Some(n),
            _ => None,
        }
    }

    /// Returns true when no value was given.
    #[must_use]
    pub fn is_absent(self) -> bool {
        matches!(self, Self::Absent)
    }
}

fn parse_int_literal(raw: &str) -> Option<i64> {
    let (negative, unsigned) = match raw.as_bytes().first()? {
        b'-' => (true, &raw[1..]),
        b'+' => (false, &raw[1..]),
        _ => (false, raw),
    };

    let lower = unsigned.to_ascii_lowercase();
    let (radix, digits, prefixed) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest, true)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest, true)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest, true)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..], true)
    } else {
        (10, lower.as_str(), false)
    };

    if !underscores_ok(digits, prefixed) {
        return None;
    }
    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = u64::from_str_radix(&cleaned, radix).ok()?;
    if negative {
        0i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    }
}

/// Underscores must sit between digits, or directly after a base prefix.
fn underscores_ok(digits: &str, prefixed: bool) -> bool {
    let mut previous_digit = prefixed;
    let mut chars = digits.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_' {
            let next_is_digit = chars.peek().is_some_and(|n| *n != '_');
            if !previous_digit || !next_is_digit {
                return false;
            }
            previous_digit = false;
        } else {
            previous_digit = true;
        }
    }
    true
}

impl From<&str> for RowBound {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for RowBound {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&String> for RowBound {
    fn from(raw: &String) -> Self {
        Self::parse(raw)
    }
}

impl From<f64> for RowBound {
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn from(value: f64) -> Self {
        if value.is_finite()
            && value.fract() == 0.0
            && value >= i64::MIN as f64
            && value < i64::MAX as f64
        {
            Self::Value(value as i64)
        } else {
            Self::Absent
        }
    }
}

impl From<f32> for RowBound {
    fn from(value: f32) -> Self {
        Self::from(f64::from(value))
    }
}

impl<T: Into<Self>> From<Option<T>> for RowBound {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

macro_rules! row_bound_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for RowBound {
                fn from(value: $ty) -> Self {
                    i64::try_from(value).map_or(Self::Absent, Self::Value)
                }
            }
        )*
    };
}

row_bound_from_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
