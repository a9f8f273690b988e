use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// A single cell of a benchmark table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Missing,
}

/// Numeric view used for ordering and hashing, integral floats collapse onto integers.
#[derive(Debug, Clone, Copy)]
enum Numeric {
    Integral(i64),
    Real(f64),
}

impl Numeric {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Numeric::Integral(a), Numeric::Integral(b)) => a.cmp(b),
            (Numeric::Real(a), Numeric::Real(b)) => a.total_cmp(b),
            (Numeric::Integral(a), Numeric::Real(b)) => {
                (*a as f64).total_cmp(b).then(Ordering::Less)
            }
            (Numeric::Real(a), Numeric::Integral(b)) => {
                a.total_cmp(&(*b as f64)).then(Ordering::Greater)
            }
        }
    }
}

fn integral(f: f64) -> Option<i64> {
    // 2^63 is exactly representable, anything at or above it is out of range.
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl Value {
    /// Parses a raw CSV field.
    pub fn parse(field: &str) -> Self {
        let field = field.trim();
        if field.is_empty() {
            return Value::Missing;
        }
        if let Ok(i) = field.parse::<i64>() {
            return Value::Integer(i);
        }
        match field.parse::<f64>() {
            Ok(f) if f.is_nan() => Value::Missing,
            Ok(f) => Value::Float(f),
            Err(_) => Value::Text(field.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) | Value::Missing => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    fn numeric(&self) -> Option<Numeric> {
        match self {
            Value::Integer(i) => Some(Numeric::Integral(*i)),
            Value::Float(f) => Some(match integral(*f) {
                Some(i) => Numeric::Integral(i),
                None => Numeric::Real(*f),
            }),
            Value::Text(_) | Value::Missing => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Integer(_) | Value::Float(_) => 0,
            Value::Text(_) => 1,
            Value::Missing => 2,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Missing, Value::Missing) => Ordering::Equal,
            _ => match (self.numeric(), other.numeric()) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => self.rank().cmp(&other.rank()),
            },
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Missing => {}
            Value::Integer(_) | Value::Float(_) => match self.numeric() {
                Some(Numeric::Integral(i)) => {
                    0u8.hash(state);
                    i.hash(state)
                }
                Some(Numeric::Real(f)) => {
                    1u8.hash(state);
                    f.to_bits().hash(state)
                }
                None => {}
            },
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) if x.is_nan() => write!(f, "nan"),
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{:.1}", x)
            }
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Missing => write!(f, "nan"),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<u64> for Value {
    fn from(i: u64) -> Self {
        match i64::try_from(i) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Float(i as f64),
        }
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        if f.is_nan() {
            Value::Missing
        } else {
            Value::Float(f)
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
