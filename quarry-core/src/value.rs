use crate::{Error, Result};
use std::fmt::{self, Display};

/// A typed SQL scalar.
///
/// Each variant carries an `Option` so a value knows its column kind even
/// when it is NULL; `Value::Null` is the untyped null used by cursors for
/// columns the metadata does not describe.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Text(Option<String>),
    Blob(Option<Box<[u8]>>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::Null
                | Value::Boolean(None)
                | Value::Int16(None)
                | Value::Int32(None)
                | Value::Int64(None)
                | Value::Float32(None)
                | Value::Float64(None)
                | Value::Text(None)
                | Value::Blob(None)
        )
    }

    /// True for NULL and for integer zero. Used to decide whether an
    /// autoincrement key has been assigned yet.
    pub fn is_unset(&self) -> bool {
        match self {
            Value::Int16(Some(v)) => *v == 0,
            Value::Int32(Some(v)) => *v == 0,
            Value::Int64(Some(v)) => *v == 0,
            _ => self.is_null(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Boolean(Some(v)) => Some(*v as i64),
            Value::Int16(Some(v)) => Some(*v as i64),
            Value::Int32(Some(v)) => Some(*v as i64),
            Value::Int64(Some(v)) => Some(*v),
            _ => None,
        }
    }

    /// Render the value as a SQL literal, appending to `out`.
    ///
    /// Booleans print as the integers 1/0, text is single-quoted with
    /// embedded quotes doubled. Blobs have no literal form and are refused;
    /// binding them stays the backend's job.
    pub fn write_literal(&self, out: &mut String) -> Result<()> {
        match self {
            v if v.is_null() => out.push_str("NULL"),
            Value::Boolean(Some(v)) => out.push_str(["0", "1"][*v as usize]),
            Value::Int16(Some(v)) => write_integer(out, *v),
            Value::Int32(Some(v)) => write_integer(out, *v),
            Value::Int64(Some(v)) => write_integer(out, *v),
            Value::Float32(Some(v)) => write_float(out, *v as f64),
            Value::Float64(Some(v)) => write_float(out, *v),
            Value::Text(Some(v)) => write_quoted(out, v),
            Value::Blob(Some(..)) => {
                return Err(Error::UnsupportedArgument(
                    "blob values have no SQL literal form".into(),
                ));
            }
            _ => unreachable!(),
        }
        Ok(())
    }
}

fn write_integer(out: &mut String, value: impl itoa::Integer) {
    let mut buffer = itoa::Buffer::new();
    out.push_str(buffer.format(value));
}

fn write_float(out: &mut String, value: f64) {
    let mut buffer = ryu::Buffer::new();
    out.push_str(buffer.format(value));
}

pub(crate) fn write_quoted(out: &mut String, value: &str) {
    out.push('\'');
    let mut position = 0;
    for (i, c) in value.char_indices() {
        if c == '\'' {
            out.push_str(&value[position..i]);
            out.push_str("''");
            position = i + 1;
        }
    }
    out.push_str(&value[position..]);
    out.push('\'');
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            v if v.is_null() => f.write_str("NULL"),
            Value::Boolean(Some(v)) => f.write_str(["0", "1"][*v as usize]),
            Value::Int16(Some(v)) => write!(f, "{}", v),
            Value::Int32(Some(v)) => write!(f, "{}", v),
            Value::Int64(Some(v)) => write!(f, "{}", v),
            Value::Float32(Some(v)) => write!(f, "{}", v),
            Value::Float64(Some(v)) => write!(f, "{}", v),
            Value::Text(Some(v)) => f.write_str(v),
            Value::Blob(Some(v)) => write!(f, "<blob {} bytes>", v.len()),
            _ => unreachable!(),
        }
    }
}

/// Conversion of native scalars into [`Value`]; the set of implementors is
/// exactly the set of argument types a query call accepts.
pub trait AsValue {
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
}

macro_rules! impl_as_value {
    ($source:ty, $into:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $into(None)
            }
            fn as_value(self) -> Value {
                $into(Some(self))
            }
        }
    };
}

impl_as_value!(bool, Value::Boolean);
impl_as_value!(i16, Value::Int16);
impl_as_value!(i32, Value::Int32);
impl_as_value!(i64, Value::Int64);
impl_as_value!(f32, Value::Float32);
impl_as_value!(f64, Value::Float64);
impl_as_value!(String, Value::Text);
impl_as_value!(Box<[u8]>, Value::Blob);

impl AsValue for &str {
    fn as_empty_value() -> Value {
        Value::Text(None)
    }
    fn as_value(self) -> Value {
        Value::Text(Some(self.to_owned()))
    }
}

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into_boxed_slice()))
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

/// Decoding of a [`Value`] back into a native scalar.
///
/// SQL NULL decodes to `None` for `Option` targets and to the zero value for
/// plain targets, regardless of the column's declared nullability.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

fn mismatch<T>(expected: &str, got: &Value) -> Result<T> {
    Err(Error::storage(format!(
        "cannot decode {:?} as {}",
        got, expected
    )))
}

macro_rules! impl_from_int {
    ($target:ty) => {
        impl FromValue for $target {
            fn from_value(value: &Value) -> Result<Self> {
                if value.is_null() {
                    return Ok(0);
                }
                match value.as_i64() {
                    Some(v) => Ok(v as $target),
                    None => mismatch(stringify!($target), value),
                }
            }
        }
    };
}

impl_from_int!(i16);
impl_from_int!(i32);
impl_from_int!(i64);

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        if value.is_null() {
            return Ok(false);
        }
        match value {
            Value::Boolean(Some(v)) => Ok(*v),
            other => match other.as_i64() {
                Some(v) => Ok(v == 1),
                None => mismatch("bool", other),
            },
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            v if v.is_null() => Ok(0.0),
            Value::Float32(Some(v)) => Ok(*v as f64),
            Value::Float64(Some(v)) => Ok(*v),
            other => match other.as_i64() {
                Some(v) => Ok(v as f64),
                None => mismatch("f64", other),
            },
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            v if v.is_null() => Ok(String::new()),
            Value::Text(Some(v)) => Ok(v.clone()),
            other => mismatch("String", other),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            v if v.is_null() => Ok(Vec::new()),
            Value::Blob(Some(v)) => Ok(v.to_vec()),
            other => mismatch("Vec<u8>", other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_rendering() {
        let mut out = String::new();
        Value::from(42i32).write_literal(&mut out).unwrap();
        out.push(' ');
        Value::from(true).write_literal(&mut out).unwrap();
        out.push(' ');
        Value::from(false).write_literal(&mut out).unwrap();
        out.push(' ');
        Value::from("it's").write_literal(&mut out).unwrap();
        out.push(' ');
        Value::Text(None).write_literal(&mut out).unwrap();
        assert_eq!(out, "42 1 0 'it''s' NULL");
    }

    #[test]
    fn blob_has_no_literal() {
        let mut out = String::new();
        let result = Value::from(vec![1u8, 2, 3]).write_literal(&mut out);
        assert!(matches!(result, Err(Error::UnsupportedArgument(..))));
    }

    #[test]
    fn unset_detection() {
        assert!(Value::Int32(Some(0)).is_unset());
        assert!(Value::Int64(None).is_unset());
        assert!(!Value::Int32(Some(7)).is_unset());
        assert!(!Value::Text(Some("0".into())).is_unset());
    }

    #[test]
    fn null_decodes_to_zero_or_none() {
        assert_eq!(i32::from_value(&Value::Int32(None)).unwrap(), 0);
        assert_eq!(
            Option::<String>::from_value(&Value::Text(None)).unwrap(),
            None
        );
        assert_eq!(bool::from_value(&Value::Int64(Some(1))).unwrap(), true);
    }
}
