//! Validated values: the four shapes the store can hold.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::data::Data;
use crate::error::Error;

const LIST_ELEMENTS: &str = "lists can only contain values of type str or int";
const SET_ELEMENTS: &str = "sets can only contain values of type str or int";
const DICT_VALUES: &str = "dict values need to be of type str or int";
const DICT_KEYS: &str = "dict keys need to be of type str";
const ANY_VALUE: &str = "value needs to be of type str, int, a list containing str or int, \
                         a set containing str or int or a dict containing str or int";

/// Text or integer: the only element type the store accepts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scalar {
    Text(String),
    Int(i64),
}

impl Scalar {
    /// Integer view: the integer itself, or text that parses as one.
    ///
    /// Values read back from the store are always text, so this is how a
    /// caller recovers an integer it wrote.
    ///
    /// # Examples
    ///
    /// ```
    /// use redmap::Scalar;
    ///
    /// assert_eq!(Scalar::Text("42".into()).as_int(), Some(42));
    /// assert_eq!(Scalar::Int(-1).as_int(), Some(-1));
    /// assert_eq!(Scalar::Text("forty".into()).as_int(), None);
    /// ```
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Text(text) => text.parse().ok(),
            Scalar::Int(n) => Some(*n),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(text) => Some(text),
            Scalar::Int(_) => None,
        }
    }

    fn from_data(data: Data) -> Option<Self> {
        match data {
            Data::Text(text) => Some(Scalar::Text(text)),
            Data::Int(n) => Some(Scalar::Int(n)),
            _ => None,
        }
    }
}

/// Renders the text the store holds for this scalar.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(text) => f.write_str(text),
            Scalar::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(text: &str) -> Self {
        Scalar::Text(text.to_string())
    }
}

impl From<String> for Scalar {
    fn from(text: String) -> Self {
        Scalar::Text(text)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

/// A value in one of the shapes the store supports per key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Stored as a string.
    Scalar(Scalar),
    /// Stored as a list; order is kept.
    Sequence(Vec<Scalar>),
    /// Stored as a set; order is not kept.
    Collection(BTreeSet<Scalar>),
    /// Stored as a hash.
    Record(BTreeMap<String, Scalar>),
}

impl Value {
    /// Store type tag this value is written as.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "string",
            Value::Sequence(_) => "list",
            Value::Collection(_) => "set",
            Value::Record(_) => "hash",
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Value::Scalar(scalar)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Scalar(text.into())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Scalar(text.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Scalar(n.into())
    }
}

/// Classify unvalidated input.
///
/// Containers are checked element by element and rejected with a message
/// naming their own constraint. For maps, values are checked before keys.
impl TryFrom<Data> for Value {
    type Error = Error;

    fn try_from(data: Data) -> Result<Self, Self::Error> {
        match data {
            Data::Text(text) => Ok(Value::Scalar(Scalar::Text(text))),
            Data::Int(n) => Ok(Value::Scalar(Scalar::Int(n))),
            Data::List(items) => items
                .into_iter()
                .map(Scalar::from_data)
                .collect::<Option<Vec<_>>>()
                .map(Value::Sequence)
                .ok_or_else(|| Error::invalid(LIST_ELEMENTS)),
            Data::Set(items) => items
                .into_iter()
                .map(Scalar::from_data)
                .collect::<Option<BTreeSet<_>>>()
                .map(Value::Collection)
                .ok_or_else(|| Error::invalid(SET_ELEMENTS)),
            Data::Map(pairs) => record(pairs),
            Data::Float(_) | Data::Bool(_) | Data::Null => Err(Error::invalid(ANY_VALUE)),
        }
    }
}

fn record(pairs: Vec<(Data, Data)>) -> Result<Value, Error> {
    if !pairs
        .iter()
        .all(|(_, value)| matches!(value, Data::Text(_) | Data::Int(_)))
    {
        return Err(Error::invalid(DICT_VALUES));
    }

    let mut fields = BTreeMap::new();
    for (field, value) in pairs {
        let Data::Text(field) = field else {
            return Err(Error::invalid(DICT_KEYS));
        };
        let value = Scalar::from_data(value).ok_or_else(|| Error::invalid(DICT_VALUES))?;
        fields.insert(field, value);
    }
    Ok(Value::Record(fields))
}
