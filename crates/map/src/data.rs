//! Unvalidated input accepted at the mapping boundary.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::value::{Scalar, Value};

/// A dynamically shaped key or value, before validation.
///
/// `Data` can represent shapes the store cannot hold (floats, nested
/// containers, non-text keys). Those are rejected when the mapping
/// classifies the input, never silently coerced.
///
/// # Examples
///
/// ```
/// use redmap::Data;
///
/// assert_eq!(Data::from("name"), Data::Text("name".to_string()));
/// assert_eq!(Data::from(vec![1, 2]), Data::List(vec![Data::Int(1), Data::Int(2)]));
/// assert_eq!(Data::from(None::<i64>), Data::Null);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    /// Ordered sequence.
    List(Vec<Data>),
    /// Unordered collection; duplicates collapse once validated.
    Set(Vec<Data>),
    /// Key/value pairs; a repeated key keeps its last value once validated.
    Map(Vec<(Data, Data)>),
}

impl Data {
    /// Build a `Data::Set` from anything iterable.
    pub fn set<T: Into<Data>>(items: impl IntoIterator<Item = T>) -> Self {
        Data::Set(items.into_iter().map(Into::into).collect())
    }

    /// Build a `Data::Map` from anything iterable.
    pub fn map<K: Into<Data>, V: Into<Data>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Data::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Short name of the shape, used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Data::Text(_) => "text",
            Data::Int(_) => "int",
            Data::Float(_) => "float",
            Data::Bool(_) => "bool",
            Data::Null => "null",
            Data::List(_) => "list",
            Data::Set(_) => "set",
            Data::Map(_) => "map",
        }
    }
}

impl From<&str> for Data {
    fn from(value: &str) -> Self {
        Data::Text(value.to_string())
    }
}

impl From<String> for Data {
    fn from(value: String) -> Self {
        Data::Text(value)
    }
}

impl From<&String> for Data {
    fn from(value: &String) -> Self {
        Data::Text(value.clone())
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Data {
                fn from(value: $t) -> Self {
                    Data::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Data {
    fn from(value: f32) -> Self {
        Data::Float(f64::from(value))
    }
}

impl From<f64> for Data {
    fn from(value: f64) -> Self {
        Data::Float(value)
    }
}

impl From<bool> for Data {
    fn from(value: bool) -> Self {
        Data::Bool(value)
    }
}

impl<T: Into<Data>> From<Option<T>> for Data {
    fn from(value: Option<T>) -> Self {
        value.map_or(Data::Null, Into::into)
    }
}

impl<T: Into<Data>> From<Vec<T>> for Data {
    fn from(items: Vec<T>) -> Self {
        Data::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Data>, const N: usize> From<[T; N]> for Data {
    fn from(items: [T; N]) -> Self {
        Data::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Data>> From<BTreeSet<T>> for Data {
    fn from(items: BTreeSet<T>) -> Self {
        Data::set(items)
    }
}

impl<T: Into<Data>, S> From<HashSet<T, S>> for Data {
    fn from(items: HashSet<T, S>) -> Self {
        Data::set(items)
    }
}

impl<K: Into<Data>, V: Into<Data>> From<BTreeMap<K, V>> for Data {
    fn from(pairs: BTreeMap<K, V>) -> Self {
        Data::map(pairs)
    }
}

impl<K: Into<Data>, V: Into<Data>, S> From<HashMap<K, V, S>> for Data {
    fn from(pairs: HashMap<K, V, S>) -> Self {
        Data::map(pairs)
    }
}

impl From<Scalar> for Data {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Text(text) => Data::Text(text),
            Scalar::Int(n) => Data::Int(n),
        }
    }
}

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        match value {
            Value::Scalar(scalar) => scalar.into(),
            Value::Sequence(items) => items.into(),
            Value::Collection(members) => members.into(),
            Value::Record(fields) => fields.into(),
        }
    }
}
