//! Filter algebra understood by every store backend.
//!
//! Filters name record fields by string, compare them against [`Value`]s and
//! compose with AND/OR. A field the record does not carry (a null driver id,
//! for instance) never satisfies a comparison, including `Ne` and `NotIn`.

use chrono::NaiveDateTime;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Id(u64),
    Bool(bool),
    Text(String),
    Time(NaiveDateTime),
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Id(a), Value::Id(b)) => a.partial_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.partial_cmp(b),
            (Value::Time(a), Value::Time(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Id(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Time(v)
    }
}

/// A record a repository can hold and filter.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> u64;

    /// Field lookup by name. `None` stands for null or unknown.
    fn field(&self, name: &str) -> Option<Value>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(&'static str, Value),
    Ne(&'static str, Value),
    Lt(&'static str, Value),
    Le(&'static str, Value),
    Gt(&'static str, Value),
    Ge(&'static str, Value),
    In(&'static str, Vec<Value>),
    NotIn(&'static str, Vec<Value>),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Filter::Eq(field, value.into())
    }

    pub fn le(field: &'static str, value: impl Into<Value>) -> Self {
        Filter::Le(field, value.into())
    }

    pub fn ge(field: &'static str, value: impl Into<Value>) -> Self {
        Filter::Ge(field, value.into())
    }

    pub fn is_in<I, V>(field: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::In(field, values.into_iter().map(Into::into).collect())
    }

    pub fn not_in<I, V>(field: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::NotIn(field, values.into_iter().map(Into::into).collect())
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        match self {
            Filter::Eq(f, v) => record.field(f).is_some_and(|x| x == *v),
            Filter::Ne(f, v) => record.field(f).is_some_and(|x| x != *v),
            Filter::Lt(f, v) => Self::compare(record, f, v, |o| o == Ordering::Less),
            Filter::Le(f, v) => Self::compare(record, f, v, |o| o != Ordering::Greater),
            Filter::Gt(f, v) => Self::compare(record, f, v, |o| o == Ordering::Greater),
            Filter::Ge(f, v) => Self::compare(record, f, v, |o| o != Ordering::Less),
            Filter::In(f, vs) => record.field(f).is_some_and(|x| vs.contains(&x)),
            Filter::NotIn(f, vs) => record.field(f).is_some_and(|x| !vs.contains(&x)),
            Filter::And(fs) => fs.iter().all(|f| f.matches(record)),
            Filter::Or(fs) => fs.iter().any(|f| f.matches(record)),
        }
    }

    fn compare<R: Record>(
        record: &R,
        field: &str,
        value: &Value,
        accept: impl Fn(Ordering) -> bool,
    ) -> bool {
        record
            .field(field)
            .and_then(|x| x.partial_cmp(value))
            .is_some_and(accept)
    }
}
