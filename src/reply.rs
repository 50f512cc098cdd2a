//! Reply data model
//!
//! The protocol returns a handful of dynamically-shaped values: scalars,
//! nulls, flat lists, nested lists, and string-keyed maps. They are held
//! as a tagged variant so the formatter can be a single exhaustive match
//! instead of runtime type inspection.

/// One backend reply, structurally preserved.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Missing value
    Nil,

    /// Integer scalar
    Int(i64),

    /// String scalar (bulk and status replies both land here)
    Text(String),

    /// Ordered list; elements may themselves be lists, arbitrarily deep
    List(Vec<Reply>),

    /// String-keyed mapping with insertion order preserved
    Map(Vec<(String, Reply)>),
}

impl From<redis::Value> for Reply {
    fn from(value: redis::Value) -> Self {
        match value {
            redis::Value::Nil => Reply::Nil,
            redis::Value::Int(i) => Reply::Int(i),
            redis::Value::Data(bytes) => Reply::Text(String::from_utf8_lossy(&bytes).into_owned()),
            redis::Value::Bulk(items) => Reply::List(items.into_iter().map(Reply::from).collect()),
            redis::Value::Status(status) => Reply::Text(status),
            redis::Value::Okay => Reply::Text("OK".to_string()),
        }
    }
}
