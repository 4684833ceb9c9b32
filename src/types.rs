//! Core types shared by every layer.
//!
//! - [`Value`] - attribute / prop values with identity-or-value equality
//! - [`Key`] - explicit sibling identity
//! - [`NativeType`] - host primitive tags
//! - [`Props`] - ordered name → value mapping

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

// =============================================================================
// Value
// =============================================================================

/// A prop or attribute value.
///
/// Equality follows identity for shared payloads and value comparison for
/// wrapped primitives:
/// - scalars and strings compare by value
/// - floats compare bitwise (`NaN == NaN`, `0.0 != -0.0`)
/// - [`Value::Opaque`] compares by `Rc` pointer
#[derive(Clone, Default)]
pub enum Value {
    /// Absent / falsy.
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    /// Host-specific payload (callbacks, handles, ...).
    Opaque(Rc<dyn Any>),
}

impl Value {
    /// Wrap an arbitrary payload. Two opaque values are equal only if they
    /// share the same allocation.
    pub fn opaque<T: Any>(value: T) -> Self {
        Self::Opaque(Rc::new(value))
    }

    /// Identity-or-value equality.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b) || a == b,
            (Value::Opaque(a), Value::Opaque(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Opaque(p) => write!(f, "Opaque({:p})", Rc::as_ptr(p)),
        }
    }
}

/// Renders the value the way a text host shows it. `None` is empty.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Opaque(_) => f.write_str("[opaque]"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(Rc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(Rc::from(value))
    }
}

impl From<Rc<str>> for Value {
    fn from(value: Rc<str>) -> Self {
        Value::Str(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::None, Into::into)
    }
}

// =============================================================================
// Key
// =============================================================================

/// Explicit identity of a child within its sibling list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Str(Rc<str>),
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(value as i64)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Int(value as i64)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(Rc::from(value))
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(Rc::from(value))
    }
}

// =============================================================================
// NativeType
// =============================================================================

/// Host primitive tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NativeType {
    /// The host mount point owned by a [`Root`](crate::Root). Never created
    /// through an instruction.
    Container,
    /// Groups a child list without props of its own.
    Fragment,
    /// Literal leaf. Its single `value` attribute holds the literal.
    Plain,
    /// Host-defined tag (`"div"`, `"box"`, ...).
    Tag(Rc<str>),
}

impl NativeType {
    pub fn tag(name: &str) -> Self {
        NativeType::Tag(Rc::from(name))
    }

    pub fn is_plain(&self) -> bool {
        matches!(self, NativeType::Plain)
    }
}

impl From<&str> for NativeType {
    fn from(value: &str) -> Self {
        NativeType::tag(value)
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeType::Container => f.write_str("#container"),
            NativeType::Fragment => f.write_str("#fragment"),
            NativeType::Plain => f.write_str("#plain"),
            NativeType::Tag(name) => f.write_str(name),
        }
    }
}

// =============================================================================
// Props
// =============================================================================

/// Name of the single prop carried by [`NativeType::Plain`] seeds.
pub const PLAIN_VALUE: &str = "value";

/// Ordered name → value mapping.
///
/// Iteration order is insertion order, which is also the order attribute
/// instructions are emitted in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    entries: IndexMap<Rc<str>, Value>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a prop, keeping its original position.
    pub fn insert(&mut self, name: impl Into<Rc<str>>, value: impl Into<Value>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<Rc<str>>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Rc<str>, &Value)> {
        self.entries.iter()
    }

    /// Key-set equality plus per-key [`Value::same`]. Order is ignored.
    pub fn shallow_eq(&self, other: &Props) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(name, value)| other.entries.get(name).is_some_and(|v| v.same(value)))
    }
}

impl<N, V> FromIterator<(N, V)> for Props
where
    N: Into<Rc<str>>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut props = Props::new();
        for (name, value) in iter {
            props.insert(name, value);
        }
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_equality() {
        assert_eq!(Value::from(1), Value::Int(1));
        assert_eq!(Value::from("a"), Value::from(String::from("a")));
        assert_ne!(Value::from(1), Value::from(1.0));
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN), "NaN is itself");
        assert_ne!(Value::Float(0.0), Value::Float(-0.0), "signed zeros differ");
        assert_eq!(Value::from(None::<i32>), Value::None);
    }

    #[test]
    fn test_opaque_is_identity() {
        let a = Value::opaque(5u8);
        let b = a.clone();
        let c = Value::opaque(5u8);

        assert_eq!(a, b, "clones share the allocation");
        assert_ne!(a, c, "equal payloads in different allocations differ");
    }

    #[test]
    fn test_props_shallow_eq_ignores_order() {
        let a = Props::new().with("x", 1).with("y", "two");
        let b = Props::new().with("y", "two").with("x", 1);
        let c = Props::new().with("x", 1);
        let d = Props::new().with("x", 1).with("y", "three");

        assert!(a.shallow_eq(&b));
        assert!(!a.shallow_eq(&c), "key sets differ");
        assert!(!a.shallow_eq(&d), "values differ");
    }

    #[test]
    fn test_props_insert_keeps_position() {
        let mut props = Props::new().with("a", 1).with("b", 2);
        props.insert("a", 3);

        let names: Vec<&str> = props.iter().map(|(n, _)| &**n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(props.get("a"), Some(&Value::Int(3)));
    }
}
