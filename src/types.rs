//! Basic types shared by the scene objects

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// RGBA color with components in [0, 1]
pub type Rgba = [f32; 4];

/// Identity of a drawable as seen by the rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

impl ObjectId {
    pub(crate) fn next() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One element of a loosely typed tuple, e.g. an RGBA color coming from a
/// configuration file or a scripting layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
    Null,
}

impl Component {
    /// Numeric value of the element, `None` when it is not a number.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Component::Float(v) => Some(*v as f32),
            Component::Int(v) => Some(*v as f32),
            Component::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Component::Text(_) | Component::Null => None,
        }
    }
}

impl From<f32> for Component {
    fn from(value: f32) -> Self {
        Component::Float(value as f64)
    }
}

impl From<f64> for Component {
    fn from(value: f64) -> Self {
        Component::Float(value)
    }
}

impl From<i32> for Component {
    fn from(value: i32) -> Self {
        Component::Int(value as i64)
    }
}

impl From<i64> for Component {
    fn from(value: i64) -> Self {
        Component::Int(value)
    }
}

impl From<bool> for Component {
    fn from(value: bool) -> Self {
        Component::Bool(value)
    }
}

impl From<&str> for Component {
    fn from(value: &str) -> Self {
        Component::Text(value.to_string())
    }
}

impl From<String> for Component {
    fn from(value: String) -> Self {
        Component::Text(value)
    }
}

impl<T: Into<Component>> From<Option<T>> for Component {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Component::Null)
    }
}
