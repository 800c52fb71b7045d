//! Typed property values.
//!
//! A property's type is fixed by the default value it is declared with.
//! Every later assignment must carry the same variant.

use crate::geometry::Point3;
use std::fmt;

/// The four property types an ig collection can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    Int,
    Double,
    String,
    V3d,
}

impl PropertyType {
    /// Name used in the ig "Types" table
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Int => "int",
            PropertyType::Double => "double",
            PropertyType::String => "string",
            PropertyType::V3d => "v3d",
        }
    }

    /// Zero value of this type
    pub fn default_value(&self) -> Value {
        match self {
            PropertyType::Int => Value::Int(0),
            PropertyType::Double => Value::Double(0.0),
            PropertyType::String => Value::String(String::new()),
            PropertyType::V3d => Value::V3d([0.0; 3]),
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(PropertyType::Int),
            "double" => Ok(PropertyType::Double),
            "string" => Ok(PropertyType::String),
            "v3d" => Ok(PropertyType::V3d),
            other => Err(format!("unknown property type '{}'", other)),
        }
    }
}

/// A single field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Double(f64),
    String(String),
    V3d([f64; 3]),
}

impl Value {
    pub fn property_type(&self) -> PropertyType {
        match self {
            Value::Int(_) => PropertyType::Int,
            Value::Double(_) => PropertyType::Double,
            Value::String(_) => PropertyType::String,
            Value::V3d(_) => PropertyType::V3d,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_v3d(&self) -> Option<[f64; 3]> {
        match self {
            Value::V3d(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<[f64; 3]> for Value {
    fn from(v: [f64; 3]) -> Self {
        Value::V3d(v)
    }
}

impl From<Point3> for Value {
    fn from(p: Point3) -> Self {
        Value::V3d(p.to_array())
    }
}
