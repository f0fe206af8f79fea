//! Lazily evaluated prim data sources.
//!
//! A prim's data is a tree of named fields: containers hold named children,
//! vectors hold ordered children and sampled leaves produce a [`Value`].
//! Filtering stages never copy prim storage. They wrap the input's
//! containers and compute overrides when a field is read.

use std::fmt;
use std::sync::Arc;

use super::locator::DataSourceLocator;
use crate::util::{DVec3, ScenePath, Token, Vec3, Vec4};

/// Typed leaf value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Float(f32),
    Double(f64),
    Token(Token),
    String(String),
    Path(ScenePath),
    TokenArray(Vec<Token>),
    IntArray(Vec<i32>),
    BoolArray(Vec<bool>),
    PathArray(Vec<ScenePath>),
    Vec3d(DVec3),
    Vec3fArray(Vec<Vec3>),
    Vec4f(Vec4),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Value::Token(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&ScenePath> {
        match self {
            Value::Path(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_token_array(&self) -> Option<&[Token]> {
        match self {
            Value::TokenArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i32]> {
        match self {
            Value::IntArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool_array(&self) -> Option<&[bool]> {
        match self {
            Value::BoolArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_path_array(&self) -> Option<&[ScenePath]> {
        match self {
            Value::PathArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec3d(&self) -> Option<DVec3> {
        match self {
            Value::Vec3d(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3f_array(&self) -> Option<&[Vec3]> {
        match self {
            Value::Vec3fArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec4f(&self) -> Option<Vec4> {
        match self {
            Value::Vec4f(v) => Some(*v),
            _ => None,
        }
    }
}

macro_rules! impl_value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$variant(v)
            }
        })*
    };
}

impl_value_from! {
    bool => Bool,
    i32 => Int,
    f32 => Float,
    f64 => Double,
    Token => Token,
    String => String,
    ScenePath => Path,
    Vec<Token> => TokenArray,
    Vec<i32> => IntArray,
    Vec<bool> => BoolArray,
    Vec<ScenePath> => PathArray,
    DVec3 => Vec3d,
    Vec<Vec3> => Vec3fArray,
    Vec4 => Vec4f,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Token(Token::from(v))
    }
}

/// Leaf data source producing a time-dependent value.
pub trait SampledDataSource: Send + Sync {
    /// Value at `shutter_offset` relative to the current frame.
    fn value(&self, shutter_offset: f32) -> Value;
}

/// Data source with named children.
pub trait ContainerDataSource: Send + Sync {
    /// Names of the children. Order is not significant.
    fn names(&self) -> Vec<Token>;

    /// Child named `name`, if any.
    fn get(&self, name: &str) -> Option<DataSource>;
}

/// Shared container handle.
pub type ContainerHandle = Arc<dyn ContainerDataSource>;

/// Sampled leaf holding a constant value.
#[derive(Clone, Debug)]
pub struct RetainedSampled(pub Value);

impl SampledDataSource for RetainedSampled {
    fn value(&self, _shutter_offset: f32) -> Value {
        self.0.clone()
    }
}

/// Any node of a prim's data source tree.
#[derive(Clone)]
pub enum DataSource {
    Container(ContainerHandle),
    Vector(Arc<[DataSource]>),
    Sampled(Arc<dyn SampledDataSource>),
}

impl DataSource {
    /// Constant sampled leaf.
    pub fn value(v: impl Into<Value>) -> Self {
        DataSource::Sampled(Arc::new(RetainedSampled(v.into())))
    }

    /// Wrap a container implementation.
    pub fn container(c: impl ContainerDataSource + 'static) -> Self {
        DataSource::Container(Arc::new(c))
    }

    /// Vector of child data sources.
    pub fn vector(items: Vec<DataSource>) -> Self {
        DataSource::Vector(items.into())
    }

    pub fn as_container(&self) -> Option<&ContainerHandle> {
        match self {
            DataSource::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[DataSource]> {
        match self {
            DataSource::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Value of a sampled leaf at the current frame.
    pub fn sampled_value(&self) -> Option<Value> {
        match self {
            DataSource::Sampled(s) => Some(s.value(0.0)),
            _ => None,
        }
    }
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Container(c) => f.debug_tuple("Container").field(&c.names()).finish(),
            DataSource::Vector(v) => f.debug_tuple("Vector").field(&v.len()).finish(),
            DataSource::Sampled(s) => f.debug_tuple("Sampled").field(&s.value(0.0)).finish(),
        }
    }
}

/// Resolve `locator` inside `container`.
///
/// The empty locator resolves to the container itself.
pub fn get_at(container: &ContainerHandle, locator: &DataSourceLocator) -> Option<DataSource> {
    let mut current = DataSource::Container(container.clone());
    for name in locator.elements() {
        let next = current.as_container()?.get(name)?;
        current = next;
    }
    Some(current)
}

/// Resolve `locator` to a sampled value.
pub fn value_at(container: &ContainerHandle, locator: &DataSourceLocator) -> Option<Value> {
    get_at(container, locator)?.sampled_value()
}

/// Same as [`value_at`] for an optional container.
pub fn prim_value(container: Option<&ContainerHandle>, locator: &DataSourceLocator) -> Option<Value> {
    value_at(container?, locator)
}

/// Render a data source tree as indented text.
pub fn dump(ds: &DataSource, indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    match ds {
        DataSource::Container(c) => {
            let mut names = c.names();
            names.sort();
            for name in names {
                match c.get(&name) {
                    Some(DataSource::Sampled(s)) => {
                        out.push_str(&format!("{pad}{name} = {:?}\n", s.value(0.0)));
                    }
                    Some(child) => {
                        out.push_str(&format!("{pad}{name}\n"));
                        dump(&child, indent + 1, out);
                    }
                    None => {}
                }
            }
        }
        DataSource::Vector(v) => {
            for (i, child) in v.iter().enumerate() {
                out.push_str(&format!("{pad}[{i}]\n"));
                dump(child, indent + 1, out);
            }
        }
        DataSource::Sampled(s) => out.push_str(&format!("{pad}{:?}\n", s.value(0.0))),
    }
}
