use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Identifier of a module inside a bundle.
///
/// Bundlers key their module tables either by array index or by object key. Object keys that
/// spell a canonical non-negative integer (`"12"`, not `"012"`) are normalised to
/// [`ModuleId::Index`] so that `require(12)` and a table key of `"12"` name the same module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleId {
    /// Numeric id (array index or integer key).
    Index(u64),
    /// Named id, e.g. `"./src/app.js"` for bundles built with named module ids.
    Name(String),
}

/// Chunk ids share the literal shapes of module ids (`require.e(3)`, `require.e("vendor")`).
pub type ChunkId = ModuleId;

impl ModuleId {
    /// Build an id from an object key or string literal.
    pub fn from_key(key: &str) -> Self {
        match key.parse::<u64>() {
            Ok(index) if index.to_string() == key => Self::Index(index),
            _ => Self::Name(key.to_string()),
        }
    }

    /// Build an id from a numeric literal value.
    pub fn from_number(value: f64) -> Result<Self, ModuleIdError> {
        if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
            Ok(Self::Index(value as u64))
        } else {
            Err(ModuleIdError::NotAnIndex(value))
        }
    }

    pub fn as_index(&self) -> Option<u64> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Name(_) => None,
        }
    }

    /// Path implied by a named id such as `./src/app.js`, without the `.js` extension.
    ///
    /// Only relative names qualify; other names (hashes, package names) return `None`.
    pub fn implied_path(&self) -> Option<&str> {
        match self {
            Self::Name(name) if name.starts_with("./") || name.starts_with("../") => {
                Some(name.strip_suffix(".js").unwrap_or(name))
            }
            _ => None,
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<u64> for ModuleId {
    fn from(value: u64) -> Self {
        Self::Index(value)
    }
}

impl From<&str> for ModuleId {
    fn from(value: &str) -> Self {
        Self::from_key(value)
    }
}

impl FromStr for ModuleId {
    type Err = ModuleIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ModuleIdError::Empty);
        }
        Ok(Self::from_key(s))
    }
}

impl Serialize for ModuleId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Index(index) => serializer.serialize_u64(*index),
            Self::Name(name) => serializer.serialize_str(name),
        }
    }
}

impl<'de> Deserialize<'de> for ModuleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ModuleIdVisitor;

        impl Visitor<'_> for ModuleIdVisitor {
            type Value = ModuleId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or a string module id")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ModuleId, E> {
                Ok(ModuleId::Index(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ModuleId, E> {
                u64::try_from(v)
                    .map(ModuleId::Index)
                    .map_err(|_| E::custom(ModuleIdError::NotAnIndex(v as f64)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<ModuleId, E> {
                ModuleId::from_number(v).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ModuleId, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(ModuleIdVisitor)
    }
}

/// Error type for `ModuleId` construction failures.
#[derive(Debug, Error, PartialEq)]
pub enum ModuleIdError {
    /// The provided key was empty.
    #[error("module id is empty")]
    Empty,

    /// A numeric literal that cannot index a module table.
    #[error("{0} is not a valid module index")]
    NotAnIndex(f64),
}
