use crate::error::StoreError;
use crate::store::unit_data_file;
use serde::Serialize;
use serde::de::DeserializeOwned;
use srcfab_types::authorship::AuthorshipOutput;
use srcfab_types::blame::BlameOutput;
use srcfab_types::data_type;
use srcfab_types::depresolve::ResolvedDep;
use srcfab_types::graph::GraphOutput;
use srcfab_types::SourceUnit;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A decoded artifact whose concrete type is known only through its tag.
pub trait DataObject: Any + fmt::Debug + Send + Sync {
    fn to_json(&self) -> serde_json::Result<serde_json::Value>;
    fn as_any(&self) -> &dyn Any;
}

impl<T> DataObject for T
where
    T: Serialize + fmt::Debug + Send + Sync + 'static,
{
    fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

type Decoder = fn(&[u8]) -> serde_json::Result<Box<dyn DataObject>>;

fn decode_boxed<T>(bytes: &[u8]) -> serde_json::Result<Box<dyn DataObject>>
where
    T: DeserializeOwned + Serialize + fmt::Debug + Send + Sync + 'static,
{
    Ok(Box::new(serde_json::from_slice::<T>(bytes)?))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("data type name must not be empty")]
    EmptyName,

    #[error("data type {name:?} is already registered")]
    DuplicateName { name: String },

    #[error("type {type_name} is already registered as {existing:?}")]
    DuplicateType {
        type_name: &'static str,
        existing: String,
    },
}

struct Entry {
    type_name: &'static str,
    decode: Decoder,
}

/// Maps data type names to artifact shapes and back.
///
/// Registration happens once at startup; afterwards the registry is shared
/// read-only.
#[derive(Default)]
pub struct DataTypeRegistry {
    by_name: BTreeMap<String, Entry>,
    by_type: HashMap<TypeId, String>,
}

impl fmt::Debug for DataTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.by_name.iter().map(|(k, e)| (k, e.type_name)))
            .finish()
    }
}

impl DataTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every artifact type srcfab itself produces.
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        reg.register::<SourceUnit>(data_type::UNIT);
        reg.register::<GraphOutput>(data_type::GRAPH);
        reg.register::<Vec<ResolvedDep>>(data_type::DEPRESOLVE);
        reg.register::<BlameOutput>(data_type::BLAME);
        reg.register::<AuthorshipOutput>(data_type::AUTHORSHIP);
        reg
    }

    /// Registers `T` under `name`.
    ///
    /// # Panics
    ///
    /// If `name` is empty, already registered, or `T` was registered under
    /// another name.
    pub fn register<T>(&mut self, name: &str)
    where
        T: DeserializeOwned + Serialize + fmt::Debug + Send + Sync + 'static,
    {
        if let Err(e) = self.try_register::<T>(name) {
            panic!("data type registry: {e}");
        }
    }

    pub fn try_register<T>(&mut self, name: &str) -> Result<(), RegistryError>
    where
        T: DeserializeOwned + Serialize + fmt::Debug + Send + Sync + 'static,
    {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.by_name.contains_key(name) {
            return Err(RegistryError::DuplicateName {
                name: name.to_string(),
            });
        }
        if let Some(existing) = self.by_type.get(&TypeId::of::<T>()) {
            return Err(RegistryError::DuplicateType {
                type_name: std::any::type_name::<T>(),
                existing: existing.clone(),
            });
        }

        self.by_name.insert(
            name.to_string(),
            Entry {
                type_name: std::any::type_name::<T>(),
                decode: decode_boxed::<T>,
            },
        );
        // Pointer-shaped handles to the same artifact resolve to the same name.
        for id in [
            TypeId::of::<T>(),
            TypeId::of::<Box<T>>(),
            TypeId::of::<Arc<T>>(),
        ] {
            self.by_type.insert(id, name.to_string());
        }
        Ok(())
    }

    /// Registered name of `T`.
    pub fn name_of<T: 'static>(&self) -> Option<&str> {
        self.by_type.get(&TypeId::of::<T>()).map(String::as_str)
    }

    /// File suffix for `T`, e.g. `graph.json`.
    pub fn suffix<T: 'static>(&self) -> Option<String> {
        self.name_of::<T>().map(suffix_for)
    }

    /// File suffix for the type of `value`.
    pub fn suffix_of<T: 'static>(&self, _value: &T) -> Option<String> {
        self.suffix::<T>()
    }

    /// File suffix for a registered name.
    pub fn suffix_for_name(&self, name: &str) -> Option<String> {
        self.by_name.contains_key(name).then(|| suffix_for(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Store-relative file holding `unit`'s artifact of type `name`.
    pub fn unit_file(&self, unit: &SourceUnit, name: &str) -> Result<String, StoreError> {
        if !self.contains(name) {
            return Err(StoreError::UnknownDataType {
                name: name.to_string(),
            });
        }
        Ok(unit_data_file(unit, name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// Decodes `bytes` as the type registered under `name`.
    pub fn decode(&self, name: &str, bytes: &[u8]) -> Result<Box<dyn DataObject>, StoreError> {
        let entry = self
            .by_name
            .get(name)
            .ok_or_else(|| StoreError::UnknownDataType {
                name: name.to_string(),
            })?;
        (entry.decode)(bytes).map_err(|source| StoreError::Decode {
            name: name.to_string(),
            source,
        })
    }
}

fn suffix_for(name: &str) -> String {
    format!("{name}.json")
}
