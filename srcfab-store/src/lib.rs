//! Build-data persistence for srcfab.
//!
//! Artifacts live at `<root>/<commit>/<unit name>/<unit type>.<data type>.json`
//! inside a per-repository store. The [`DataTypeRegistry`] maps each data type
//! name to a decoder, so readers can load any artifact without knowing its
//! concrete type ahead of time.

mod error;
mod load;
mod registry;
mod store;

pub use error::StoreError;
pub use load::{load_units, read_cached_tree, write_unit};
pub use registry::{DataObject, DataTypeRegistry, RegistryError};
pub use store::{
    BUILD_DATA_DIR_NAME, BuildDataFileInfo, BuildStore, CommitStore, DataFileName, RepoStore,
    list_data_files, unit_data_file,
};
