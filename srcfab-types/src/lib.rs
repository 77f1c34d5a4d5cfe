//! Shared DTOs (schemas-as-code) for the srcfab workspace.
//!
//! # Design constraints
//! - These types are serialized to disk and exchanged with external tools
//!   over stdin/stdout, so field names follow the PascalCase convention the
//!   toolchains already speak.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod authorship;
pub mod blame;
pub mod depresolve;
pub mod graph;
pub mod plan;
pub mod toolref;
pub mod tree;
pub mod unit;

pub use toolref::{ToolRef, ToolRefParseError};
pub use tree::Tree;
pub use unit::{SourceUnit, UnitId, UnitIdError, UnitKey};

/// Operation names. Each one is also the key a unit uses in its `Ops` map.
pub mod op {
    pub const SCAN: &str = "scan";
    pub const GRAPH: &str = "graph";
    pub const DEPRESOLVE: &str = "depresolve";
    pub const BLAME: &str = "blame";
    pub const AUTHORSHIP: &str = "authorship";
}

/// Registered data type names. The on-disk suffix is `<name>.json`.
pub mod data_type {
    pub const UNIT: &str = "unit";
    pub const GRAPH: &str = "graph";
    pub const DEPRESOLVE: &str = "depresolve";
    pub const BLAME: &str = "blame";
    pub const AUTHORSHIP: &str = "authorship";
}
