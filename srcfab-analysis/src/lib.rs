//! Post-processing of tool output for srcfab.
//!
//! [`normalize_graph_data`] turns a grapher's raw output into the stored
//! form: canonical repo URIs, byte offsets, no duplicate keys, stable
//! order. [`compute_unit_authorship`] joins a unit's blame and graph
//! output.

mod authorship;
mod normalize;
mod uri;
mod validate;

pub use authorship::{AuthorshipError, compute_unit_authorship};
pub use normalize::{BYTE_OFFSET_UNIT_TYPES, NormalizeError, normalize_graph_data, sort_output};
pub use uri::{UriError, try_make_uri};
pub use validate::{MultiError, validate_defs, validate_docs, validate_refs};
