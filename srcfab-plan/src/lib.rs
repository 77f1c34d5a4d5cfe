//! Build-graph planning for srcfab.
//!
//! Rule makers run in registration order (graph, depresolve, blame,
//! authorship). Each one sees the rules emitted before it, so later stages
//! can depend on the exact targets of earlier ones. The assembler wraps the
//! result with an `all` rule and a `.DELETE_ON_ERROR` directive.

mod assembler;
mod context;
mod error;
pub mod makers;
mod ports;
mod registry;

pub use assembler::PlanAssembler;
pub use context::{BuildDataDir, DEFAULT_COMMAND, PlanOptions, RuleContext};
pub use error::PlanError;
pub use makers::{RuleMaker, builtin_makers};
pub use ports::{StaticToolChooser, ToolChooser};
pub use registry::RuleMakerRegistry;

/// Plans `tree` with the built-in rule makers and data types.
pub fn create_makefile(
    data_dir: &BuildDataDir,
    tree: &srcfab_types::Tree,
    options: &PlanOptions,
    chooser: &dyn ToolChooser,
) -> Result<srcfab_types::plan::Makefile, PlanError> {
    PlanAssembler::new().create_makefile(data_dir, tree, options, chooser)
}
