//! Tool selection seam between planning and the toolchain catalog.

use srcfab_types::{SourceUnit, ToolRef};
use std::collections::BTreeMap;

/// Picks the tool that performs `op` for a unit when the unit does not pin one.
pub trait ToolChooser {
    fn choose(&self, op: &str, unit: &SourceUnit) -> anyhow::Result<ToolRef>;
}

/// Fixed `(op, unit type) -> tool` table, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticToolChooser {
    tools: BTreeMap<(String, String), ToolRef>,
}

impl StaticToolChooser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, op: &str, unit_type: &str, tool: ToolRef) -> Self {
        self.tools
            .insert((op.to_string(), unit_type.to_string()), tool);
        self
    }
}

impl ToolChooser for StaticToolChooser {
    fn choose(&self, op: &str, unit: &SourceUnit) -> anyhow::Result<ToolRef> {
        self.tools
            .get(&(op.to_string(), unit.unit_type.clone()))
            .cloned()
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "no tool found for op {:?} and unit type {:?}",
                    op,
                    unit.unit_type
                )
            })
    }
}
