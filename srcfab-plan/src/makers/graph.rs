use super::RuleMaker;
use crate::context::RuleContext;
use crate::error::PlanError;
use srcfab_types::plan::Rule;
use srcfab_types::{data_type, op};
use tracing::debug;

/// Graphs every unit, piping the tool's output through normalization.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphRules;

impl RuleMaker for GraphRules {
    fn name(&self) -> &str {
        op::GRAPH
    }

    fn make_rules(&self, ctx: &RuleContext<'_>, _existing: &[Rule]) -> Result<Vec<Rule>, PlanError> {
        let mut rules = Vec::with_capacity(ctx.tree.units.len());
        for unit in &ctx.tree.units {
            let tool = ctx.resolve_tool(op::GRAPH, unit)?;
            let output = ctx.output(op::GRAPH, unit, data_type::GRAPH)?;
            let unit_file = ctx.output(op::GRAPH, unit, data_type::UNIT)?;

            let mut prereqs = vec![unit_file.path()];
            prereqs.extend(unit.files.iter().cloned());

            let recipe = format!(
                "{} < $< | {} internal normalize-graph-data --unit-type {:?} --dir . 1> $@",
                ctx.tool_invocation(&tool),
                ctx.options.command,
                unit.unit_type
            );
            debug!(unit = %unit.id(), tool = %tool, "created graph rule");
            rules.push(Rule::for_unit(op::GRAPH, unit, output, prereqs, vec![recipe]));
        }
        Ok(rules)
    }
}
