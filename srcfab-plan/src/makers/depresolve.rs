use super::RuleMaker;
use crate::context::RuleContext;
use crate::error::PlanError;
use srcfab_types::plan::Rule;
use srcfab_types::{data_type, op};
use tracing::debug;

/// Resolves every unit's raw dependencies from its declaration file.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepresolveRules;

impl RuleMaker for DepresolveRules {
    fn name(&self) -> &str {
        op::DEPRESOLVE
    }

    fn make_rules(&self, ctx: &RuleContext<'_>, _existing: &[Rule]) -> Result<Vec<Rule>, PlanError> {
        let mut rules = Vec::with_capacity(ctx.tree.units.len());
        for unit in &ctx.tree.units {
            let tool = ctx.resolve_tool(op::DEPRESOLVE, unit)?;
            let output = ctx.output(op::DEPRESOLVE, unit, data_type::DEPRESOLVE)?;
            let unit_file = ctx.output(op::DEPRESOLVE, unit, data_type::UNIT)?;

            let recipe = format!("{} < $^ 1> $@", ctx.tool_invocation(&tool));
            debug!(unit = %unit.id(), tool = %tool, "created depresolve rule");
            rules.push(Rule::for_unit(
                op::DEPRESOLVE,
                unit,
                output,
                vec![unit_file.path()],
                vec![recipe],
            ));
        }
        Ok(rules)
    }
}
