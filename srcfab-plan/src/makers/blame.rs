use super::RuleMaker;
use crate::context::RuleContext;
use crate::error::PlanError;
use srcfab_types::plan::Rule;
use srcfab_types::{data_type, op};
use tracing::debug;

/// Blames the files of units that ask for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlameRules;

impl RuleMaker for BlameRules {
    fn name(&self) -> &str {
        op::BLAME
    }

    fn make_rules(&self, ctx: &RuleContext<'_>, _existing: &[Rule]) -> Result<Vec<Rule>, PlanError> {
        let mut rules = Vec::new();
        for unit in ctx.tree.units.iter().filter(|u| u.wants_op(op::BLAME)) {
            let tool = ctx.resolve_tool(op::BLAME, unit)?;
            let output = ctx.output(op::BLAME, unit, data_type::BLAME)?;
            let unit_file = ctx.output(op::BLAME, unit, data_type::UNIT)?;

            let mut prereqs = vec![unit_file.path()];
            prereqs.extend(unit.files.iter().cloned());

            let recipe = format!("{} < $< 1> $@", ctx.tool_invocation(&tool));
            debug!(unit = %unit.id(), tool = %tool, "created blame rule");
            rules.push(Rule::for_unit(op::BLAME, unit, output, prereqs, vec![recipe]));
        }
        Ok(rules)
    }
}
