use super::RuleMaker;
use crate::context::RuleContext;
use crate::error::PlanError;
use srcfab_render::quote;
use srcfab_types::plan::Rule;
use srcfab_types::{UnitId, data_type, op};
use std::collections::HashMap;
use tracing::debug;

/// Joins each unit's graph and blame outputs into authorship data.
///
/// Reads the graph and blame rules already emitted, so it must be registered
/// after both.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorshipRules;

impl RuleMaker for AuthorshipRules {
    fn name(&self) -> &str {
        op::AUTHORSHIP
    }

    fn make_rules(&self, ctx: &RuleContext<'_>, existing: &[Rule]) -> Result<Vec<Rule>, PlanError> {
        let blame_targets: HashMap<UnitId, &str> = existing
            .iter()
            .filter(|r| r.is_op(op::BLAME))
            .filter_map(|r| Some((r.unit_id()?, r.target.as_str())))
            .collect();

        let mut rules = Vec::new();
        for graph in existing.iter().filter(|r| r.is_op(op::GRAPH)) {
            let Some(unit) = graph.unit.as_ref() else {
                continue;
            };
            if !unit.wants_op(op::AUTHORSHIP) {
                continue;
            }
            let id = unit.id();
            let blame = *blame_targets
                .get(&id)
                .ok_or_else(|| PlanError::MissingBlameRule { unit: id.clone() })?;

            let output = ctx.output(op::AUTHORSHIP, unit, data_type::AUTHORSHIP)?;
            let recipe = format!(
                "{} internal compute-authorship {} {} 1> $@",
                ctx.options.command,
                quote(blame),
                quote(&graph.target)
            );
            debug!(unit = %id, "created authorship rule");
            rules.push(Rule::for_unit(
                op::AUTHORSHIP,
                unit,
                output,
                vec![blame.to_string(), graph.target.clone()],
                vec![recipe],
            ));
        }
        Ok(rules)
    }
}
