use crate::context::RuleContext;
use crate::error::PlanError;
use srcfab_types::plan::Rule;

mod authorship;
mod blame;
mod depresolve;
mod graph;

pub use authorship::AuthorshipRules;
pub use blame::BlameRules;
pub use depresolve::DepresolveRules;
pub use graph::GraphRules;

/// Produces the rules for one operation.
///
/// `existing` holds every rule emitted by makers registered earlier, in
/// order.
pub trait RuleMaker: Send + Sync {
    fn name(&self) -> &str;

    fn make_rules(&self, ctx: &RuleContext<'_>, existing: &[Rule]) -> Result<Vec<Rule>, PlanError>;
}

/// Built-in makers in registration order.
pub fn builtin_makers() -> Vec<Box<dyn RuleMaker>> {
    vec![
        Box::new(GraphRules),
        Box::new(DepresolveRules),
        Box::new(BlameRules),
        Box::new(AuthorshipRules),
    ]
}
