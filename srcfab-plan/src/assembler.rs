use crate::context::{BuildDataDir, PlanOptions, RuleContext};
use crate::error::PlanError;
use crate::ports::ToolChooser;
use crate::registry::RuleMakerRegistry;
use srcfab_store::DataTypeRegistry;
use srcfab_types::Tree;
use srcfab_types::plan::{ALL_TARGET, DELETE_ON_ERROR, Makefile, Rule};
use tracing::{debug, warn};

/// Runs every registered rule maker in order and assembles the build graph.
#[derive(Debug)]
pub struct PlanAssembler {
    makers: RuleMakerRegistry,
    data_types: DataTypeRegistry,
}

impl Default for PlanAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanAssembler {
    pub fn new() -> Self {
        Self {
            makers: RuleMakerRegistry::builtin(),
            data_types: DataTypeRegistry::builtin(),
        }
    }

    pub fn with_registries(makers: RuleMakerRegistry, data_types: DataTypeRegistry) -> Self {
        Self { makers, data_types }
    }

    pub fn makers(&self) -> &RuleMakerRegistry {
        &self.makers
    }

    /// Builds the plan for `tree`.
    ///
    /// The result starts with an `all` rule naming every target and ends with
    /// `.DELETE_ON_ERROR`. Unless `options.no_cache` is set, rules for units
    /// with a cached revision copy that revision's artifact instead of
    /// running a tool.
    pub fn create_makefile(
        &self,
        data_dir: &BuildDataDir,
        tree: &Tree,
        options: &PlanOptions,
        chooser: &dyn ToolChooser,
    ) -> Result<Makefile, PlanError> {
        let ctx = RuleContext {
            tree,
            data_dir,
            options,
            chooser,
            registry: &self.data_types,
        };

        let mut all_rules: Vec<Rule> = Vec::new();
        for maker in self.makers.iter() {
            let mut rules =
                maker
                    .make_rules(&ctx, &all_rules)
                    .map_err(|e| PlanError::RuleMaker {
                        maker: maker.name().to_string(),
                        source: Box::new(e),
                    })?;
            debug!(maker = maker.name(), rules = rules.len(), "rule maker finished");

            if !options.no_cache {
                for rule in rules.iter_mut() {
                    substitute_cached(rule);
                }
            }
            all_rules.append(&mut rules);
        }

        let all_targets: Vec<String> = all_rules.iter().map(|r| r.target.clone()).collect();
        let mut out = Vec::with_capacity(all_rules.len() + 2);
        out.push(Rule::placeholder(ALL_TARGET, all_targets));
        out.append(&mut all_rules);
        out.push(Rule::placeholder(DELETE_ON_ERROR, vec![]));

        Ok(Makefile { rules: out })
    }
}

/// Rewrites `rule` to copy its output from the unit's cached revision.
fn substitute_cached(rule: &mut Rule) {
    let Some(unit) = rule.unit.as_ref() else {
        return;
    };
    let Some(rev) = unit.cached_rev() else {
        return;
    };
    let Some(output) = rule.output.as_ref() else {
        return;
    };
    let Some(cached) = output.at_commit(rev) else {
        warn!(
            rule = %rule.target,
            "not using cached output: target has no commit segment"
        );
        return;
    };
    debug!(rule = %rule.target, cached_rev = rev, "using cached output");
    rule.recipes = vec![format!("cp {} {}", cached.path(), rule.target)];
}
