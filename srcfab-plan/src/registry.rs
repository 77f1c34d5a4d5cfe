use crate::makers::{RuleMaker, builtin_makers};

/// Rule makers in registration order.
///
/// Built once at startup and read-only afterwards. Registering an empty or
/// duplicate name panics immediately.
pub struct RuleMakerRegistry {
    makers: Vec<Box<dyn RuleMaker>>,
}

impl Default for RuleMakerRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RuleMakerRegistry {
    pub fn empty() -> Self {
        Self { makers: Vec::new() }
    }

    /// graph, depresolve, blame, authorship.
    pub fn builtin() -> Self {
        let mut reg = Self::empty();
        for maker in builtin_makers() {
            reg.register(maker);
        }
        reg
    }

    /// # Panics
    ///
    /// If the maker's name is empty or already registered.
    pub fn register(&mut self, maker: Box<dyn RuleMaker>) {
        let name = maker.name();
        if name.is_empty() {
            panic!("rule maker registry: empty rule maker name");
        }
        if self.contains(name) {
            panic!("rule maker registry: register called twice for rule maker {name}");
        }
        self.makers.push(maker);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.makers.iter().any(|m| m.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.makers.iter().map(|m| m.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn RuleMaker> {
        self.makers.iter().map(|m| m.as_ref())
    }
}

impl std::fmt::Debug for RuleMakerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::makers::GraphRules;

    #[test]
    fn builtin_order_is_fixed() {
        assert_eq!(
            RuleMakerRegistry::builtin().names(),
            vec!["graph", "depresolve", "blame", "authorship"]
        );
    }

    #[test]
    #[should_panic(expected = "register called twice for rule maker graph")]
    fn duplicate_name_panics_at_registration() {
        let mut reg = RuleMakerRegistry::builtin();
        reg.register(Box::new(GraphRules));
    }
}
