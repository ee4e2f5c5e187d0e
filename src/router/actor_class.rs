//! Closed mapping from client-facing actor class names to engine classes.
//!
//! A name resolves through the alias table first, then through the
//! configured allowlist. Anything else is rejected before the editor is
//! called.

use std::collections::HashSet;

/// Friendly aliases and the engine class each one spawns.
const ALIASES: &[(&str, &str)] = &[
    ("CubeActor", "StaticMeshActor"),
    ("PointLight", "PointLight"),
    ("DirectionalLight", "DirectionalLight"),
];

/// Actor classes `CreateActor` is allowed to spawn.
#[derive(Debug, Clone, Default)]
pub struct ActorClassTable {
    allowed: HashSet<String>,
}

impl ActorClassTable {
    /// Builds a table whose fallback allowlist is `allowed`.
    #[must_use]
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// Resolves a requested class name to the engine class to spawn.
    #[must_use]
    pub fn resolve(&self, requested: &str) -> Option<&str> {
        if let Some((_, engine_class)) = ALIASES.iter().find(|(alias, _)| *alias == requested) {
            return Some(*engine_class);
        }
        self.allowed.get(requested).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_without_allowlist() {
        let table = ActorClassTable::default();
        assert_eq!(table.resolve("CubeActor"), Some("StaticMeshActor"));
        assert_eq!(table.resolve("PointLight"), Some("PointLight"));
        assert_eq!(table.resolve("DirectionalLight"), Some("DirectionalLight"));
    }

    #[test]
    fn allowlist_is_exact_and_closed() {
        let table = ActorClassTable::new(["SpotLight"]);
        assert_eq!(table.resolve("SpotLight"), Some("SpotLight"));
        assert_eq!(table.resolve("spotlight"), None);
        assert_eq!(table.resolve("/Script/Engine.Actor"), None);
    }
}
