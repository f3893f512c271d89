//! Factor registry — the process-wide catalogue of factor constructors.
//!
//! The registry is an explicitly constructed instance created once at
//! process start and passed by reference to the pipeline; registration is a
//! single-threaded initialization phase, after which the registry is only
//! read. Discovery is an explicit manifest (`install_builtin_factors`), not
//! a filesystem scan.

use std::collections::BTreeMap;

use super::Factor;

/// Constructor for a registered factor unit.
pub type FactorCtor = fn() -> Box<dyn Factor>;

/// Registry misuse, fatal at the call site.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate factor name '{0}' bound to a different implementation")]
    DuplicateName(String),
    #[error("unknown factor: {0}")]
    UnknownFactor(String),
}

#[derive(Debug, Default)]
pub struct FactorRegistry {
    factors: BTreeMap<String, FactorCtor>,
}

impl FactorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a named constructor.
    ///
    /// Re-registering the identical constructor is a no-op; binding the name
    /// to a different one fails. Identity is the constructor fn pointer.
    pub fn register(&mut self, name: &str, ctor: FactorCtor) -> Result<(), RegistryError> {
        match self.factors.get(name) {
            Some(existing) if *existing == ctor => Ok(()),
            Some(_) => Err(RegistryError::DuplicateName(name.to_string())),
            None => {
                self.factors.insert(name.to_string(), ctor);
                Ok(())
            }
        }
    }

    /// Construct the factor unit registered under `name`.
    pub fn get(&self, name: &str) -> Result<Box<dyn Factor>, RegistryError> {
        self.factors
            .get(name)
            .map(|ctor| ctor())
            .ok_or_else(|| RegistryError::UnknownFactor(name.to_string()))
    }

    /// Registered names, sorted; the iterator restarts on every call.
    pub fn list(&self) -> impl Iterator<Item = &str> {
        self.factors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

/// Populate a registry with every built-in factor module.
///
/// This is the manifest: each module's registration call runs exactly once
/// per invocation, at process start.
pub fn install_builtin_factors(registry: &mut FactorRegistry) -> Result<(), RegistryError> {
    super::momentum::register_factors(registry)?;
    super::price_action::register_factors(registry)?;
    super::volume::register_factors(registry)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FactorSeries, JoinedPanel};

    #[derive(Debug, Default)]
    struct Stub;

    impl Factor for Stub {
        fn name(&self) -> &'static str {
            "stub"
        }
        fn requires(&self) -> &'static [&'static str] {
            &["close"]
        }
        fn compute(&self, panel: &JoinedPanel) -> FactorSeries {
            FactorSeries::new("stub", panel.dates().to_vec(), Default::default())
        }
    }

    #[derive(Debug, Default)]
    struct Rival;

    impl Factor for Rival {
        fn name(&self) -> &'static str {
            "rival"
        }
        fn requires(&self) -> &'static [&'static str] {
            &["open"]
        }
        fn compute(&self, panel: &JoinedPanel) -> FactorSeries {
            FactorSeries::new("rival", panel.dates().to_vec(), Default::default())
        }
    }

    fn make_stub() -> Box<dyn Factor> {
        Box::new(Stub)
    }

    fn make_other() -> Box<dyn Factor> {
        Box::new(Rival)
    }

    #[test]
    fn register_and_get() {
        let mut reg = FactorRegistry::new();
        reg.register("stub", make_stub).unwrap();
        let unit = reg.get("stub").unwrap();
        assert_eq!(unit.name(), "stub");
        assert_eq!(unit.requires(), &["close"]);
    }

    #[test]
    fn get_unknown_fails() {
        let reg = FactorRegistry::new();
        match reg.get("nope") {
            Err(RegistryError::UnknownFactor(name)) => assert_eq!(name, "nope"),
            other => panic!("expected UnknownFactor, got {other:?}"),
        }
    }

    #[test]
    fn identical_reregistration_is_noop() {
        let mut reg = FactorRegistry::new();
        reg.register("stub", make_stub).unwrap();
        reg.register("stub", make_stub).unwrap();
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn different_implementation_same_name_rejected() {
        let mut reg = FactorRegistry::new();
        reg.register("stub", make_stub).unwrap();
        match reg.register("stub", make_other) {
            Err(RegistryError::DuplicateName(name)) => assert_eq!(name, "stub"),
            other => panic!("expected DuplicateName, got {other:?}"),
        }
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn list_is_sorted_and_restartable() {
        let mut reg = FactorRegistry::new();
        install_builtin_factors(&mut reg).unwrap();
        let first: Vec<&str> = reg.list().collect();
        let second: Vec<&str> = reg.list().collect();
        assert_eq!(first, second);
        let mut sorted = first.clone();
        sorted.sort_unstable();
        assert_eq!(first, sorted);
    }

    #[test]
    fn builtin_manifest_is_idempotent() {
        let mut reg = FactorRegistry::new();
        install_builtin_factors(&mut reg).unwrap();
        let count = reg.len();
        assert!(count >= 8);
        install_builtin_factors(&mut reg).unwrap();
        assert_eq!(reg.len(), count);
    }

    #[test]
    fn builtin_names_match_units() {
        let mut reg = FactorRegistry::new();
        install_builtin_factors(&mut reg).unwrap();
        for name in reg.list().map(str::to_string).collect::<Vec<_>>() {
            let unit = reg.get(&name).unwrap();
            assert_eq!(unit.name(), name);
            assert!(!unit.requires().is_empty());
        }
    }
}
