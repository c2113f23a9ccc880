//! the license type override graph.
//!
//! a license type may name others it overrides. the decision path does not
//! use this relation; it is resolved here for validation and reporting.

use std::collections::{BTreeMap, BTreeSet};

use shelfguard_types::LicenseType;

use crate::error::ValidationError;

/// directed graph of `overrides` edges between license types.
#[derive(Debug, Clone, Default)]
pub struct OverrideGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl OverrideGraph {
    /// build the graph from a catalog; duplicate names merge their edges.
    pub fn new(license_types: &[LicenseType]) -> Self {
        let mut edges: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for lt in license_types {
            edges
                .entry(lt.name.clone())
                .or_default()
                .extend(lt.overrides.iter().cloned());
        }
        Self { edges }
    }

    /// every license type transitively overridden by `name`.
    ///
    /// cycles are tolerated; `name` itself is included only if it sits on one.
    pub fn overridden_by(&self, name: &str) -> BTreeSet<String> {
        let mut visited = BTreeSet::new();
        let mut stack: Vec<&str> = self
            .edges
            .get(name)
            .map(|targets| targets.iter().map(String::as_str).collect())
            .unwrap_or_default();

        while let Some(current) = stack.pop() {
            if !visited.insert(current.to_string()) {
                continue;
            }
            if let Some(targets) = self.edges.get(current) {
                stack.extend(
                    targets
                        .iter()
                        .map(String::as_str)
                        .filter(|t| !visited.contains(*t)),
                );
            }
        }

        visited
    }

    /// dangling references and cycles, in name order.
    pub fn findings(&self) -> Vec<ValidationError> {
        let mut findings = Vec::new();

        for (name, targets) in &self.edges {
            for target in targets {
                if !self.edges.contains_key(target) {
                    findings.push(ValidationError::UnknownOverride {
                        name: name.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        for name in self.edges.keys() {
            if self.overridden_by(name).contains(name) {
                findings.push(ValidationError::OverrideCycle(name.clone()));
            }
        }

        findings
    }
}
