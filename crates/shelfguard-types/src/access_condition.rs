//! access condition labels attached to indexed resources.
//!
//! conditions compare by exact, case-sensitive name. the single exception
//! is [`OPEN_ACCESS`], which matches regardless of case.

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// the distinguished condition marking a resource as freely accessible.
pub const OPEN_ACCESS: &str = "OPEN_ACCESS";

/// a validated, non-empty access condition label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccessCondition(String);

impl AccessCondition {
    /// create a new condition. the name is kept verbatim.
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyCondition);
        }
        Ok(Self(name))
    }

    /// the condition name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// true if this is the open access condition (case-insensitive).
    pub fn is_open_access(&self) -> bool {
        self.0.eq_ignore_ascii_case(OPEN_ACCESS)
    }
}

impl TryFrom<String> for AccessCondition {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AccessCondition> for String {
    fn from(c: AccessCondition) -> Self {
        c.0
    }
}

impl Borrow<str> for AccessCondition {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// an unordered set of conditions a resource requires.
///
/// backed by a btreeset so iteration (and therefore logging and license
/// resolution) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionSet(BTreeSet<AccessCondition>);

impl ConditionSet {
    /// create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// build a set from raw names, skipping empty ones.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .filter_map(|n| AccessCondition::new(n).ok())
            .collect()
    }

    /// add a condition. returns false if it was already present.
    pub fn insert(&mut self, condition: AccessCondition) -> bool {
        self.0.insert(condition)
    }

    /// exact, case-sensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// number of conditions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// true if no conditions are required.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// iterate over conditions in name order.
    pub fn iter(&self) -> impl Iterator<Item = &AccessCondition> {
        self.0.iter()
    }

    /// true if the set is exactly `{OPEN_ACCESS}` in any letter case.
    pub fn is_open_access_only(&self) -> bool {
        self.0.len() == 1 && self.0.iter().all(AccessCondition::is_open_access)
    }
}

impl FromIterator<AccessCondition> for ConditionSet {
    fn from_iter<T: IntoIterator<Item = AccessCondition>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ConditionSet {
    type Item = &'a AccessCondition;
    type IntoIter = std::collections::btree_set::Iter<'a, AccessCondition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|c| c.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
