//! test utilities for creating policy fixtures.
//!
//! this module provides builder patterns for license types and licenses
//! without needing to specify all fields.

use crate::{License, LicenseId, LicenseType, LicenseeRef, Privilege, UserId};

/// builder for creating test [`LicenseType`] instances.
///
/// # example
/// ```
/// use shelfguard_types::Privilege;
/// use shelfguard_types::test_utils::TestLicenseTypeBuilder;
///
/// let lt = TestLicenseTypeBuilder::new("restricted")
///     .with_privileges(&[Privilege::VIEW_THUMBNAILS])
///     .build();
/// assert!(lt.grants_by_default(&Privilege::VIEW_THUMBNAILS));
/// ```
#[derive(Debug, Clone)]
pub struct TestLicenseTypeBuilder {
    license_type: LicenseType,
}

impl TestLicenseTypeBuilder {
    /// start a license type with the given name.
    ///
    /// # panics
    /// if the name is blank.
    pub fn new(name: &str) -> Self {
        Self {
            license_type: LicenseType::new(name).expect("test license type name"),
        }
    }

    /// set the default privileges.
    pub fn with_privileges(mut self, privileges: &[Privilege]) -> Self {
        self.license_type.privileges = privileges.iter().cloned().collect();
        self
    }

    /// set the scope condition.
    pub fn with_conditions(mut self, conditions: &str) -> Self {
        self.license_type.conditions = Some(conditions.to_string());
        self
    }

    /// mark as open access.
    pub fn open_access(mut self) -> Self {
        self.license_type.open_access = true;
        self
    }

    /// add an overridden license type name.
    pub fn overriding(mut self, name: &str) -> Self {
        self.license_type.overrides.insert(name.to_string());
        self
    }

    /// build the license type.
    pub fn build(self) -> LicenseType {
        self.license_type
    }
}

/// builder for creating test [`License`] instances.
#[derive(Debug, Clone)]
pub struct TestLicenseBuilder {
    license: License,
}

impl TestLicenseBuilder {
    /// start a license of `license_type` held by user 1.
    pub fn new(license_type: LicenseType) -> Self {
        Self {
            license: License::new(license_type, LicenseeRef::User(UserId(1))),
        }
    }

    /// set the license id.
    pub fn with_id(mut self, id: u64) -> Self {
        self.license.id = LicenseId(id);
        self
    }

    /// hold the license as the given user.
    pub fn for_user(mut self, user_id: UserId) -> Self {
        self.license.licensee = LicenseeRef::User(user_id);
        self
    }

    /// hold the license as the given network range.
    pub fn for_network_range(mut self, name: &str) -> Self {
        self.license.licensee = LicenseeRef::NetworkRange(name.to_string());
        self
    }

    /// narrow the granted privileges.
    pub fn with_privileges(mut self, privileges: &[Privilege]) -> Self {
        self.license.privileges = privileges.iter().cloned().collect();
        self
    }

    /// restrict the license to resources matching `conditions`.
    pub fn with_conditions(mut self, conditions: &str) -> Self {
        self.license.conditions = Some(conditions.to_string());
        self
    }

    /// set the validity window.
    pub fn valid_between(
        mut self,
        start: Option<chrono::DateTime<chrono::Utc>>,
        end: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Self {
        self.license.start = start;
        self.license.end = end;
        self
    }

    /// build the license.
    pub fn build(self) -> License {
        self.license
    }
}
