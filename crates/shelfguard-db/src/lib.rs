//! database layer for shelfguard.
//!
//! this crate provides persistent storage for:
//! - License types
//! - Users
//! - Network ranges
//! - Licenses held by users and network ranges
//!
//! [`ShelfguardDb`] implements [`PolicyStore`] so the access engine can read
//! the catalog straight from the database.

#![warn(missing_docs)]

mod entity;
mod error;
mod migration;

pub use error::Error;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database as SeaOrmDatabase, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use shelfguard_grants::PolicyStore;
use shelfguard_types::{
    DatabaseConfig, License, LicenseId, LicenseType, LicenseeRef, NetworkRange, User, UserId,
};

/// result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// database trait for shelfguard policy storage.
///
/// this trait abstracts over different database backends (sqlite, postgresql).
/// reads resolve licenses fully: a returned user or network range carries
/// its licenses with their license types embedded.
pub trait Database: Send + Sync {
    /// check the connection.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;

    /// create a license type. fails if the name is taken.
    fn create_license_type(
        &self,
        license_type: &LicenseType,
    ) -> impl Future<Output = Result<LicenseType>> + Send;

    /// get a license type by name.
    fn get_license_type(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<LicenseType>>> + Send;

    /// list all license types in name order.
    fn list_license_types(&self) -> impl Future<Output = Result<Vec<LicenseType>>> + Send;

    /// create a user without licenses. fails if the name is taken.
    fn create_user(&self, user: &User) -> impl Future<Output = Result<User>> + Send;

    /// get a user by name, with licenses.
    fn get_user_by_name(&self, name: &str) -> impl Future<Output = Result<Option<User>>> + Send;

    /// create a network range without licenses. fails if the name is taken.
    fn create_network_range(
        &self,
        range: &NetworkRange,
    ) -> impl Future<Output = Result<NetworkRange>> + Send;

    /// list all network ranges in name order, with licenses.
    fn list_network_ranges(&self) -> impl Future<Output = Result<Vec<NetworkRange>>> + Send;

    /// create a license. the license type and licensee must exist.
    fn create_license(&self, license: &License) -> impl Future<Output = Result<License>> + Send;

    /// delete a license.
    fn delete_license(&self, id: LicenseId) -> impl Future<Output = Result<()>> + Send;
}

/// the main database implementation using sea-orm.
#[derive(Clone)]
pub struct ShelfguardDb {
    conn: DatabaseConnection,
}

impl ShelfguardDb {
    /// connect using `config` and run migrations.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let url = Self::build_connection_url(config)?;
        let conn: DatabaseConnection = SeaOrmDatabase::connect(&url)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let db = Self { conn };
        db.migrate().await?;
        Ok(db)
    }

    /// build a sea-orm compatible connection url from config.
    fn build_connection_url(config: &DatabaseConfig) -> Result<String> {
        match config.db_type.as_str() {
            "sqlite" => {
                let path = if config.connection_string.starts_with("sqlite:") {
                    config.connection_string.clone()
                } else {
                    format!("sqlite:{}", config.connection_string)
                };
                // create the file if it doesn't exist
                if path.contains('?') {
                    Ok(path)
                } else {
                    Ok(format!("{}?mode=rwc", path))
                }
            }
            "postgres" | "postgresql" => Ok(config.connection_string.clone()),
            other => Err(Error::InvalidData(format!(
                "unsupported database type: {}",
                other
            ))),
        }
    }

    /// create an in-memory sqlite database for testing.
    pub async fn new_in_memory() -> Result<Self> {
        let conn: DatabaseConnection = SeaOrmDatabase::connect("sqlite::memory:")
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let db = Self { conn };
        db.migrate().await?;
        Ok(db)
    }

    /// run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        migration::Migrator::up(&self.conn, None)
            .await
            .map_err(|e| Error::Migration(e.to_string()))?;
        Ok(())
    }

    /// create every core license type that does not exist yet.
    ///
    /// returns the number of license types created.
    pub async fn seed_core_license_types(&self) -> Result<usize> {
        let mut created = 0;
        for license_type in LicenseType::core_types() {
            if self.get_license_type(&license_type.name).await?.is_some() {
                continue;
            }
            self.create_license_type(&license_type).await?;
            info!(license_type = %license_type.name, "seeded core license type");
            created += 1;
        }
        Ok(created)
    }

    /// import a resolved catalog into an empty database.
    ///
    /// user ids are assigned by the database; licenses follow their holder.
    pub async fn import_policy(
        &self,
        license_types: &[LicenseType],
        network_ranges: &[NetworkRange],
        users: &[User],
    ) -> Result<()> {
        for license_type in license_types {
            self.create_license_type(license_type).await?;
        }

        for range in network_ranges {
            self.create_network_range(range).await?;
            for license in &range.licenses {
                let mut license = license.clone();
                license.id = LicenseId(0);
                license.licensee = LicenseeRef::NetworkRange(range.name.clone());
                self.create_license(&license).await?;
            }
        }

        for user in users {
            let mut fresh = user.clone();
            fresh.id = UserId(0);
            let created = self.create_user(&fresh).await?;
            for license in &user.licenses {
                let mut license = license.clone();
                license.id = LicenseId(0);
                license.licensee = LicenseeRef::User(created.id);
                self.create_license(&license).await?;
            }
        }

        info!(
            license_types = license_types.len(),
            network_ranges = network_ranges.len(),
            users = users.len(),
            "imported policy"
        );
        Ok(())
    }

    /// every license type keyed by row id.
    async fn license_types_by_id(&self) -> Result<HashMap<i64, LicenseType>> {
        let rows = entity::license_type::Entity::find().all(&self.conn).await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.id, LicenseType::from(row)))
            .collect())
    }

    /// resolve license rows against the license type table.
    async fn resolve_licenses(
        &self,
        rows: Vec<entity::license::Model>,
        licensee: impl Fn(&entity::license::Model) -> Option<LicenseeRef>,
    ) -> Result<Vec<License>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let types = self.license_types_by_id().await?;

        rows.into_iter()
            .map(|row| {
                let license_type = types.get(&row.license_type_id).cloned().ok_or_else(|| {
                    Error::InvalidData(format!(
                        "license {} references missing license type {}",
                        row.id, row.license_type_id
                    ))
                })?;
                let holder = licensee(&row).ok_or_else(|| {
                    Error::InvalidData(format!("license {} has no licensee", row.id))
                })?;
                Ok(row.into_license(license_type, holder))
            })
            .collect()
    }
}

impl Database for ShelfguardDb {
    async fn ping(&self) -> Result<()> {
        use sea_orm::ConnectionTrait;
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(())
    }

    // license type operations

    async fn create_license_type(&self, license_type: &LicenseType) -> Result<LicenseType> {
        if self.get_license_type(&license_type.name).await?.is_some() {
            return Err(Error::AlreadyExists(format!(
                "license type {}",
                license_type.name
            )));
        }
        let model: entity::license_type::ActiveModel = license_type.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_license_type(&self, name: &str) -> Result<Option<LicenseType>> {
        let result = entity::license_type::Entity::find()
            .filter(entity::license_type::Column::Name.eq(name))
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_license_types(&self) -> Result<Vec<LicenseType>> {
        let results = entity::license_type::Entity::find()
            .order_by_asc(entity::license_type::Column::Name)
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    // user operations

    async fn create_user(&self, user: &User) -> Result<User> {
        let existing = entity::user::Entity::find()
            .filter(entity::user::Column::Name.eq(user.name.as_str()))
            .one(&self.conn)
            .await?;
        if existing.is_some() {
            return Err(Error::AlreadyExists(format!("user {}", user.name)));
        }
        let model: entity::user::ActiveModel = user.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_user_by_name(&self, name: &str) -> Result<Option<User>> {
        let Some(row) = entity::user::Entity::find()
            .filter(entity::user::Column::Name.eq(name))
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let user_id = row.id;
        let license_rows = entity::license::Entity::find()
            .filter(entity::license::Column::UserId.eq(user_id))
            .order_by_asc(entity::license::Column::Id)
            .all(&self.conn)
            .await?;

        let mut user = User::from(row);
        user.licenses = self
            .resolve_licenses(license_rows, |_| Some(LicenseeRef::User(UserId(user_id as u64))))
            .await?;
        Ok(Some(user))
    }

    // network range operations

    async fn create_network_range(&self, range: &NetworkRange) -> Result<NetworkRange> {
        let existing = entity::network_range::Entity::find()
            .filter(entity::network_range::Column::Name.eq(range.name.as_str()))
            .one(&self.conn)
            .await?;
        if existing.is_some() {
            return Err(Error::AlreadyExists(format!("network range {}", range.name)));
        }
        let model: entity::network_range::ActiveModel = range.into();
        let result = model.insert(&self.conn).await?;
        NetworkRange::try_from(result)
    }

    async fn list_network_ranges(&self) -> Result<Vec<NetworkRange>> {
        let rows = entity::network_range::Entity::find()
            .order_by_asc(entity::network_range::Column::Name)
            .all(&self.conn)
            .await?;
        let names: HashMap<i64, String> = rows.iter().map(|r| (r.id, r.name.clone())).collect();

        let license_rows = entity::license::Entity::find()
            .filter(entity::license::Column::NetworkRangeId.is_not_null())
            .order_by_asc(entity::license::Column::Id)
            .all(&self.conn)
            .await?;
        let licenses = self
            .resolve_licenses(license_rows, |row| {
                row.network_range_id
                    .and_then(|id| names.get(&id))
                    .map(|name| LicenseeRef::NetworkRange(name.clone()))
            })
            .await?;

        let mut by_range: HashMap<String, Vec<License>> = HashMap::new();
        for license in licenses {
            if let LicenseeRef::NetworkRange(name) = &license.licensee {
                by_range.entry(name.clone()).or_default().push(license);
            }
        }

        let mut ranges = Vec::with_capacity(rows.len());
        for row in rows {
            let mut range = NetworkRange::try_from(row)?;
            range.licenses = by_range.remove(&range.name).unwrap_or_default();
            ranges.push(range);
        }
        Ok(ranges)
    }

    // license operations

    async fn create_license(&self, license: &License) -> Result<License> {
        let type_row = entity::license_type::Entity::find()
            .filter(entity::license_type::Column::Name.eq(license.license_type.name.as_str()))
            .one(&self.conn)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("license type {}", license.license_type.name))
            })?;

        let (user_id, network_range_id) = match &license.licensee {
            LicenseeRef::User(id) => {
                entity::user::Entity::find_by_id(id.0 as i64)
                    .one(&self.conn)
                    .await?
                    .ok_or_else(|| Error::NotFound(format!("user {}", id)))?;
                (Some(id.0 as i64), None)
            }
            LicenseeRef::NetworkRange(name) => {
                let range = entity::network_range::Entity::find()
                    .filter(entity::network_range::Column::Name.eq(name.as_str()))
                    .one(&self.conn)
                    .await?
                    .ok_or_else(|| Error::NotFound(format!("network range {}", name)))?;
                (None, Some(range.id))
            }
        };

        let model = entity::license::active_model(license, type_row.id, user_id, network_range_id);
        let result = model.insert(&self.conn).await?;
        debug!(license = result.id, license_type = %type_row.name, "created license");
        Ok(result.into_license(type_row.into(), license.licensee.clone()))
    }

    async fn delete_license(&self, id: LicenseId) -> Result<()> {
        let result = entity::license::Entity::delete_by_id(id.0 as i64)
            .exec(&self.conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(Error::NotFound(format!("license {}", id)));
        }
        Ok(())
    }
}

impl PolicyStore for ShelfguardDb {
    async fn license_types(&self) -> shelfguard_grants::Result<Arc<Vec<LicenseType>>> {
        Ok(Arc::new(self.list_license_types().await?))
    }

    async fn network_ranges(&self) -> shelfguard_grants::Result<Arc<Vec<NetworkRange>>> {
        Ok(Arc::new(self.list_network_ranges().await?))
    }

    async fn user_by_name(&self, name: &str) -> shelfguard_grants::Result<Option<User>> {
        Ok(self.get_user_by_name(name).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfguard_types::Privilege;
    use shelfguard_types::test_utils::{TestLicenseBuilder, TestLicenseTypeBuilder};

    async fn db() -> ShelfguardDb {
        ShelfguardDb::new_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn license_type_roundtrip() {
        let db = db().await;
        let restricted = TestLicenseTypeBuilder::new("restricted")
            .with_privileges(&[Privilege::VIEW_THUMBNAILS, Privilege::LIST])
            .with_conditions("DOCSTRCT:monograph FILENAME:{.*\\.tif}")
            .overriding("embargoed")
            .build();

        let created = db.create_license_type(&restricted).await.unwrap();
        assert_eq!(created, restricted);
        assert_eq!(db.get_license_type("restricted").await.unwrap(), Some(restricted));
        assert_eq!(db.get_license_type("other").await.unwrap(), None);

        let err = db
            .create_license_type(&TestLicenseTypeBuilder::new("restricted").build())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let db = db().await;
        let first = db.seed_core_license_types().await.unwrap();
        assert_eq!(first, shelfguard_types::CORE_LICENSE_TYPES.len());
        assert_eq!(db.seed_core_license_types().await.unwrap(), 0);

        let types = db.list_license_types().await.unwrap();
        assert!(types.iter().all(LicenseType::is_core));
    }

    #[tokio::test]
    async fn user_licenses_are_resolved() {
        let db = db().await;
        let restricted = db
            .create_license_type(&TestLicenseTypeBuilder::new("restricted").build())
            .await
            .unwrap();
        let user = db
            .create_user(&User::new(UserId(0), "reader".to_string()))
            .await
            .unwrap();
        assert_ne!(user.id, UserId(0));

        let license = TestLicenseBuilder::new(restricted)
            .for_user(user.id)
            .with_privileges(&[Privilege::VIEW_IMAGES])
            .with_conditions("COLLECTION:press")
            .build();
        let created = db.create_license(&license).await.unwrap();
        assert_ne!(created.id, LicenseId(0));

        let loaded = db.get_user_by_name("reader").await.unwrap().unwrap();
        assert_eq!(loaded.licenses, vec![created.clone()]);
        assert!(loaded.licenses[0].grants(&Privilege::VIEW_IMAGES));
        assert_eq!(loaded.licenses[0].resource_conditions(), Some("COLLECTION:press"));

        db.delete_license(created.id).await.unwrap();
        let loaded = db.get_user_by_name("reader").await.unwrap().unwrap();
        assert!(loaded.licenses.is_empty());
        assert!(matches!(
            db.delete_license(created.id).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn network_range_licenses_are_grouped() {
        let db = db().await;
        let restricted = db
            .create_license_type(&TestLicenseTypeBuilder::new("restricted").build())
            .await
            .unwrap();
        for (name, mask) in [("campus", "203.0.113.0/24"), ("desk", "198.51.100.7/32")] {
            db.create_network_range(&NetworkRange::new(name, mask.parse().unwrap()))
                .await
                .unwrap();
        }
        db.create_license(
            &TestLicenseBuilder::new(restricted)
                .for_network_range("campus")
                .with_privileges(&[Privilege::VIEW_IMAGES])
                .build(),
        )
        .await
        .unwrap();

        let ranges = db.list_network_ranges().await.unwrap();
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].name, "campus");
        assert_eq!(ranges[0].licenses.len(), 1);
        assert!(ranges[0].matches("203.0.113.5".parse().unwrap()));
        assert!(ranges[1].licenses.is_empty());
    }

    #[tokio::test]
    async fn license_references_must_exist() {
        let db = db().await;
        let ghost = TestLicenseBuilder::new(TestLicenseTypeBuilder::new("ghost").build()).build();
        assert!(matches!(
            db.create_license(&ghost).await,
            Err(Error::NotFound(_))
        ));

        let restricted = db
            .create_license_type(&TestLicenseTypeBuilder::new("restricted").build())
            .await
            .unwrap();
        let orphan = TestLicenseBuilder::new(restricted)
            .for_user(UserId(42))
            .build();
        assert!(matches!(
            db.create_license(&orphan).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn serves_as_policy_store() {
        let db = db().await;
        db.ping().await.unwrap();
        db.create_license_type(&TestLicenseTypeBuilder::new("restricted").build())
            .await
            .unwrap();

        assert_eq!(PolicyStore::license_types(&db).await.unwrap().len(), 1);
        assert!(PolicyStore::network_ranges(&db).await.unwrap().is_empty());
        assert!(db.user_by_name("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn import_assigns_fresh_ids() {
        let db = db().await;
        let restricted = TestLicenseTypeBuilder::new("restricted").build();
        let mut user = User::new(UserId(9), "reader".to_string());
        user.licenses.push(
            TestLicenseBuilder::new(restricted.clone())
                .with_id(5)
                .for_user(UserId(9))
                .build(),
        );

        db.import_policy(&[restricted], &[], &[user]).await.unwrap();

        let loaded = db.get_user_by_name("reader").await.unwrap().unwrap();
        assert_eq!(loaded.id, UserId(1));
        assert_eq!(loaded.licenses.len(), 1);
        assert_eq!(loaded.licenses[0].licensee, LicenseeRef::User(UserId(1)));
    }

    #[test]
    fn connection_urls() {
        let sqlite = DatabaseConfig {
            db_type: "sqlite".to_string(),
            connection_string: "/tmp/policy.sqlite".to_string(),
        };
        assert_eq!(
            ShelfguardDb::build_connection_url(&sqlite).unwrap(),
            "sqlite:/tmp/policy.sqlite?mode=rwc"
        );

        let postgres = DatabaseConfig {
            db_type: "postgres".to_string(),
            connection_string: "postgres://localhost/shelfguard".to_string(),
        };
        assert_eq!(
            ShelfguardDb::build_connection_url(&postgres).unwrap(),
            "postgres://localhost/shelfguard"
        );

        let mysql = DatabaseConfig {
            db_type: "mysql".to_string(),
            connection_string: String::new(),
        };
        assert!(ShelfguardDb::build_connection_url(&mysql).is_err());
    }
}
