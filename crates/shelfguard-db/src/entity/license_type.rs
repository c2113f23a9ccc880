//! license type entity for database storage.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use shelfguard_types::{LicenseType, Privilege};

use super::{decode_list, encode_list};

/// license type database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "license_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    /// default privileges as json array string.
    pub privileges: Option<String>,
    pub open_access: bool,
    pub conditions: Option<String>,
    /// overridden license type names as json array string.
    pub overrides: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::license::Entity")]
    Licenses,
}

impl Related<super::license::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Licenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for LicenseType {
    fn from(model: Model) -> Self {
        // an unreadable privilege list grants nothing
        let privileges: BTreeSet<Privilege> = decode_list(model.privileges.as_deref());
        LicenseType {
            name: model.name,
            description: model.description,
            privileges,
            open_access: model.open_access,
            conditions: model.conditions,
            overrides: decode_list(model.overrides.as_deref()),
        }
    }
}

impl From<&LicenseType> for ActiveModel {
    fn from(lt: &LicenseType) -> Self {
        let now = Utc::now();
        ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            name: Set(lt.name.clone()),
            description: Set(lt.description.clone()),
            privileges: Set(encode_list(&lt.privileges, lt.privileges.is_empty())),
            open_access: Set(lt.open_access),
            conditions: Set(lt.conditions.clone()),
            overrides: Set(encode_list(&lt.overrides, lt.overrides.is_empty())),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}
