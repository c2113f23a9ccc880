//! license entity for database storage.
//!
//! a license row references its license type and exactly one of a user or
//! a network range.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

use shelfguard_types::{License, LicenseId, LicenseType, LicenseeRef};

use super::{decode_list, encode_list};

/// license database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "licenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub license_type_id: i64,
    pub user_id: Option<i64>,
    pub network_range_id: Option<i64>,
    /// narrowed privileges as json array string.
    pub privileges: Option<String>,
    pub conditions: Option<String>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::license_type::Entity",
        from = "Column::LicenseTypeId",
        to = "super::license_type::Column::Id"
    )]
    LicenseType,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::network_range::Entity",
        from = "Column::NetworkRangeId",
        to = "super::network_range::Column::Id"
    )]
    NetworkRange,
}

impl Related<super::license_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LicenseType.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::network_range::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NetworkRange.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// build the domain license from this row and its resolved references.
    pub fn into_license(self, license_type: LicenseType, licensee: LicenseeRef) -> License {
        License {
            id: LicenseId(self.id as u64),
            license_type,
            licensee,
            privileges: decode_list(self.privileges.as_deref()),
            conditions: self.conditions,
            start: self.valid_from,
            end: self.valid_until,
        }
    }
}

/// an active model for `license`, with the foreign keys already resolved.
pub fn active_model(
    license: &License,
    license_type_id: i64,
    user_id: Option<i64>,
    network_range_id: Option<i64>,
) -> ActiveModel {
    ActiveModel {
        id: if license.id.0 == 0 {
            NotSet
        } else {
            Set(license.id.0 as i64)
        },
        license_type_id: Set(license_type_id),
        user_id: Set(user_id),
        network_range_id: Set(network_range_id),
        privileges: Set(encode_list(&license.privileges, license.privileges.is_empty())),
        conditions: Set(license.conditions.clone()),
        valid_from: Set(license.start),
        valid_until: Set(license.end),
        created_at: Set(Utc::now()),
    }
}
