//! network range entity for database storage.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

use shelfguard_types::{NetworkRange, parse_subnet_mask};

use crate::error::Error;

/// network range database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "network_ranges")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    /// cidr in display form, e.g. `10.0.0.0/8`.
    pub subnet_mask: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
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

/// the range without licenses; those are attached by the caller.
impl TryFrom<Model> for NetworkRange {
    type Error = Error;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let mask = parse_subnet_mask(&model.subnet_mask).map_err(|e| {
            Error::InvalidData(format!("network range {}: {}", model.name, e))
        })?;
        let mut range = NetworkRange::new(model.name, mask);
        range.description = model.description;
        Ok(range)
    }
}

impl From<&NetworkRange> for ActiveModel {
    fn from(range: &NetworkRange) -> Self {
        ActiveModel {
            id: NotSet,
            name: Set(range.name.clone()),
            subnet_mask: Set(range.subnet_mask.to_string()),
            description: Set(range.description.clone()),
            created_at: Set(Utc::now()),
        }
    }
}
