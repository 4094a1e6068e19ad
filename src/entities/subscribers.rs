//! SeaORM Entity for subscribers
//!
//! One row per registered user. The three settings columns are nullable;
//! NULL means "use the default" and is resolved by the settings resolver,
//! never by the database.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "subscribers")]
pub struct Model {
    /// Chat/user id from the messaging platform
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub name: String,
    /// Display currency code (e.g. "rub"), NULL -> default
    pub currency: Option<String>,
    /// "any" | "increase" | "decrease", NULL -> default
    pub direction: Option<String>,
    /// Minimum change percentage that triggers a notification, NULL -> default
    pub threshold_percent: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::watches::Entity")]
    Watches,
}

impl Related<super::watches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Watches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
