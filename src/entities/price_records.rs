//! SeaORM Entity for price records
//!
//! 1:1 with products. `current_price` tracks the latest successful fetch;
//! `initial_price` is the baseline change detection measures against and
//! moves only when a notification fires (or the subscriber switches
//! display currency, which resets both).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "price_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: i64,
    /// Baseline price in integer minor-free units of the fetch currency
    pub initial_price: i64,
    /// Last observed price
    pub current_price: i64,
    pub last_checked_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Products,
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
