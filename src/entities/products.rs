//! SeaORM Entity for products
//!
//! A catalog product under watch by at least one subscriber. The name is
//! captured from the first successful price fetch and never re-derived;
//! a product with zero watches is deleted (its price record cascades).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Catalog article id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::watches::Entity")]
    Watches,
    #[sea_orm(has_one = "super::price_records::Entity")]
    PriceRecords,
}

impl Related<super::watches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Watches.def()
    }
}

impl Related<super::price_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
