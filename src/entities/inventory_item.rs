use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One stocked item, keyed by barcode. Rows only exist while `quantity > 0`;
/// a reconciliation that drains the quantity deletes the row instead of
/// storing zero.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub barcode: String,
    pub name: Option<String>,
    pub quantity: i32,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
