use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only audit row recording one inventory mutation. The autoincrement
/// `id` is the only ordering guarantee.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub barcode: String,
    pub action: LogAction,
    pub quantity: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum LogAction {
    #[sea_orm(string_value = "Added")]
    Added,
    #[sea_orm(string_value = "Removed")]
    Removed,
}

impl LogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::Added => "Added",
            LogAction::Removed => "Removed",
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
