//! `SeaORM` Entity for the `latest_card_prices` view
//!
//! One row per (card_id, condition). The view is optional; readers fall back
//! to reducing `card_prices` when it is missing.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "latest_card_prices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub card_id: String,
    pub price: i32,
    pub condition: String,
    pub source: String,
    pub fetched_at: DateTime,
    pub fetched_date: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
