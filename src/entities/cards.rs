//! `SeaORM` Entity for the card catalog (read-only for this service)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub card_number: String,
    pub series_code: String,
    pub name: String,
    pub rarity: String,
    pub image_path: Option<String>,
    pub created_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::card_prices::Entity")]
    CardPrices,
}

impl Related<super::card_prices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CardPrices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
