use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder, Set,
};

use crate::entities::{card_prices, cards, latest_card_prices, prelude::*};
use crate::models::card::{Card, CardFilter};
use crate::models::price::{NewPriceRecord, PriceRecord};
use crate::services::price_store::{CardCatalog, PriceStore, StoreError};

impl From<cards::Model> for Card {
    fn from(model: cards::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            series_code: model.series_code,
            card_number: model.card_number,
            rarity: model.rarity,
        }
    }
}

impl From<card_prices::Model> for PriceRecord {
    fn from(model: card_prices::Model) -> Self {
        Self {
            id: model.id,
            card_id: model.card_id,
            price: model.price,
            condition: model.condition,
            source: model.source,
            fetched_at: model.fetched_at,
            fetched_date: model.fetched_date,
        }
    }
}

impl From<latest_card_prices::Model> for PriceRecord {
    fn from(model: latest_card_prices::Model) -> Self {
        Self {
            id: model.id,
            card_id: model.card_id,
            price: model.price,
            condition: model.condition,
            source: model.source,
            fetched_at: model.fetched_at,
            fetched_date: model.fetched_date,
        }
    }
}

/// PostgreSQL-backed catalog and price history
#[derive(Clone)]
pub struct DbStore {
    db: DatabaseConnection,
}

impl DbStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CardCatalog for DbStore {
    async fn list_cards(&self, filter: &CardFilter) -> Result<Vec<Card>, StoreError> {
        let mut query = Cards::find();
        if let Some(rarity) = &filter.rarity {
            query = query.filter(cards::Column::Rarity.eq(rarity.as_str()));
        }

        let rows = query
            .order_by(cards::Column::CreatedAt, Order::Asc)
            .order_by(cards::Column::Id, Order::Asc)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Card::from).collect())
    }
}

#[async_trait]
impl PriceStore for DbStore {
    async fn insert_batch(&self, batch: &[NewPriceRecord]) -> Result<usize, StoreError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let models = batch.iter().map(|record| card_prices::ActiveModel {
            card_id: Set(record.card_id.clone()),
            price: Set(record.price),
            condition: Set(record.condition.clone()),
            source: Set(record.source.clone()),
            fetched_at: Set(record.fetched_at),
            fetched_date: Set(record.fetched_date),
            ..Default::default()
        });

        // Single multi-row INSERT, so the batch lands or fails as a unit
        CardPrices::insert_many(models).exec(&self.db).await?;

        Ok(batch.len())
    }

    async fn delete_for_date(
        &self,
        date: NaiveDate,
        card_ids: &[String],
    ) -> Result<u64, StoreError> {
        if card_ids.is_empty() {
            return Ok(0);
        }

        let result = CardPrices::delete_many()
            .filter(card_prices::Column::FetchedDate.eq(date))
            .filter(card_prices::Column::CardId.is_in(card_ids.iter().cloned()))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    async fn all_records(&self) -> Result<Vec<PriceRecord>, StoreError> {
        let rows = CardPrices::find()
            .order_by(card_prices::Column::FetchedAt, Order::Desc)
            .order_by(card_prices::Column::Id, Order::Desc)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(PriceRecord::from).collect())
    }

    async fn records_for_card(&self, card_id: &str) -> Result<Vec<PriceRecord>, StoreError> {
        let rows = CardPrices::find()
            .filter(card_prices::Column::CardId.eq(card_id))
            .order_by(card_prices::Column::FetchedAt, Order::Desc)
            .order_by(card_prices::Column::Id, Order::Desc)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(PriceRecord::from).collect())
    }

    async fn latest_view(&self, card_id: Option<&str>) -> Result<Vec<PriceRecord>, StoreError> {
        let mut query = LatestCardPrices::find();
        if let Some(card_id) = card_id {
            query = query.filter(latest_card_prices::Column::CardId.eq(card_id));
        }

        let rows = query
            .order_by(latest_card_prices::Column::CardId, Order::Asc)
            .order_by(latest_card_prices::Column::Condition, Order::Asc)
            .all(&self.db)
            .await
            .map_err(|e| StoreError::ViewUnavailable(e.to_string()))?;

        Ok(rows.into_iter().map(PriceRecord::from).collect())
    }
}
