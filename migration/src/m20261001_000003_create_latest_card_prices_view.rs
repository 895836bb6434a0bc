use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per (card, condition): the newest fetch, highest id on ties
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE OR REPLACE VIEW latest_card_prices AS
                SELECT DISTINCT ON (card_id, condition)
                    id,
                    card_id,
                    price,
                    condition,
                    source,
                    fetched_at,
                    fetched_date
                FROM card_prices
                ORDER BY card_id, condition, fetched_at DESC, id DESC;
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP VIEW IF EXISTS latest_card_prices;")
            .await?;

        Ok(())
    }
}
