use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CardPrices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CardPrices::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CardPrices::CardId).string().not_null())
                    .col(ColumnDef::new(CardPrices::Price).integer().not_null())
                    .col(
                        ColumnDef::new(CardPrices::Condition)
                            .string()
                            .not_null()
                            .default("normal"),
                    )
                    .col(ColumnDef::new(CardPrices::Source).string().not_null())
                    .col(
                        ColumnDef::new(CardPrices::FetchedAt)
                            .timestamp()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(ColumnDef::new(CardPrices::FetchedDate).date().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_card_prices_card_id")
                            .from(CardPrices::Table, CardPrices::CardId)
                            .to(Cards::Table, Cards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Latest-price lookups per card
        manager
            .create_index(
                Index::create()
                    .name("idx_card_prices_card_fetched_at")
                    .table(CardPrices::Table)
                    .col(CardPrices::CardId)
                    .col(CardPrices::FetchedAt)
                    .to_owned(),
            )
            .await?;

        // Same-day replacement deletes
        manager
            .create_index(
                Index::create()
                    .name("idx_card_prices_fetched_date")
                    .table(CardPrices::Table)
                    .col(CardPrices::FetchedDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CardPrices::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CardPrices {
    Table,
    Id,
    CardId,
    Price,
    Condition,
    Source,
    FetchedAt,
    FetchedDate,
}

#[derive(DeriveIden)]
enum Cards {
    Table,
    Id,
}
