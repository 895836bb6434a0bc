use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cards::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cards::CardNumber).string().not_null())
                    .col(ColumnDef::new(Cards::SeriesCode).string().not_null())
                    .col(ColumnDef::new(Cards::Name).string().not_null())
                    .col(
                        ColumnDef::new(Cards::Rarity)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Cards::ImagePath).string().null())
                    .col(
                        ColumnDef::new(Cards::CreatedAt)
                            .timestamp()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Rarity-filtered fetches
        manager
            .create_index(
                Index::create()
                    .name("idx_cards_rarity")
                    .table(Cards::Table)
                    .col(Cards::Rarity)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cards::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Cards {
    Table,
    Id,
    CardNumber,
    SeriesCode,
    Name,
    Rarity,
    ImagePath,
    CreatedAt,
}
