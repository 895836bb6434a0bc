pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_cards;
mod m20261001_000002_create_card_prices;
mod m20261001_000003_create_latest_card_prices_view;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_cards::Migration),
            Box::new(m20261001_000002_create_card_prices::Migration),
            Box::new(m20261001_000003_create_latest_card_prices_view::Migration),
        ]
    }
}
