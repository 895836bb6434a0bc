pub use super::card_prices::Entity as CardPrices;
pub use super::cards::Entity as Cards;
pub use super::latest_card_prices::Entity as LatestCardPrices;
