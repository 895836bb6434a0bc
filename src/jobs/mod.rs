pub mod price_fetch;
