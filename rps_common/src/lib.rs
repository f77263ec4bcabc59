mod coins;

pub mod op;

pub use coins::{Coins, CoinsConversionError, CENTS_PER_COIN, COIN_CURRENCY_CODE};
