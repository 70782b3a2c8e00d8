// Technical indicators module
// RSI and EMA over closing prices, with warm-up gaps as `None`

pub mod moving_averages;
pub mod rsi;

pub use moving_averages::{Ema, Sma};
pub use rsi::Rsi;
