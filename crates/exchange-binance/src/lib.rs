pub mod client;

pub use client::{exchange_symbol, BinanceClient};
