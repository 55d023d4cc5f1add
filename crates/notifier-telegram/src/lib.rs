pub mod client;

pub use client::{SendMessageRequest, TelegramNotifier};
