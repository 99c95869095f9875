//! Binance trade-stream price alerts delivered to Telegram chats.

pub mod api;
pub mod app;
pub mod config;
pub mod monitor;
pub mod error;
