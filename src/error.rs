use thiserror::Error;

#[derive(Error, Debug)]
pub enum PriceWatchError {
    #[error("WebSocket error: {0}")]
    WebsocketError(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("invalid price {raw:?} for {symbol}")]
    InvalidPrice { symbol: String, raw: String },

    #[error("telegram API rejected request: {0}")]
    TelegramError(String),
}

pub type Result<T> = std::result::Result<T, PriceWatchError>;
