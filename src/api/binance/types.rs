use serde::{Deserialize, Serialize};

use crate::error::{PriceWatchError, Result};

pub const TRADE_EVENT: &str = "trade";

/// Raw `<symbol>@trade` event as sent by the feed.
///
/// Every field defaults so that non-trade frames (subscription acks and the
/// like) still decode and are filtered by [`TradeEvent::is_trade`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TradeEvent {
    #[serde(rename = "e", default)]
    pub event_type: String,
    #[serde(rename = "E", default)]
    pub event_time: i64,
    #[serde(rename = "s", default)]
    pub symbol: String,
    #[serde(rename = "t", default)]
    pub trade_id: i64,
    #[serde(rename = "p", default)]
    pub price: String,
    #[serde(rename = "q", default)]
    pub quantity: String,
    #[serde(rename = "T", default)]
    pub trade_time: i64,
    #[serde(rename = "m", default)]
    pub is_market_maker: bool,
    #[serde(rename = "M", default)]
    pub ignore: bool,
}

impl TradeEvent {
    pub fn is_trade(&self) -> bool {
        self.event_type.trim() == TRADE_EVENT
    }
}

/// Reply to a `SUBSCRIBE` request: `{"result":null,"id":"..."}`.
#[derive(Debug, Deserialize)]
pub struct SubscriptionAck {
    pub result: Option<serde_json::Value>,
    pub id: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct SubscribeRequest {
    pub method: &'static str,
    pub params: Vec<String>,
    pub id: String,
}

impl SubscribeRequest {
    pub fn new(streams: Vec<String>) -> Self {
        Self {
            method: "SUBSCRIBE",
            params: streams,
            id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// A trade event with its price converted to a number.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeTick {
    pub symbol: String,
    pub price: f64,
    pub quantity: String,
    pub trade_id: i64,
    pub event_time: i64,
    pub trade_time: i64,
    pub is_market_maker: bool,
    pub event_type: String,
}

impl TryFrom<TradeEvent> for TradeTick {
    type Error = PriceWatchError;

    fn try_from(event: TradeEvent) -> Result<Self> {
        let price = match event.price.trim().parse::<f64>() {
            Ok(p) if p.is_finite() && p >= 0.0 => p,
            _ => {
                return Err(PriceWatchError::InvalidPrice {
                    symbol: event.symbol,
                    raw: event.price,
                })
            }
        };

        Ok(Self {
            symbol: event.symbol,
            price,
            quantity: event.quantity,
            trade_id: event.trade_id,
            event_time: event.event_time,
            trade_time: event.trade_time,
            is_market_maker: event.is_market_maker,
            event_type: event.event_type.trim().to_string(),
        })
    }
}

/// What a single text frame turned out to be.
#[derive(Debug, PartialEq)]
pub enum Frame {
    Trade(TradeTick),
    Ack,
    Ignored,
}

/// Decodes one text frame. Structural JSON errors and unparseable prices
/// are returned as errors for the caller to log; nothing here is fatal.
pub fn decode_frame(text: &str) -> Result<Frame> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    if value.get("e").is_none() && value.get("id").is_some() && value.get("result").is_some() {
        let ack: SubscriptionAck = serde_json::from_value(value)?;
        log::debug!("Subscription acknowledged (id {}, result {:?})", ack.id, ack.result);
        return Ok(Frame::Ack);
    }

    let event: TradeEvent = serde_json::from_value(value)?;
    if !event.is_trade() {
        return Ok(Frame::Ignored);
    }

    Ok(Frame::Trade(TradeTick::try_from(event)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOL_TRADE: &str = r#"{"e":"trade","E":1,"s":"SOLUSDT","t":7,"p":"205.00","q":"1.5","T":2,"m":false,"M":true}"#;

    #[test]
    fn decodes_trade_frame() {
        let Frame::Trade(tick) = decode_frame(SOL_TRADE).unwrap() else {
            panic!("expected a trade frame");
        };
        assert_eq!(tick.symbol, "SOLUSDT");
        assert_eq!(tick.price, 205.0);
        assert_eq!(tick.quantity, "1.5");
        assert_eq!(tick.trade_id, 7);
        assert_eq!(tick.event_time, 1);
        assert_eq!(tick.trade_time, 2);
        assert!(!tick.is_market_maker);
    }

    #[test]
    fn event_type_is_trimmed() {
        let text = r#"{"e":"  trade ","s":"SOLUSDT","p":"1.0"}"#;
        assert!(matches!(decode_frame(text).unwrap(), Frame::Trade(_)));
    }

    #[test]
    fn other_events_are_ignored() {
        let text = r#"{"e":"aggTrade","s":"SOLUSDT","p":"1.0"}"#;
        assert_eq!(decode_frame(text).unwrap(), Frame::Ignored);
    }

    #[test]
    fn subscription_ack_is_recognized() {
        let text = r#"{"result":null,"id":"1b4e28ba-2fa1-11d2-883f-0016d3cca427"}"#;
        assert_eq!(decode_frame(text).unwrap(), Frame::Ack);
    }

    #[test]
    fn bad_price_is_an_error() {
        for price in ["abc", "", "NaN", "inf", "-1.0"] {
            let text = format!(r#"{{"e":"trade","s":"SOLUSDT","p":"{}"}}"#, price);
            assert!(
                matches!(decode_frame(&text), Err(PriceWatchError::InvalidPrice { .. })),
                "price {:?} should be rejected",
                price
            );
        }
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            decode_frame("{not json"),
            Err(PriceWatchError::JsonError(_))
        ));
        assert!(matches!(
            decode_frame(r#"{"e":"trade","p":12}"#),
            Err(PriceWatchError::JsonError(_))
        ));
    }

    #[test]
    fn subscribe_request_shape() {
        let req = SubscribeRequest::new(vec!["solusdt@trade".to_string()]);
        let json: serde_json::Value = serde_json::to_value(&req).unwrap();
        assert_eq!(json["method"], "SUBSCRIBE");
        assert_eq!(json["params"], serde_json::json!(["solusdt@trade"]));
        assert!(uuid::Uuid::parse_str(json["id"].as_str().unwrap()).is_ok());
    }
}
