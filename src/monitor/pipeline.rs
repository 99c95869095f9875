use std::time::{Duration, Instant};

use log::{info, warn};

use crate::api::binance::types::{decode_frame, Frame, TradeTick};
use crate::monitor::alerts::{AlertEngine, Evaluation};
use crate::monitor::cooldown::Cooldown;
use crate::monitor::notifier::{Alert, MessageSender, Notifier};

/// decode → evaluate → cool-down → notify, one frame at a time.
///
/// Owned by the single feed task, so the cool-down state needs no locking.
pub struct AlertPipeline<S> {
    engine: AlertEngine,
    cooldown: Option<Cooldown>,
    notifier: Notifier<S>,
}

impl<S: MessageSender> AlertPipeline<S> {
    pub fn new(engine: AlertEngine, cooldown: Option<Duration>, notifier: Notifier<S>) -> Self {
        Self {
            engine,
            cooldown: cooldown.map(Cooldown::new),
            notifier,
        }
    }

    /// Handles one text frame; returns the number of alerts emitted.
    /// Frames that fail to decode are logged and dropped.
    pub async fn handle_text(&mut self, text: &str, now: Instant) -> usize {
        match decode_frame(text) {
            Ok(Frame::Trade(tick)) => self.process_tick(&tick, now).await,
            Ok(Frame::Ack) | Ok(Frame::Ignored) => 0,
            Err(e) => {
                warn!("Skipping frame: {}", e);
                0
            }
        }
    }

    pub async fn process_tick(&mut self, tick: &TradeTick, now: Instant) -> usize {
        let mut emitted = 0;

        match self.engine.check_price(&tick.symbol, tick.price) {
            Evaluation::Untracked => {
                info!("[{}] Current price: ${:.2}", tick.symbol, tick.price);
            }
            Evaluation::Matched(targets) => {
                for target in targets {
                    if let Some(cooldown) = self.cooldown.as_mut() {
                        if !cooldown.try_acquire(&tick.symbol, now) {
                            continue;
                        }
                    }

                    let alert = Alert {
                        symbol: tick.symbol.clone(),
                        price: tick.price,
                        target,
                    };
                    self.notifier.broadcast(&alert).await;
                    info!(
                        "[ALERT] {} reached price ${}, near target ${}",
                        alert.symbol, alert.price, alert.target
                    );
                    emitted += 1;
                }
            }
        }

        if let Some(cooldown) = self.cooldown.as_mut() {
            if cooldown.expire(now) {
                log::debug!("Alert cool-down elapsed");
            }
        }

        emitted
    }
}
