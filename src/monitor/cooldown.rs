use std::time::{Duration, Instant};

/// Process-wide alert suppression: one deadline and the symbol that armed it.
///
/// While the window is open, further alerts for the same symbol are withheld,
/// regardless of which target they matched. An alert for any other symbol is
/// let through and re-arms the window for that symbol.
#[derive(Debug, Clone)]
pub struct Cooldown {
    window: Duration,
    suppressed_until: Option<Instant>,
    last_symbol: Option<String>,
}

impl Cooldown {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            suppressed_until: None,
            last_symbol: None,
        }
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.suppressed_until.is_some_and(|deadline| now < deadline)
    }

    pub fn last_symbol(&self) -> Option<&str> {
        self.last_symbol.as_deref()
    }

    /// Returns `true` if an alert for `symbol` may go out now, arming the window.
    pub fn try_acquire(&mut self, symbol: &str, now: Instant) -> bool {
        let same_symbol = self.last_symbol.as_deref() == Some(symbol);
        if self.is_active(now) && same_symbol {
            return false;
        }

        self.suppressed_until = Some(now + self.window);
        self.last_symbol = Some(symbol.to_string());
        true
    }

    /// Clears an elapsed window. Returns `true` if one was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.suppressed_until {
            Some(deadline) if now >= deadline => {
                self.suppressed_until = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn repeat_for_same_symbol_is_suppressed_until_window_ends() {
        let t0 = Instant::now();
        let mut cooldown = Cooldown::new(MINUTE);

        assert!(cooldown.try_acquire("SOLUSDT", t0));
        assert!(!cooldown.try_acquire("SOLUSDT", t0 + Duration::from_secs(1)));
        assert!(!cooldown.try_acquire("SOLUSDT", t0 + Duration::from_secs(59)));
        assert!(cooldown.try_acquire("SOLUSDT", t0 + MINUTE));
    }

    #[test]
    fn other_symbol_passes_and_rearms() {
        let t0 = Instant::now();
        let mut cooldown = Cooldown::new(MINUTE);

        assert!(cooldown.try_acquire("SOLUSDT", t0));
        assert!(cooldown.try_acquire("LINKUSDT", t0 + Duration::from_secs(5)));
        assert_eq!(cooldown.last_symbol(), Some("LINKUSDT"));
        // SOLUSDT is no longer the suppressed symbol, so it fires again
        assert!(cooldown.try_acquire("SOLUSDT", t0 + Duration::from_secs(6)));
        assert!(!cooldown.try_acquire("SOLUSDT", t0 + Duration::from_secs(7)));
    }

    #[test]
    fn expire_clears_only_after_deadline() {
        let t0 = Instant::now();
        let mut cooldown = Cooldown::new(MINUTE);

        assert!(!cooldown.expire(t0));
        cooldown.try_acquire("SOLUSDT", t0);
        assert!(!cooldown.expire(t0 + Duration::from_secs(30)));
        assert!(cooldown.is_active(t0 + Duration::from_secs(30)));
        assert!(cooldown.expire(t0 + MINUTE));
        assert!(!cooldown.is_active(t0 + MINUTE));
        assert!(cooldown.try_acquire("SOLUSDT", t0 + MINUTE));
    }
}
