use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use actix_web::HttpRequest;
use dashmap::DashMap;
use parking_lot::Mutex;

/// Sliding window counter: the previous window's count is weighted by how
/// much of it still overlaps the current one.
#[derive(Debug)]
struct SlidingWindow {
    window_size: Duration,
    limit: u64,
    current_window_start: Instant,
    current_count: u64,
    prev_count: u64,
    last_seen: Instant,
}

impl SlidingWindow {
    fn new(window_size: Duration, limit: u64, now: Instant) -> Self {
        Self {
            window_size,
            limit,
            current_window_start: now,
            current_count: 0,
            prev_count: 0,
            last_seen: now,
        }
    }

    /// Returns `Ok(())` when the hit is admitted, or the seconds to wait.
    fn hit(&mut self, now: Instant) -> Result<(), u64> {
        self.last_seen = now;
        let mut elapsed = now.duration_since(self.current_window_start);

        if elapsed >= self.window_size {
            // More than two windows idle means nothing carries over
            self.prev_count = if elapsed >= self.window_size * 2 { 0 } else { self.current_count };
            self.current_count = 0;
            self.current_window_start = now;
            elapsed = Duration::ZERO;
        }

        let weight = elapsed.as_secs_f64() / self.window_size.as_secs_f64();
        let effective = (self.prev_count as f64) * (1.0 - weight) + (self.current_count as f64);

        if effective < self.limit as f64 {
            self.current_count += 1;
            Ok(())
        } else {
            let retry_after = self.window_size.saturating_sub(elapsed).as_secs().max(1);
            Err(retry_after)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

/// Per-key sliding window limiter. Idle keys are removed by `evict_idle`.
#[derive(Clone)]
pub struct SlidingWindowLimiter {
    windows: Arc<DashMap<String, Arc<Mutex<SlidingWindow>>>>,
    window_size: Duration,
    limit: u64,
}

impl SlidingWindowLimiter {
    pub fn new(limit: u64, window_size: Duration) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            window_size,
            limit,
        }
    }

    pub fn check(&self, key: &str) -> RateDecision {
        let now = Instant::now();
        let window = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SlidingWindow::new(self.window_size, self.limit, now))))
            .clone();

        let mut window = window.lock();
        match window.hit(now) {
            Ok(()) => RateDecision::Allowed,
            Err(retry_after_secs) => RateDecision::Limited { retry_after_secs },
        }
    }

    /// Removes keys not seen for two full windows; returns how many.
    pub fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let ttl = self.window_size * 2;
        let before = self.windows.len();
        self.windows
            .retain(|_, window| now.duration_since(window.lock().last_seen) <= ttl);
        before - self.windows.len()
    }
}

/// Client address used as the limiter key. `X-Forwarded-For` is honoured
/// only when the service sits behind a trusted proxy.
pub fn client_key(req: &HttpRequest, trust_x_forwarded_for: bool) -> String {
    if trust_x_forwarded_for {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());

        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_limit_then_blocks() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(60));

        assert_eq!(limiter.check("1.2.3.4"), RateDecision::Allowed);
        assert_eq!(limiter.check("1.2.3.4"), RateDecision::Allowed);
        assert!(matches!(limiter.check("1.2.3.4"), RateDecision::Limited { .. }));
        assert_eq!(limiter.check("5.6.7.8"), RateDecision::Allowed);
    }

    #[test]
    fn window_rolls_over() {
        let start = Instant::now();
        let mut window = SlidingWindow::new(Duration::from_secs(10), 1, start);

        assert!(window.hit(start).is_ok());
        assert!(window.hit(start + Duration::from_secs(1)).is_err());
        assert!(window.hit(start + Duration::from_secs(25)).is_ok());
    }
}
