//! Human-like pauses.

use std::time::Duration;

use rand::Rng;

/// Random duration in `[min_ms, max_ms]`; `min_ms` when the range is empty.
pub(crate) fn jitter(min_ms: u64, max_ms: u64) -> Duration {
    let ms = if max_ms > min_ms {
        rand::thread_rng().gen_range(min_ms..=max_ms)
    } else {
        min_ms
    };
    Duration::from_millis(ms)
}

pub(crate) async fn pause_between(min_ms: u64, max_ms: u64) {
    let duration = jitter(min_ms, max_ms);
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_bounds() {
        for _ in 0..100 {
            let d = jitter(2000, 3000);
            assert!(d >= Duration::from_millis(2000) && d <= Duration::from_millis(3000));
        }
    }

    #[test]
    fn test_jitter_degenerate_range() {
        assert_eq!(jitter(500, 100), Duration::from_millis(500));
        assert_eq!(jitter(0, 0), Duration::ZERO);
    }
}
