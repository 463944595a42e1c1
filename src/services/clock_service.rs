use chrono::{DateTime, Duration, Utc};

/// Wall-clock countdown for one session. Remaining time is always
/// recomputed from the submission's start instant, so a reload or a
/// paused client never stretches the budget.
#[derive(Debug)]
pub struct Countdown {
    start_time: DateTime<Utc>,
    duration: Duration,
    fired: bool,
}

impl Countdown {
    pub fn new(start_time: DateTime<Utc>, duration_minutes: i32) -> Self {
        Self {
            start_time,
            duration: Duration::minutes(duration_minutes as i64),
            fired: false,
        }
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.start_time + self.duration
    }

    /// Remaining seconds, floored at zero.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.deadline() - now).num_seconds().max(0)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline()
    }

    /// One-shot auto-submit signal: true on the first call at or past the
    /// deadline, false on every later zero-crossing.
    pub fn poll_auto_submit(&mut self, now: DateTime<Utc>) -> bool {
        if self.fired || !self.is_expired(now) {
            return false;
        }
        self.fired = true;
        true
    }

    /// Re-arm after a failed finalization so the signal is delivered
    /// again on the next tick.
    pub fn rearm(&mut self) {
        self.fired = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_never_goes_negative() {
        let start = Utc::now();
        let clock = Countdown::new(start, 1);
        assert_eq!(clock.remaining_seconds(start), 60);
        assert_eq!(clock.remaining_seconds(start + Duration::seconds(59)), 1);
        assert_eq!(clock.remaining_seconds(start + Duration::seconds(60)), 0);
        assert_eq!(clock.remaining_seconds(start + Duration::seconds(3600)), 0);
    }

    #[test]
    fn auto_submit_fires_exactly_once() {
        let start = Utc::now();
        let mut clock = Countdown::new(start, 2);

        assert!(!clock.poll_auto_submit(start + Duration::seconds(119)));
        // one second past the deadline: the signal has fired exactly once
        assert!(clock.poll_auto_submit(start + Duration::seconds(121)));
        assert!(!clock.poll_auto_submit(start + Duration::seconds(122)));
        assert!(!clock.poll_auto_submit(start + Duration::seconds(600)));
    }

    #[test]
    fn rearm_allows_redelivery() {
        let start = Utc::now();
        let mut clock = Countdown::new(start, 0);
        assert!(clock.poll_auto_submit(start));
        assert!(!clock.poll_auto_submit(start));
        clock.rearm();
        assert!(clock.poll_auto_submit(start));
    }
}
