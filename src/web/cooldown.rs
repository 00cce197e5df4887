use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Minimum spacing between manual Slack posts, keyed by session subject.
///
/// Best-effort and in-memory only: it keeps one session from double-posting
/// the digest, it is not an access control. Restarting the server forgets it.
#[derive(Debug)]
pub struct PostCooldown {
    interval: Duration,
    last_post: Mutex<HashMap<String, Instant>>,
}

impl PostCooldown {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_post: Mutex::new(HashMap::new()),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Claim the post slot for `key`.
    ///
    /// On success returns the reservation, to be passed to [`release`](Self::release)
    /// if the post does not go through. Otherwise returns the time left.
    pub fn try_begin(&self, key: &str) -> Result<Instant, Duration> {
        self.try_begin_at(key, Instant::now())
    }

    pub fn try_begin_at(&self, key: &str, now: Instant) -> Result<Instant, Duration> {
        let mut last_post = self.last_post.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(last) = last_post.get(key) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < self.interval {
                return Err(self.interval - elapsed);
            }
        }

        // Entries past their interval carry no information
        last_post.retain(|_, last| now.saturating_duration_since(*last) < self.interval);
        last_post.insert(key.to_string(), now);
        Ok(now)
    }

    /// Give back a slot claimed by [`try_begin`](Self::try_begin) after a failed post
    pub fn release(&self, key: &str, reservation: Instant) {
        let mut last_post = self.last_post.lock().unwrap_or_else(|e| e.into_inner());
        if last_post.get(key) == Some(&reservation) {
            last_post.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_window() {
        let cooldown = PostCooldown::new(Duration::from_secs(5));
        let start = Instant::now();

        assert_eq!(cooldown.try_begin_at("alice", start), Ok(start));
        assert_eq!(
            cooldown.try_begin_at("alice", start + Duration::from_secs(2)),
            Err(Duration::from_secs(3))
        );

        let later = start + Duration::from_secs(5);
        assert_eq!(cooldown.try_begin_at("alice", later), Ok(later));
    }

    #[test]
    fn test_cooldown_is_per_key() {
        let cooldown = PostCooldown::new(Duration::from_secs(5));
        let start = Instant::now();

        assert!(cooldown.try_begin_at("alice", start).is_ok());
        assert!(cooldown.try_begin_at("bob", start).is_ok());
    }

    #[test]
    fn test_release_frees_the_slot() {
        let cooldown = PostCooldown::new(Duration::from_secs(5));
        let start = Instant::now();

        let reservation = cooldown.try_begin_at("alice", start).unwrap();
        cooldown.release("alice", reservation);
        assert!(cooldown.try_begin_at("alice", start + Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_stale_release_keeps_newer_reservation() {
        let cooldown = PostCooldown::new(Duration::from_secs(5));
        let start = Instant::now();

        let old = cooldown.try_begin_at("alice", start).unwrap();
        let newer = start + Duration::from_secs(6);
        cooldown.try_begin_at("alice", newer).unwrap();

        cooldown.release("alice", old);
        assert!(cooldown.try_begin_at("alice", newer + Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_zero_interval_never_blocks() {
        let cooldown = PostCooldown::new(Duration::ZERO);
        let start = Instant::now();
        assert!(cooldown.try_begin_at("alice", start).is_ok());
        assert!(cooldown.try_begin_at("alice", start).is_ok());
    }

    #[test]
    fn test_concurrent_claims_admit_one() {
        let cooldown = std::sync::Arc::new(PostCooldown::new(Duration::from_secs(5)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cooldown = cooldown.clone();
                std::thread::spawn(move || cooldown.try_begin("alice").is_ok())
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(admitted, 1);
    }
}
