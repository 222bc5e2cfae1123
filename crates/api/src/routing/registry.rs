//! In-memory token registry
//!
//! Maps tokens to the origin URLs they stand in for. Nothing is persisted:
//! every token is forgotten on restart and the player service re-registers.
//!
//! With the default [`RegistryPolicy`] entries are never removed, so memory
//! grows with every distinct URL registered for the lifetime of the process.
//! Deployments that register unbounded sets of URLs should set
//! `max_entries` (least-recently-used eviction) and/or `ttl`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Token → origin storage used by the request handlers
pub trait OriginStore: Send + Sync {
    /// Store a mapping, last write wins
    fn insert(&self, token: &str, origin_url: &str) -> InsertOutcome;

    /// Origin registered under `token`, if any
    fn lookup(&self, token: &str) -> Option<String>;

    /// Number of live entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What an insert did to the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// New token
    Inserted,
    /// Same token already mapped to the same origin
    Unchanged,
    /// Token collision: a different origin was overwritten
    Replaced { previous: String },
}

/// Capacity and expiry policy, both off by default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryPolicy {
    pub max_entries: Option<usize>,
    pub ttl: Option<Duration>,
}

struct Entry {
    origin_url: String,
    inserted_at: Instant,
    /// Milliseconds since the registry epoch, updated on every hit
    last_used: AtomicU64,
}

/// Thread-safe in-memory origin registry
pub struct OriginRegistry {
    entries: RwLock<HashMap<String, Entry>>,
    policy: RegistryPolicy,
    epoch: Instant,
}

impl Default for OriginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginRegistry {
    /// Create an unbounded registry with no expiry
    pub fn new() -> Self {
        Self::with_policy(RegistryPolicy::default())
    }

    pub fn with_policy(policy: RegistryPolicy) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            policy,
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        self.policy
            .ttl
            .is_some_and(|ttl| entry.inserted_at.elapsed() > ttl)
    }

    /// Remove expired entries, returning how many were dropped
    pub fn cleanup(&self) -> usize {
        if self.policy.ttl.is_none() {
            return 0;
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry));
        before - entries.len()
    }

    /// Make room for one more entry when a capacity is configured
    fn evict_for_insert(&self, entries: &mut HashMap<String, Entry>) {
        let Some(max_entries) = self.policy.max_entries else {
            return;
        };
        if entries.len() < max_entries {
            return;
        }

        entries.retain(|_, entry| !self.is_expired(entry));

        while entries.len() >= max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used.load(Ordering::Relaxed))
                .map(|(token, _)| token.clone());
            match oldest {
                Some(token) => {
                    entries.remove(&token);
                    tracing::debug!(token = %token, "Evicted least recently used origin");
                }
                None => break,
            }
        }
    }
}

impl OriginStore for OriginRegistry {
    fn insert(&self, token: &str, origin_url: &str) -> InsertOutcome {
        let now_ms = self.now_ms();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = entries.get_mut(token) {
            let expired = self.is_expired(existing);
            existing.inserted_at = Instant::now();
            existing.last_used.store(now_ms, Ordering::Relaxed);

            if existing.origin_url == origin_url {
                return InsertOutcome::Unchanged;
            }

            let previous = std::mem::replace(&mut existing.origin_url, origin_url.to_string());
            if expired {
                return InsertOutcome::Inserted;
            }
            tracing::warn!(
                token = %token,
                "Token collision: registration replaced a different origin"
            );
            return InsertOutcome::Replaced { previous };
        }

        self.evict_for_insert(&mut entries);
        entries.insert(
            token.to_string(),
            Entry {
                origin_url: origin_url.to_string(),
                inserted_at: Instant::now(),
                last_used: AtomicU64::new(now_ms),
            },
        );
        InsertOutcome::Inserted
    }

    fn lookup(&self, token: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(token)?;

        if self.is_expired(entry) {
            return None;
        }

        entry.last_used.store(self.now_ms(), Ordering::Relaxed);
        Some(entry.origin_url.clone())
    }

    fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        if self.policy.ttl.is_none() {
            return entries.len();
        }
        entries.values().filter(|entry| !self.is_expired(entry)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread::{self, sleep};

    #[test]
    fn test_registry_insert_lookup() {
        let registry = OriginRegistry::new();

        // Initially empty
        assert!(registry.is_empty());
        assert!(registry.lookup("0123456789abcdef").is_none());

        // Insert and lookup
        let outcome = registry.insert("0123456789abcdef", "https://cdn.example/v.mp4");
        assert_eq!(outcome, InsertOutcome::Inserted);
        assert_eq!(
            registry.lookup("0123456789abcdef").as_deref(),
            Some("https://cdn.example/v.mp4")
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_insert_is_idempotent() {
        let registry = OriginRegistry::new();

        registry.insert("tok", "https://cdn.example/v.mp4");
        let outcome = registry.insert("tok", "https://cdn.example/v.mp4");

        assert_eq!(outcome, InsertOutcome::Unchanged);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_last_write_wins_on_collision() {
        let registry = OriginRegistry::new();

        registry.insert("tok", "https://cdn.example/first.mp4");
        let outcome = registry.insert("tok", "https://cdn.example/second.mp4");

        assert_eq!(
            outcome,
            InsertOutcome::Replaced {
                previous: "https://cdn.example/first.mp4".to_string()
            }
        );
        assert_eq!(
            registry.lookup("tok").as_deref(),
            Some("https://cdn.example/second.mp4")
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_unbounded_by_default() {
        let registry = OriginRegistry::new();
        for i in 0..1000 {
            registry.insert(&format!("tok{i}"), &format!("https://cdn.example/{i}.mp4"));
        }
        assert_eq!(registry.len(), 1000);
        assert_eq!(
            registry.lookup("tok0").as_deref(),
            Some("https://cdn.example/0.mp4")
        );
    }

    #[test]
    fn test_registry_expiration() {
        let registry = OriginRegistry::with_policy(RegistryPolicy {
            max_entries: None,
            ttl: Some(Duration::from_millis(50)),
        });

        registry.insert("tok", "https://cdn.example/v.mp4");
        assert!(registry.lookup("tok").is_some());

        // Wait for expiration
        sleep(Duration::from_millis(60));
        assert!(registry.lookup("tok").is_none());
        assert_eq!(registry.len(), 0);

        assert_eq!(registry.cleanup(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_reinsert_refreshes_ttl() {
        let registry = OriginRegistry::with_policy(RegistryPolicy {
            max_entries: None,
            ttl: Some(Duration::from_millis(80)),
        });

        registry.insert("tok", "https://cdn.example/v.mp4");
        sleep(Duration::from_millis(50));
        registry.insert("tok", "https://cdn.example/v.mp4");
        sleep(Duration::from_millis(50));

        assert!(registry.lookup("tok").is_some());
    }

    #[test]
    fn test_registry_expired_token_reused_is_not_collision() {
        let registry = OriginRegistry::with_policy(RegistryPolicy {
            max_entries: None,
            ttl: Some(Duration::from_millis(20)),
        });

        registry.insert("tok", "https://cdn.example/old.mp4");
        sleep(Duration::from_millis(30));
        let outcome = registry.insert("tok", "https://cdn.example/new.mp4");

        assert_eq!(outcome, InsertOutcome::Inserted);
        assert_eq!(
            registry.lookup("tok").as_deref(),
            Some("https://cdn.example/new.mp4")
        );
    }

    #[test]
    fn test_registry_lru_eviction() {
        let registry = OriginRegistry::with_policy(RegistryPolicy {
            max_entries: Some(2),
            ttl: None,
        });

        registry.insert("a", "https://cdn.example/a.mp4");
        sleep(Duration::from_millis(5));
        registry.insert("b", "https://cdn.example/b.mp4");
        sleep(Duration::from_millis(5));

        // Touch "a" so "b" becomes least recently used
        assert!(registry.lookup("a").is_some());
        sleep(Duration::from_millis(5));

        registry.insert("c", "https://cdn.example/c.mp4");

        assert_eq!(registry.len(), 2);
        assert!(registry.lookup("a").is_some());
        assert!(registry.lookup("b").is_none());
        assert!(registry.lookup("c").is_some());
    }

    #[test]
    fn test_registry_cleanup_without_ttl_is_noop() {
        let registry = OriginRegistry::new();
        registry.insert("tok", "https://cdn.example/v.mp4");
        assert_eq!(registry.cleanup(), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_concurrent_inserts() {
        let registry = Arc::new(OriginRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for i in 0..100 {
                        let token = format!("{t}-{i}");
                        registry.insert(&token, &format!("https://cdn.example/{token}.mp4"));
                        assert!(registry.lookup(&token).is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 800);
        assert_eq!(
            registry.lookup("3-42").as_deref(),
            Some("https://cdn.example/3-42.mp4")
        );
    }
}
