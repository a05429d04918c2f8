use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use crate::foundation::error::{UnderlayError, UnderlayResult};

/// Names of the environment entries the pool is seeded from at process start.
pub const KEY_ENV_NAMES: [&str; 5] = [
    "REMOVEBG_API_KEY_1",
    "REMOVEBG_API_KEY_2",
    "REMOVEBG_API_KEY_3",
    "REMOVEBG_API_KEY_4",
    "REMOVEBG_API_KEY_5",
];

/// How often previously-failed keys are allowed back into rotation. Upstream
/// rate limits are time-windowed, so a key that failed with a quota error is
/// usually usable again after this long.
pub const KEY_RESET_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// One credential for the rate-limited upstream service.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a secret string.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The secret value, for inserting into an outbound request header.
    pub fn secret(&self) -> &str {
        &self.0
    }
}

// Keys are secrets; never let them leak through debug formatting.
impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tail = self
            .0
            .get(self.0.len().saturating_sub(4)..)
            .unwrap_or_default();
        write!(f, "ApiKey(****{tail})")
    }
}

#[derive(Debug, Default)]
struct PoolState {
    current: usize,
    failed: HashSet<usize>,
}

/// Rotating pool of credentials for a rate-limited external service.
///
/// Constructed once at process start and shared by `Arc` with every request
/// handler; all mutation happens under a single mutex so two concurrent
/// failures cannot corrupt the rotation state.
#[derive(Debug)]
pub struct KeyPool {
    keys: Vec<ApiKey>,
    state: Mutex<PoolState>,
}

impl KeyPool {
    /// Build a pool from an ordered credential list.
    pub fn new(keys: Vec<ApiKey>) -> Self {
        Self {
            keys,
            state: Mutex::new(PoolState::default()),
        }
    }

    /// Seed the pool from the fixed list of named environment entries.
    ///
    /// Absent entries are filtered out, not treated as errors; an entirely
    /// empty pool only fails later, at first use.
    pub fn from_env() -> Self {
        let keys = KEY_ENV_NAMES
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .filter(|v| !v.is_empty())
            .map(ApiKey::new)
            .collect::<Vec<_>>();
        tracing::debug!(configured = keys.len(), "seeded key pool from environment");
        Self::new(keys)
    }

    /// Number of configured keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the pool was configured with no keys at all.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The credential requests should currently use.
    pub fn current_key(&self) -> UnderlayResult<ApiKey> {
        if self.keys.is_empty() {
            return Err(UnderlayError::NoKeysAvailable);
        }
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(self.keys[state.current].clone())
    }

    /// Record that `observed` failed with a credential error and advance to
    /// the next viable key.
    ///
    /// This is a compare-and-rotate: `observed` is only marked failed while it
    /// is still the current key, so two requests racing on the same stale key
    /// burn exactly one credential between them — the loser just picks up the
    /// replacement. The scan always selects the lowest-index unfailed key.
    /// Returns `None` when every key has failed within the current window.
    pub fn rotate(&self, observed: &ApiKey) -> Option<ApiKey> {
        if self.keys.is_empty() {
            return None;
        }
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        if self.keys[state.current] == *observed {
            let current = state.current;
            state.failed.insert(current);
        } else if !state.failed.contains(&state.current) {
            // Another request already rotated past `observed`; reuse its pick.
            return Some(self.keys[state.current].clone());
        }

        let next = (0..self.keys.len()).find(|i| !state.failed.contains(i))?;
        state.current = next;
        tracing::warn!(index = next, "rotated to next API key");
        Some(self.keys[next].clone())
    }

    /// Clear the failed set, allowing previously-failed keys back into
    /// rotation.
    pub fn reset_failed(&self) {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if !state.failed.is_empty() {
            tracing::debug!(cleared = state.failed.len(), "reset failed API keys");
        }
        state.failed.clear();
    }

    /// Spawn the recurring reset task, clearing the failed set every
    /// `interval` for as long as the pool (and the returned handle) live.
    pub fn start_reset_timer(self: &Arc<Self>, interval: Duration) -> UnderlayResult<KeyResetTimer> {
        let pool = Arc::downgrade(self);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = std::thread::Builder::new()
            .name("key-pool-reset".to_owned())
            .spawn(move || reset_loop(pool, interval, stop_flag))
            .map_err(|e| UnderlayError::Other(anyhow::anyhow!("spawn key reset thread: {e}")))?;
        Ok(KeyResetTimer {
            stop,
            handle: Some(handle),
        })
    }
}

fn reset_loop(pool: Weak<KeyPool>, interval: Duration, stop: Arc<AtomicBool>) {
    // Sleep in short slices so dropping the timer handle is prompt.
    let slice = Duration::from_millis(200).min(interval);
    let mut elapsed = Duration::ZERO;
    loop {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        std::thread::sleep(slice);
        elapsed += slice;
        if elapsed < interval {
            continue;
        }
        elapsed = Duration::ZERO;
        match pool.upgrade() {
            Some(pool) => pool.reset_failed(),
            None => return,
        }
    }
}

/// Guard for the recurring failed-key reset task; dropping it stops the
/// background thread.
#[derive(Debug)]
pub struct KeyResetTimer {
    stop: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl Drop for KeyResetTimer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/keys/pool.rs"]
mod tests;
