use std::sync::Arc;

use crate::foundation::error::{UnderlayError, UnderlayResult};
use crate::keys::pool::KeyPool;
use crate::remote::transport::RemoveBgTransport;

/// Filename template for the plain cutout download.
pub const CUTOUT_FILENAME: &str = "removed-background.png";

/// Rough device class used to pick a background-removal backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceClass {
    /// Touch device with a small screen.
    Mobile,
    /// Everything else.
    Desktop,
}

impl DeviceClass {
    /// Classify from the capability check the shell performs: touch support
    /// plus a narrow viewport means mobile.
    pub fn detect(has_touch: bool, viewport_width_px: u32) -> Self {
        if has_touch && viewport_width_px <= 768 {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }

    /// Whether this device should run the in-browser inference model instead
    /// of calling the proxied HTTP API. Desktop machines can afford the local
    /// model; mobile devices go through the proxy.
    pub fn prefers_local_inference(self) -> bool {
        matches!(self, Self::Desktop)
    }
}

/// Background-removal collaborator: photo bytes in, transparent PNG out.
pub trait BackgroundRemoval {
    /// Remove the background from `image` (encoded photo bytes).
    fn remove_background(&self, image: &[u8]) -> UnderlayResult<Vec<u8>>;
}

/// Proxy implementation of [`BackgroundRemoval`] over a rate-limited HTTP
/// upstream, with credential failover.
///
/// Policy: a 401/402 response marks the credential failed and the same
/// request is retried with the next viable key; any other non-success status
/// fails immediately without burning a rotation. The retry loop is bounded by
/// the pool size — each failed key is excluded from selection within the
/// failure window, so exhaustion is reached in at most `pool.len()` attempts.
pub struct ProxyBackgroundRemoval<T> {
    pool: Arc<KeyPool>,
    transport: T,
}

impl<T: RemoveBgTransport> ProxyBackgroundRemoval<T> {
    /// Build a proxy over the shared key pool and an injected transport.
    pub fn new(pool: Arc<KeyPool>, transport: T) -> Self {
        Self { pool, transport }
    }
}

impl<T: RemoveBgTransport> BackgroundRemoval for ProxyBackgroundRemoval<T> {
    #[tracing::instrument(skip(self, image), fields(bytes = image.len()))]
    fn remove_background(&self, image: &[u8]) -> UnderlayResult<Vec<u8>> {
        if image.is_empty() {
            return Err(UnderlayError::validation("no image data provided"));
        }

        let mut key = self.pool.current_key()?;
        for attempt in 0..self.pool.len() {
            let response = self.transport.submit(&key, image)?;

            if response.is_success() {
                return Ok(response.body);
            }
            if !response.is_credential_failure() {
                return Err(UnderlayError::upstream(
                    response.status,
                    "background removal upstream rejected the request",
                ));
            }

            tracing::warn!(attempt, status = response.status, "credential failed, rotating");
            match self.pool.rotate(&key) {
                Some(next) => key = next,
                None => return Err(UnderlayError::KeysExhausted),
            }
        }
        Err(UnderlayError::KeysExhausted)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/remote/removebg.rs"]
mod tests;
