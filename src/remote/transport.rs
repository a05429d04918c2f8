use crate::foundation::error::UnderlayResult;
use crate::keys::pool::ApiKey;

/// Response from the background-removal upstream, reduced to the parts the
/// failover policy needs.
#[derive(Clone, Debug)]
pub struct UpstreamResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body; transparent PNG bytes on success.
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    /// 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 401 unauthorized or 402 payment/quota exceeded — the statuses that
    /// indicate the *credential* is the problem rather than the request.
    pub fn is_credential_failure(&self) -> bool {
        self.status == 401 || self.status == 402
    }
}

/// Wire transport to the background-removal upstream.
///
/// Implementations perform the actual HTTP call with the provided credential;
/// transport-level failures (connect, timeout) surface as errors, while any
/// HTTP response — success or not — comes back as an [`UpstreamResponse`] so
/// the failover policy can decide what to do with the status.
pub trait RemoveBgTransport {
    /// Submit `image` (encoded photo bytes) under `key`.
    fn submit(&self, key: &ApiKey, image: &[u8]) -> UnderlayResult<UpstreamResponse>;
}
