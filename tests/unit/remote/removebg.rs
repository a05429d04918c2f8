use super::*;
use crate::keys::pool::ApiKey;
use crate::remote::transport::UpstreamResponse;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Transport returning a scripted status per key secret.
struct ScriptedTransport {
    statuses: Vec<(&'static str, u16)>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn new(statuses: Vec<(&'static str, u16)>) -> Self {
        Self {
            statuses,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl RemoveBgTransport for ScriptedTransport {
    fn submit(&self, key: &ApiKey, _image: &[u8]) -> UnderlayResult<UpstreamResponse> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.seen.lock().unwrap().push(key.secret().to_owned());
        let status = self
            .statuses
            .iter()
            .find(|(secret, _)| *secret == key.secret())
            .map(|(_, status)| *status)
            .unwrap_or(500);
        Ok(UpstreamResponse {
            status,
            body: if (200..300).contains(&status) {
                b"png-bytes".to_vec()
            } else {
                Vec::new()
            },
        })
    }
}

fn pool(keys: &[&str]) -> Arc<KeyPool> {
    Arc::new(KeyPool::new(keys.iter().map(|k| ApiKey::new(*k)).collect()))
}

#[test]
fn quota_failure_rotates_once_then_succeeds() {
    let pool = pool(&["k1", "k2"]);
    let transport = ScriptedTransport::new(vec![("k1", 402), ("k2", 200)]);
    let proxy = ProxyBackgroundRemoval::new(Arc::clone(&pool), transport);

    let out = proxy.remove_background(b"photo").unwrap();
    assert_eq!(out, b"png-bytes");

    // Exactly one rotation happened: k1 then k2, and the pool now points at k2.
    assert_eq!(
        *proxy.transport.seen.lock().unwrap(),
        vec!["k1".to_owned(), "k2".to_owned()]
    );
    assert_eq!(pool.current_key().unwrap().secret(), "k2");
}

#[test]
fn unauthorized_is_treated_like_quota() {
    let pool = pool(&["k1", "k2"]);
    let transport = ScriptedTransport::new(vec![("k1", 401), ("k2", 200)]);
    let proxy = ProxyBackgroundRemoval::new(pool, transport);
    assert!(proxy.remove_background(b"photo").is_ok());
}

#[test]
fn non_credential_errors_fail_immediately_without_rotating() {
    let pool = pool(&["k1", "k2"]);
    let transport = ScriptedTransport::new(vec![("k1", 500)]);
    let proxy = ProxyBackgroundRemoval::new(Arc::clone(&pool), transport);

    let err = proxy.remove_background(b"photo").unwrap_err();
    assert!(matches!(err, UnderlayError::Upstream { status: 500, .. }));
    assert_eq!(proxy.transport.calls.load(Ordering::Relaxed), 1);
    assert_eq!(pool.current_key().unwrap().secret(), "k1");
}

#[test]
fn exhaustion_is_terminal_and_bounded_by_pool_size() {
    let pool = pool(&["k1", "k2", "k3"]);
    let transport = ScriptedTransport::new(vec![("k1", 402), ("k2", 402), ("k3", 402)]);
    let proxy = ProxyBackgroundRemoval::new(pool, transport);

    let err = proxy.remove_background(b"photo").unwrap_err();
    assert!(matches!(err, UnderlayError::KeysExhausted));
    assert_eq!(proxy.transport.calls.load(Ordering::Relaxed), 3);
}

#[test]
fn empty_input_is_rejected_before_any_call() {
    let pool = pool(&["k1"]);
    let transport = ScriptedTransport::new(vec![("k1", 200)]);
    let proxy = ProxyBackgroundRemoval::new(pool, transport);

    assert!(matches!(
        proxy.remove_background(b""),
        Err(UnderlayError::Validation(_))
    ));
    assert_eq!(proxy.transport.calls.load(Ordering::Relaxed), 0);
}

#[test]
fn empty_pool_surfaces_no_keys_available() {
    let pool = pool(&[]);
    let transport = ScriptedTransport::new(Vec::new());
    let proxy = ProxyBackgroundRemoval::new(pool, transport);
    assert!(matches!(
        proxy.remove_background(b"photo"),
        Err(UnderlayError::NoKeysAvailable)
    ));
}

#[test]
fn device_class_detection_requires_touch_and_narrow_viewport() {
    assert_eq!(DeviceClass::detect(true, 390), DeviceClass::Mobile);
    assert_eq!(DeviceClass::detect(true, 1280), DeviceClass::Desktop);
    assert_eq!(DeviceClass::detect(false, 390), DeviceClass::Desktop);

    assert!(DeviceClass::Desktop.prefers_local_inference());
    assert!(!DeviceClass::Mobile.prefers_local_inference());
}
