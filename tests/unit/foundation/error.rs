use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        UnderlayError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(UnderlayError::load("x").to_string().contains("load error:"));
    assert!(
        UnderlayError::encoding("x")
            .to_string()
            .contains("encoding error:")
    );
    assert!(
        UnderlayError::upstream(429, "slow down")
            .to_string()
            .contains("status 429")
    );
}

#[test]
fn credential_failure_covers_401_and_402_only() {
    assert!(UnderlayError::upstream(401, "bad key").is_credential_failure());
    assert!(UnderlayError::upstream(402, "quota").is_credential_failure());
    assert!(!UnderlayError::upstream(500, "boom").is_credential_failure());
    assert!(!UnderlayError::KeysExhausted.is_credential_failure());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = UnderlayError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
