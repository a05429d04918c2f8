use super::*;

#[test]
fn mul_div255_endpoints() {
    assert_eq!(mul_div255_u8(0, 255), 0);
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(255, 0), 0);
}

#[test]
fn mul_div255_rounds_to_nearest() {
    // 128 * 128 / 255 = 64.25 -> 64
    assert_eq!(mul_div255_u8(128, 128), 64);
}
