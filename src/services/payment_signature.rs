use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the gateway's webhook signature: hex-encoded HMAC-SHA256 of the
/// raw request body under the shared webhook secret.
pub fn sign_payload(payload: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");

    mac.update(payload);

    hex::encode(mac.finalize().into_bytes())
}

/// Verify a webhook signature against the raw body. The comparison is
/// constant-time to prevent timing attacks.
pub fn verify_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    let expected = sign_payload(payload, secret);
    constant_time_eq(expected.as_bytes(), signature.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_hex_sha256() {
        let sig = sign_payload(b"{\"event\":\"payment_link.paid\"}", "secret_key");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_sign_is_deterministic() {
        let payload = b"{\"amount\":500}";
        assert_eq!(sign_payload(payload, "s"), sign_payload(payload, "s"));
    }

    #[test]
    fn test_different_secrets_differ() {
        let payload = b"{\"amount\":500}";
        assert_ne!(sign_payload(payload, "one"), sign_payload(payload, "two"));
    }

    #[test]
    fn test_verify_round_trip() {
        let payload = b"{\"event\":\"payment_link.paid\",\"id\":\"plink_1\"}";
        let secret = "webhook_secret_123";
        let sig = sign_payload(payload, secret);
        assert!(verify_signature(payload, &sig, secret));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let payload = b"{\"event\":\"test\"}";
        let sig = sign_payload(payload, "correct");
        assert!(!verify_signature(payload, &sig, "wrong"));
    }

    #[test]
    fn test_verify_rejects_tampered_payload() {
        let secret = "secret";
        let sig = sign_payload(b"{\"amount\":100}", secret);
        assert!(!verify_signature(b"{\"amount\":999}", &sig, secret));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(!verify_signature(b"{}", "not-a-signature", "secret"));
        assert!(!verify_signature(b"{}", "", "secret"));
    }
}
