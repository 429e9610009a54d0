use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Timestamp and signature sent as the `timestamp` and `sign` query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Milliseconds since the Unix epoch.
    pub timestamp: String,
    /// URL-encoded base64 HMAC, ready to splice into a query string.
    pub sign: String,
}

impl SignedRequest {
    pub fn new(timestamp_ms: i64, secret: &str) -> Self {
        let timestamp = timestamp_ms.to_string();
        let sign = sign(&timestamp, secret);
        Self { timestamp, sign }
    }

    pub fn query(&self) -> String {
        format!("timestamp={}&sign={}", self.timestamp, self.sign)
    }
}

/// `urlencode(base64(HMAC-SHA256(secret, "{timestamp}\n{secret}")))`.
pub fn sign(timestamp: &str, secret: &str) -> String {
    let string_to_sign = format!("{timestamp}\n{secret}");

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(string_to_sign.as_bytes());
    let digest = mac.finalize().into_bytes();

    urlencoding::encode(&STANDARD.encode(digest)).into_owned()
}
