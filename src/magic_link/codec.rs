use std::sync::Arc;

use base64::{engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD}, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;

use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, MagicLinkConfig};

use super::validation::ValidationError;

type HmacSha256 = Hmac<Sha256>;

const SECONDS_PER_HOUR: i64 = 3600;

/// Decoded magic-link token contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    #[serde(rename = "e")]
    pub email: String,
    #[serde(rename = "x")]
    pub expires_at: i64,
    #[serde(rename = "s")]
    pub signature: String,
}

/// Stateless signer/verifier for magic-link tokens.
///
/// A token is `base64url(json({"e": email, "x": expires_at, "s": mac}))`
/// without padding, where `mac` is hex HMAC-SHA256 keyed by the salt over
/// `email + "." + expires_at`. Nothing is stored server side, so rotating the
/// salt invalidates every outstanding link.
///
/// Decode results are returned by value; one instance can be shared across
/// concurrent requests.
pub struct MagicLinkCodec {
    salt: String,
    expire_hours: u32,
    clock: Arc<dyn Clock>,
}

impl MagicLinkCodec {
    pub fn new(config: &MagicLinkConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        if config.salt.is_empty() {
            return Err(ConfigError::MissingSalt);
        }

        let expire_hours = match config.expire_hours {
            Some(hours) if hours > 0 => hours,
            _ => return Err(ConfigError::MissingExpireHours),
        };

        Ok(Self {
            salt: config.salt.clone(),
            expire_hours,
            clock,
        })
    }

    /// Build a codec reading the wall clock
    pub fn from_config(config: &MagicLinkConfig) -> Result<Self, ConfigError> {
        Self::new(config, Arc::new(SystemClock))
    }

    pub fn expire_hours(&self) -> u32 {
        self.expire_hours
    }

    /// Issue a token for `email` valid for `hours` (or the configured default)
    pub fn encode(&self, email: &str, hours: Option<u32>) -> String {
        self.encode_with_expiry(email, hours).0
    }

    /// [`encode`](Self::encode), also returning the expiry it signed
    pub fn encode_with_expiry(&self, email: &str, hours: Option<u32>) -> (String, i64) {
        let hours = hours.unwrap_or(self.expire_hours);
        let expires_at = self.clock.now() + i64::from(hours) * SECONDS_PER_HOUR;

        let payload = TokenPayload {
            email: email.to_string(),
            expires_at,
            signature: self.sign(email, expires_at),
        };

        // A struct of two strings and an integer always serializes
        let json = serde_json::to_vec(&payload).unwrap_or_default();
        (URL_SAFE_NO_PAD.encode(json), expires_at)
    }

    /// Parse and verify an untrusted token string.
    ///
    /// Never fails loudly: anything that is not a well-formed, correctly
    /// signed, unexpired token comes back as a [`ValidationError`].
    pub fn decode(&self, token: &str) -> Result<TokenPayload, ValidationError> {
        let payload = parse_token(token).ok_or(ValidationError::Invalid)?;
        self.validate_payload(&payload)?;
        Ok(payload)
    }

    /// Check signature and expiry of an already parsed payload
    pub fn validate_payload(&self, payload: &TokenPayload) -> Result<(), ValidationError> {
        if !self.verify(&payload.email, payload.expires_at, &payload.signature) {
            return Err(ValidationError::Invalid);
        }

        // Valid up to and including the expiry second
        if payload.expires_at < self.clock.now() {
            return Err(ValidationError::Expired);
        }

        Ok(())
    }

    fn mac(&self, email: &str, expires_at: i64) -> HmacSha256 {
        // HMAC accepts keys of any length
        let mut mac = HmacSha256::new_from_slice(self.salt.as_bytes())
            .unwrap_or_else(|_| unreachable!("HMAC can take key of any size"));
        mac.update(email.as_bytes());
        mac.update(b".");
        mac.update(expires_at.to_string().as_bytes());
        mac
    }

    fn sign(&self, email: &str, expires_at: i64) -> String {
        hex::encode(self.mac(email, expires_at).finalize().into_bytes())
    }

    fn verify(&self, email: &str, expires_at: i64, signature: &str) -> bool {
        // Only the exact lowercase form we emit is accepted
        if !signature.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return false;
        }
        let Ok(provided) = hex::decode(signature) else {
            return false;
        };
        self.mac(email, expires_at).verify_slice(&provided).is_ok()
    }
}

impl std::fmt::Debug for MagicLinkCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MagicLinkCodec")
            .field("salt", &"[REDACTED]")
            .field("expire_hours", &self.expire_hours)
            .finish()
    }
}

/// Undo the transport encoding and pull out the three typed fields.
/// Returns `None` for anything that is not base64 of a JSON object with a
/// string `e`, integer `x` and string `s`.
fn parse_token(token: &str) -> Option<TokenPayload> {
    let mut standard: String = token
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    let remainder = standard.len() % 4;
    if remainder != 0 {
        standard.push_str(&"=".repeat(4 - remainder));
    }

    let bytes = STANDARD.decode(standard.as_bytes()).ok()?;
    let value: Value = serde_json::from_slice(&bytes).ok()?;

    let email = value.get("e")?.as_str()?;
    let expires_at = value.get("x")?.as_i64()?;
    let signature = value.get("s")?.as_str()?;

    Some(TokenPayload {
        email: email.to_string(),
        expires_at,
        signature: signature.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    const T0: i64 = 1_000_000;

    fn config(salt: &str) -> MagicLinkConfig {
        MagicLinkConfig {
            salt: salt.to_string(),
            expire_hours: Some(24),
            portal_url: "https://portal.test/magic-link".to_string(),
        }
    }

    fn codec_at(salt: &str, clock: Arc<FixedClock>) -> MagicLinkCodec {
        MagicLinkCodec::new(&config(salt), clock).unwrap()
    }

    fn raw_token(value: serde_json::Value) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&value).unwrap())
    }

    #[test]
    fn test_round_trip_uses_default_ttl() {
        let clock = Arc::new(FixedClock::new(T0));
        let codec = codec_at("s3cr3t", clock);

        let token = codec.encode("a@b.com", None);
        let payload = codec.decode(&token).unwrap();

        assert_eq!(payload.email, "a@b.com");
        assert_eq!(payload.expires_at, T0 + 24 * 3600);
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let clock = Arc::new(FixedClock::new(T0));
        let codec = codec_at("s3cr3t", clock.clone());

        let token = codec.encode("a@b.com", Some(1));

        clock.set(1_003_600);
        let payload = codec.decode(&token).unwrap();
        assert_eq!(payload.expires_at, 1_003_600);

        clock.set(1_003_601);
        assert_eq!(codec.decode(&token), Err(ValidationError::Expired));
    }

    #[test]
    fn test_token_is_url_safe_without_padding() {
        let clock = Arc::new(FixedClock::new(T0));
        let codec = codec_at("s3cr3t", clock);

        for email in ["a@b.com", "someone+tag@example.org", "??>>~~@x.io"] {
            let token = codec.encode(email, Some(2));
            assert!(!token.contains('='), "padding in {token}");
            assert!(!token.contains('+') && !token.contains('/'), "non url-safe {token}");
        }
    }

    #[test]
    fn test_wire_format_fields() {
        let clock = Arc::new(FixedClock::new(T0));
        let codec = codec_at("s3cr3t", clock);

        let token = codec.encode("a@b.com", Some(1));
        let json: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(&token).unwrap()).unwrap();

        assert_eq!(json["e"], "a@b.com");
        assert_eq!(json["x"], 1_003_600);
        let signature = json["s"].as_str().unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_tampered_payload_characters_are_invalid() {
        let clock = Arc::new(FixedClock::new(T0));
        let codec = codec_at("s3cr3t", clock);
        let token = codec.encode("a@b.com", Some(1));

        // The final character can carry unused bits only; skip it
        for index in 0..token.len() - 1 {
            let mut chars: Vec<char> = token.chars().collect();
            chars[index] = if chars[index] == 'A' { 'B' } else { 'A' };
            let mutated: String = chars.into_iter().collect();

            assert_eq!(
                codec.decode(&mutated),
                Err(ValidationError::Invalid),
                "mutation at {index} accepted"
            );
        }
    }

    #[test]
    fn test_rotated_salt_is_invalid_not_expired() {
        let clock = Arc::new(FixedClock::new(T0));
        let old = codec_at("S1", clock.clone());
        let new = codec_at("S2", clock);

        let token = old.encode("a@b.com", Some(1));
        assert_eq!(new.decode(&token), Err(ValidationError::Invalid));
    }

    #[test]
    fn test_forged_expiry_with_old_signature_is_invalid() {
        let clock = Arc::new(FixedClock::new(T0));
        let codec = codec_at("s3cr3t", clock.clone());

        let token = codec.encode("a@b.com", Some(1));
        let mut payload = codec.decode(&token).unwrap();
        payload.expires_at += 3600;

        let forged = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());
        assert_eq!(codec.decode(&forged), Err(ValidationError::Invalid));
    }

    #[test]
    fn test_expired_and_forged_is_invalid() {
        let clock = Arc::new(FixedClock::new(T0));
        let codec = codec_at("s3cr3t", clock);

        let forged = raw_token(serde_json::json!({
            "e": "a@b.com",
            "x": T0 - 10,
            "s": "00".repeat(32),
        }));
        assert_eq!(codec.decode(&forged), Err(ValidationError::Invalid));
    }

    #[test]
    fn test_malformed_input_is_invalid() {
        let clock = Arc::new(FixedClock::new(T0));
        let codec = codec_at("s3cr3t", clock);
        let good = codec.encode("a@b.com", Some(1));

        let cases = vec![
            String::new(),
            "!!!not base64!!!".to_string(),
            good[..good.len() / 2].to_string(),
            URL_SAFE_NO_PAD.encode(b"definitely not json"),
            URL_SAFE_NO_PAD.encode([0xff, 0xfe, 0x00, 0x01]),
            "A".to_string(),
        ];

        for case in cases {
            assert_eq!(codec.decode(&case), Err(ValidationError::Invalid), "accepted {case:?}");
        }
    }

    #[test]
    fn test_wrongly_typed_fields_are_invalid() {
        let clock = Arc::new(FixedClock::new(T0));
        let codec = codec_at("s3cr3t", clock);

        let cases = vec![
            serde_json::json!({ "x": T0 + 10, "s": "ab" }),
            serde_json::json!({ "e": "a@b.com", "s": "ab" }),
            serde_json::json!({ "e": "a@b.com", "x": T0 + 10 }),
            serde_json::json!({ "e": 42, "x": T0 + 10, "s": "ab" }),
            serde_json::json!({ "e": "a@b.com", "x": "1003600", "s": "ab" }),
            serde_json::json!({ "e": "a@b.com", "x": 1003600.5, "s": "ab" }),
            serde_json::json!({ "e": "a@b.com", "x": T0 + 10, "s": ["ab"] }),
            serde_json::json!(["a@b.com", T0 + 10, "ab"]),
            serde_json::json!(null),
        ];

        for case in cases {
            let token = raw_token(case.clone());
            assert_eq!(codec.decode(&token), Err(ValidationError::Invalid), "accepted {case}");
        }
    }

    #[test]
    fn test_non_hex_signature_is_invalid() {
        let clock = Arc::new(FixedClock::new(T0));
        let codec = codec_at("s3cr3t", clock);

        let token = raw_token(serde_json::json!({ "e": "a@b.com", "x": T0 + 10, "s": "zz" }));
        assert_eq!(codec.decode(&token), Err(ValidationError::Invalid));
    }

    #[test]
    fn test_accepts_padded_standard_alphabet() {
        let clock = Arc::new(FixedClock::new(T0));
        let codec = codec_at("s3cr3t", clock);

        let token = codec.encode("a@b.com", Some(1));
        let json = URL_SAFE_NO_PAD.decode(&token).unwrap();
        let padded = STANDARD.encode(json);

        assert!(codec.decode(&padded).is_ok());
    }

    #[test]
    fn test_validate_payload_directly() {
        let clock = Arc::new(FixedClock::new(T0));
        let codec = codec_at("s3cr3t", clock.clone());
        let payload = codec.decode(&codec.encode("a@b.com", Some(1))).unwrap();

        assert_eq!(codec.validate_payload(&payload), Ok(()));
        clock.advance(2 * 3600);
        assert_eq!(codec.validate_payload(&payload), Err(ValidationError::Expired));
    }

    #[test]
    fn test_missing_configuration_is_rejected() {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(T0));

        let err = MagicLinkCodec::new(&config(""), clock.clone()).unwrap_err();
        assert_eq!(err, ConfigError::MissingSalt);

        let mut no_ttl = config("s3cr3t");
        no_ttl.expire_hours = None;
        assert_eq!(MagicLinkCodec::new(&no_ttl, clock.clone()).unwrap_err(), ConfigError::MissingExpireHours);

        no_ttl.expire_hours = Some(0);
        assert_eq!(MagicLinkCodec::new(&no_ttl, clock).unwrap_err(), ConfigError::MissingExpireHours);
    }

    #[test]
    fn test_debug_redacts_salt() {
        let codec = codec_at("s3cr3t", Arc::new(FixedClock::new(T0)));
        assert!(!format!("{codec:?}").contains("s3cr3t"));
    }
}
