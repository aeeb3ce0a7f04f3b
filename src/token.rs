//! Compact HS256 tokens built directly on HMAC-SHA256.
//!
//! A token is `header.payload.signature`, each segment base64url encoded
//! without padding. The header is always `{"alg":"HS256","typ":"JWT"}` and is
//! never read back: verification only trusts the recomputed HMAC.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use serde_json::Value;
use sha2::Sha256;
use time::OffsetDateTime;

type HmacSha256 = Hmac<Sha256>;

/// The payload carried inside a token.
pub type Claims = serde_json::Map<String, Value>;

#[derive(serde::Serialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

const HEADER: Header = Header {
    alg: "HS256",
    typ: "JWT",
};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    MalformedToken(&'static str),
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
}

/// Identity facts carried by a session token issued at login.
#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub username: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenCodec {
    mac: HmacSha256,
    ttl: time::Duration,
}

impl TokenCodec {
    pub fn new(key: &Secret<String>, ttl: time::Duration) -> Self {
        let mac = HmacSha256::new_from_slice(key.expose_secret().as_bytes())
            .expect("HMAC-SHA-256 should accept any key length");
        Self { mac, ttl }
    }

    pub fn encode(&self, claims: &Claims) -> String {
        let header = serde_json::to_vec(&HEADER).expect("the header should always serialize");
        let payload = serde_json::to_vec(claims).expect("a JSON object should always serialize");

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = URL_SAFE_NO_PAD.encode(self.sign(&signing_input));

        format!("{signing_input}.{signature}")
    }

    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_at(token, OffsetDateTime::now_utc().unix_timestamp())
    }

    /// Like [`TokenCodec::decode`], judging expiry against `now` (Unix seconds).
    pub fn decode_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let segments: Vec<&str> = token.split('.').collect();
        let &[header, payload, signature] = segments.as_slice() else {
            return Err(TokenError::MalformedToken("expected three segments"));
        };
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(TokenError::MalformedToken("empty segment"));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::InvalidSignature)?;
        let signing_input = &token[..header.len() + 1 + payload.len()];
        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        // `verify_slice` compares in constant time.
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::MalformedToken("payload is not base64url"))?;
        let claims: Claims = serde_json::from_slice(&payload)
            .map_err(|_| TokenError::MalformedToken("payload is not a JSON object"))?;

        if let Some(exp) = claims.get("exp") {
            let exp = exp
                .as_i64()
                .ok_or(TokenError::MalformedToken("`exp` is not an integer"))?;
            if exp <= now {
                return Err(TokenError::Expired);
            }
        }

        Ok(claims)
    }

    /// Issue a session token for `username`, valid for the configured ttl.
    pub fn issue(&self, username: &str) -> String {
        let now = OffsetDateTime::now_utc();
        let mut claims = Claims::new();
        claims.insert("username".into(), username.into());
        claims.insert("iat".into(), now.unix_timestamp().into());
        claims.insert("exp".into(), (now + self.ttl).unix_timestamp().into());
        self.encode(&claims)
    }

    /// Decode a session token and require the claims issued by [`TokenCodec::issue`].
    pub fn authenticate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let claims = self.decode(token)?;
        serde_json::from_value(Value::Object(claims))
            .map_err(|_| TokenError::MalformedToken("missing session claims"))
    }

    fn sign(&self, signing_input: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}
