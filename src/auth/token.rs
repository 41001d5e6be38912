use std::time::Duration;

use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::errors::{Error, Result};

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub jti: Uuid,   // unique token id
    pub sub: String, // subject: the user's email
    pub iat: usize,
    pub exp: usize,
}

/// Issues and verifies signed, time-bounded access tokens. Stateless: any
/// process holding the same secret can verify a token, and there is no
/// revocation — the short lifetime bounds a leaked token instead.
#[derive(Clone)]
pub struct TokenMaker {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenMaker {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn create_token(&self, subject: &str, ttl: Duration) -> Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            jti: Uuid::new_v4(),
            sub: subject.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| Error::TokenCreation(e.to_string()))?;
        debug!(subject = %subject, "token signed");
        Ok(token)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        // expiry must be exact; the crate default allows 60s of leeway
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => Error::ExpiredToken,
                _ => Error::InvalidSignature,
            }
        })?;
        debug!(subject = %data.claims.sub, "token verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_verify_roundtrip() {
        let maker = TokenMaker::new("dev-secret");
        let token = maker
            .create_token("a@x.com", Duration::from_secs(60))
            .expect("create token");
        let claims = maker.verify_token(&token).expect("verify token");
        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn tokens_get_unique_ids() {
        let maker = TokenMaker::new("dev-secret");
        let first = maker
            .create_token("a@x.com", Duration::from_secs(60))
            .expect("create token");
        let second = maker
            .create_token("a@x.com", Duration::from_secs(60))
            .expect("create token");
        let a = maker.verify_token(&first).expect("verify");
        let b = maker.verify_token(&second).expect("verify");
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn expired_token_is_rejected() {
        let maker = TokenMaker::new("dev-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = Claims {
            jti: Uuid::new_v4(),
            sub: "a@x.com".into(),
            iat: now - 120,
            exp: now - 60,
        };
        let token = encode(&Header::default(), &claims, &maker.encoding).expect("encode");
        let err = maker.verify_token(&token).unwrap_err();
        assert!(matches!(err, Error::ExpiredToken));
    }

    #[test]
    fn tampered_payload_fails_the_signature_check() {
        let maker = TokenMaker::new("dev-secret");
        let token = maker
            .create_token("a@x.com", Duration::from_secs(60))
            .expect("create token");

        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        let mut payload: Vec<u8> = parts[1].bytes().collect();
        payload[0] = if payload[0] == b'A' { b'B' } else { b'A' };
        let tampered = format!(
            "{}.{}.{}",
            parts[0],
            String::from_utf8(payload).expect("ascii payload"),
            parts[2]
        );

        let err = maker.verify_token(&tampered).unwrap_err();
        assert!(matches!(err, Error::InvalidSignature));
    }

    #[test]
    fn token_from_another_key_is_rejected() {
        let maker = TokenMaker::new("dev-secret");
        let other = TokenMaker::new("other-secret");
        let token = other
            .create_token("a@x.com", Duration::from_secs(60))
            .expect("create token");
        let err = maker.verify_token(&token).unwrap_err();
        assert!(matches!(err, Error::InvalidSignature));
    }

    #[test]
    fn garbage_is_not_partially_trusted() {
        let maker = TokenMaker::new("dev-secret");
        let err = maker.verify_token("not-a-token").unwrap_err();
        assert!(matches!(err, Error::InvalidSignature));
    }
}
