use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TokenError {
    #[error("token is empty")]
    Missing,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed: {0}")]
    Malformed(String),
    #[error("token could not be signed: {0}")]
    Encode(String),
}

#[derive(Serialize)]
struct OutgoingClaims<'a, C> {
    #[serde(flatten)]
    claims: &'a C,
    aud: &'a str,
    exp: i64,
}

#[derive(Deserialize)]
struct IncomingClaims<C> {
    #[serde(flatten)]
    claims: C,
}

/// HS256 JWT codec for one claim set. The `audience` names the cookie the
/// token travels in, so a token minted for one cookie is rejected by the
/// codec of another even though they share a key.
pub struct TokenCodec<C> {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    audience: &'static str,
    _claims: PhantomData<fn() -> C>,
}

impl<C> TokenCodec<C>
where
    C: Serialize + DeserializeOwned,
{
    pub fn new(secret: &[u8], audience: &'static str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "aud"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            audience,
            _claims: PhantomData,
        }
    }

    /// Sign `claims`, valid for `ttl` from now.
    pub fn encode(&self, claims: &C, ttl: Duration) -> Result<String, TokenError> {
        let outgoing = OutgoingClaims {
            claims,
            aud: self.audience,
            exp: (Utc::now() + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &outgoing, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verify signature, expiry and audience, then deserialize the claims.
    /// Any missing or mistyped field fails the whole decode.
    pub fn decode(&self, token: &str) -> Result<C, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::Missing);
        }

        decode::<IncomingClaims<C>>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            })
    }
}
