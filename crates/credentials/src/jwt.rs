// SPDX-License-Identifier: Apache-2.0

//! App JWT minting.
//!
//! Claims are `iss = appId` (as a decimal string), `iat = now`,
//! `exp = now + 9min`, signed RS256. `validate` performs the same local
//! checks a receiver would, used only by tests — the platform is the real
//! verifier.

use crate::error::CredentialError;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

/// GitHub App JWTs must not exceed 10 minutes; 9 leaves a margin for clock
/// skew between us and the platform.
pub const JWT_TTL_SECS: i64 = 9 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(app_id: i64, now: i64) -> Self {
        Self { iss: app_id.to_string(), iat: now, exp: now + JWT_TTL_SECS }
    }

    /// Rejects `exp <= now` and `iat > now`.
    pub fn is_locally_valid(&self, now: i64) -> bool {
        self.exp > now && self.iat <= now
    }
}

/// Mints a short-lived RS256 JWT for `app_id`, signed with `private_key_pem`.
pub fn mint(app_id: i64, private_key_pem: &[u8], now: i64) -> Result<String, CredentialError> {
    let key = EncodingKey::from_rsa_pem(private_key_pem)
        .map_err(|e| CredentialError::InvalidPrivateKey(e.to_string()))?;
    let claims = Claims::new(app_id, now);
    encode(&Header::new(jsonwebtoken::Algorithm::RS256), &claims, &key)
        .map_err(CredentialError::JwtSigning)
}

#[cfg(test)]
#[path = "jwt_tests.rs"]
mod tests;
