// SPDX-License-Identifier: Apache-2.0

//! Token exchange: trade an app JWT for a short-lived
//! installation access token.

use crate::error::CredentialError;
use codeagent_core::InstallationToken;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Optional scoping for the minted token; scoped tokens are never cached.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExchangeScope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repositories: Option<Vec<String>>,
}

impl ExchangeScope {
    pub fn is_empty(&self) -> bool {
        self.permissions.is_none() && self.repositories.is_none()
    }
}

#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    token: String,
    expires_at: String,
    #[allow(dead_code)]
    token_type: String,
}

/// `POST /app/installations/{id}/access_tokens` with `jwt` as bearer.
/// Expects HTTP 201 with `{token, expires_at, token_type}`.
pub async fn exchange(
    client: &reqwest::Client,
    base_url: &str,
    jwt: &str,
    installation_id: i64,
    scope: &ExchangeScope,
) -> Result<InstallationToken, CredentialError> {
    if installation_id <= 0 {
        return Err(CredentialError::InvalidInstallationId(installation_id));
    }

    let url = format!("{base_url}/app/installations/{installation_id}/access_tokens");
    let mut request = client
        .post(&url)
        .bearer_auth(jwt)
        .header("Accept", "application/vnd.github+json")
        .timeout(EXCHANGE_TIMEOUT);
    if !scope.is_empty() {
        request = request.json(scope);
    } else {
        request = request.header("Content-Length", "0");
    }

    let response = request.send().await.map_err(CredentialError::RequestFailed)?;
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        return Err(CredentialError::RateLimited { retry_after_secs });
    }
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        let body = response.text().await.unwrap_or_default();
        return Err(CredentialError::Unauthorized(body));
    }
    if status != reqwest::StatusCode::CREATED {
        let body = response.text().await.unwrap_or_default();
        return Err(CredentialError::ExchangeFailed { status: status.as_u16(), body });
    }

    let body: ExchangeResponse =
        response.json().await.map_err(CredentialError::RequestFailed)?;
    let expires_at = parse_rfc3339_secs(&body.expires_at).unwrap_or(0);
    Ok(InstallationToken::new(body.token, expires_at, installation_id))
}

/// Parses a `YYYY-MM-DDTHH:MM:SSZ` timestamp into seconds since the epoch
/// without pulling in a datetime crate for one field.
fn parse_rfc3339_secs(s: &str) -> Option<u64> {
    let s = s.trim_end_matches('Z');
    let (date, time) = s.split_once('T')?;
    let mut date_parts = date.splitn(3, '-');
    let year: i64 = date_parts.next()?.parse().ok()?;
    let month: i64 = date_parts.next()?.parse().ok()?;
    let day: i64 = date_parts.next()?.parse().ok()?;

    let time = time.split('.').next().unwrap_or(time);
    let mut time_parts = time.splitn(3, ':');
    let hour: i64 = time_parts.next()?.parse().ok()?;
    let minute: i64 = time_parts.next()?.parse().ok()?;
    let second: i64 = time_parts.next()?.parse().ok()?;

    let days_since_epoch = days_from_civil(year, month, day);
    let secs = days_since_epoch * 86_400 + hour * 3_600 + minute * 60 + second;
    u64::try_from(secs).ok()
}

/// Howard Hinnant's civil-from-days algorithm, inverted: days since the
/// Unix epoch for a given proleptic-Gregorian `(y, m, d)`.
fn days_from_civil(y: i64, m: i64, d: i64) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = (m + 9) % 12;
    let doy = (153 * mp + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

#[cfg(test)]
#[path = "exchange_tests.rs"]
mod tests;
