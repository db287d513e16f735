//! Request plumbing shared by the HTTP providers.

use crate::error::{CmdfyError, Result};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::debug;

/// Send a request and decode the JSON body, timing the round trip.
///
/// Transport failures, non-success statuses and undecodable bodies all come
/// back as `CmdfyError::Generation`.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &str,
    request: RequestBuilder,
) -> Result<(T, Duration)> {
    let started = Instant::now();

    let response = request
        .send()
        .await
        .map_err(|e| CmdfyError::generation(provider, format!("request failed: {}", e)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| CmdfyError::generation(provider, format!("failed to read response: {}", e)))?;
    let latency = started.elapsed();

    debug!(provider, %status, latency_ms = latency.as_millis() as u64, "provider responded");

    if !status.is_success() {
        return Err(CmdfyError::generation(
            provider,
            format!("api error (status {}): {}", status.as_u16(), body),
        ));
    }

    let decoded = serde_json::from_str(&body)
        .map_err(|e| CmdfyError::generation(provider, format!("failed to decode response: {}", e)))?;

    Ok((decoded, latency))
}

/// Human-readable latency, rounded to the millisecond ("850ms", "1.2s")
pub(crate) fn format_latency(latency: Duration) -> String {
    let ms = latency.as_millis();
    if ms < 1000 {
        return format!("{}ms", ms);
    }

    let secs = format!("{:.3}", ms as f64 / 1000.0);
    let secs = secs.trim_end_matches('0').trim_end_matches('.');
    format!("{}s", secs)
}

/// Join a base URL and a path without doubling slashes
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
