use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::RoutingConfig;
use crate::error::{Error, Result};

/// Blocking client shared by all adapters, bounded by `timeout_secs`.
pub fn build_client(config: &RoutingConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(user_agent())
        .build()
        .map_err(Error::Http)
}

fn user_agent() -> String {
    format!("tripcarbon-lib/{version}", version = env!("CARGO_PKG_VERSION"))
}

/// Send `request` and decode a JSON body.
///
/// Transport errors (including timeouts), non-success statuses and bodies
/// that do not match `T` all surface as [`Error::RoutingFailed`].
pub(crate) fn fetch_json<T: DeserializeOwned>(
    service: &'static str,
    request: RequestBuilder,
) -> Result<T> {
    let response = request.send().map_err(|err| {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.to_string()
        };
        Error::routing(service, reason)
    })?;

    let status = response.status();
    debug!(service, %status, url = %response.url(), "routing response");
    if !status.is_success() {
        return Err(Error::routing(service, format!("HTTP status {status}")));
    }

    response
        .json::<T>()
        .map_err(|err| Error::routing(service, format!("malformed body: {err}")))
}
