//! Best-effort client context attached to each login.
//!
//! Location and public IP are informational. Any failure, including a slow
//! lookup, degrades to "unknown" and never blocks the login.

use std::time::Duration;

use async_trait::async_trait;

/// Upper bound on each context lookup.
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// What the client knows about where the login comes from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientContext {
    pub location: Option<Location>,
    pub ip_address: Option<String>,
}

#[async_trait(?Send)]
pub trait ContextProvider {
    async fn location(&self) -> Option<Location>;
    async fn public_ip(&self) -> Option<String>;
}

/// Knows nothing; every lookup is unknown.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnknownContext;

#[async_trait(?Send)]
impl ContextProvider for UnknownContext {
    async fn location(&self) -> Option<Location> {
        None
    }

    async fn public_ip(&self) -> Option<String> {
        None
    }
}

/// Answers fixed values.
#[derive(Debug, Default, Clone)]
pub struct FixedContext {
    pub location: Option<Location>,
    pub ip_address: Option<String>,
}

#[async_trait(?Send)]
impl ContextProvider for FixedContext {
    async fn location(&self) -> Option<Location> {
        self.location
    }

    async fn public_ip(&self) -> Option<String> {
        self.ip_address.clone()
    }
}

/// Looks up the public IP through ipify. Location stays unknown; native
/// hosts have no geolocation service.
#[cfg(feature = "network")]
pub struct IpifyLookup {
    client: reqwest::Client,
    url: String,
}

#[cfg(feature = "network")]
impl IpifyLookup {
    pub fn new() -> Self {
        Self::with_url("https://api.ipify.org?format=json")
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[cfg(feature = "network")]
impl Default for IpifyLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "network")]
#[async_trait(?Send)]
impl ContextProvider for IpifyLookup {
    async fn location(&self) -> Option<Location> {
        None
    }

    async fn public_ip(&self) -> Option<String> {
        #[derive(serde::Deserialize)]
        struct IpBody {
            ip: String,
        }

        let response = match self.client.get(&self.url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Public IP lookup failed");
                return None;
            }
        };
        match response.json::<IpBody>().await {
            Ok(body) => Some(body.ip),
            Err(e) => {
                tracing::warn!(error = %e, "Public IP lookup returned an unexpected body");
                None
            }
        }
    }
}

/// Runs both lookups in order, each bounded by [`LOOKUP_TIMEOUT`].
pub async fn collect<P: ContextProvider + ?Sized>(provider: &P) -> ClientContext {
    let location = tokio::time::timeout(LOOKUP_TIMEOUT, provider.location())
        .await
        .unwrap_or_else(|_| {
            tracing::warn!("Location lookup timed out");
            None
        });
    let ip_address = tokio::time::timeout(LOOKUP_TIMEOUT, provider.public_ip())
        .await
        .unwrap_or_else(|_| {
            tracing::warn!("Public IP lookup timed out");
            None
        });

    ClientContext {
        location,
        ip_address,
    }
}
