//! Public-IP discovery plus three geolocation services tried in priority
//! order.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::GeoError;
use crate::types::{IpApiComResponse, IpapiCoResponse, IpifyResponse, IpinfoResponse};

/// Returned when no service could place the caller.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Turns a caller identifier into a location string a delivery platform's
/// address search will accept.
#[async_trait]
pub trait LocationResolver: Send + Sync {
    /// Resolves `identifier` (normally the caller's IP address).
    ///
    /// Never fails: returns [`UNKNOWN_LOCATION`] when every service fails.
    async fn resolve(&self, identifier: Option<&str>) -> String;
}

/// Base URLs of the services the resolver talks to.
#[derive(Debug, Clone)]
pub struct GeoEndpoints {
    pub ipify: String,
    pub ipapi_co: String,
    pub ipinfo: String,
    pub ip_api_com: String,
}

impl Default for GeoEndpoints {
    fn default() -> Self {
        Self {
            ipify: "https://api.ipify.org".to_owned(),
            ipapi_co: "https://ipapi.co".to_owned(),
            ipinfo: "https://ipinfo.io".to_owned(),
            ip_api_com: "http://ip-api.com".to_owned(),
        }
    }
}

impl GeoEndpoints {
    /// Every service served from one base URL (a single mock server).
    #[must_use]
    pub fn all_at(base_url: &str) -> Self {
        Self {
            ipify: base_url.to_owned(),
            ipapi_co: base_url.to_owned(),
            ipinfo: base_url.to_owned(),
            ip_api_com: base_url.to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
struct Bases {
    ipify: Url,
    ipapi_co: Url,
    ipinfo: Url,
    ip_api_com: Url,
}

/// HTTP implementation of [`LocationResolver`].
///
/// Service order: ipapi.co, ipinfo.io, ip-api.com. The first one that
/// places the address wins.
#[derive(Debug, Clone)]
pub struct GeoLocationResolver {
    client: Client,
    bases: Bases,
}

impl GeoLocationResolver {
    /// Creates a resolver against the public services.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: u64) -> Result<Self, GeoError> {
        Self::with_endpoints(timeout_secs, &GeoEndpoints::default())
    }

    /// Creates a resolver against custom base URLs (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the HTTP client cannot be built, or
    /// [`GeoError::InvalidBaseUrl`] if any base URL does not parse.
    pub fn with_endpoints(timeout_secs: u64, endpoints: &GeoEndpoints) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs))
            .user_agent("Mozilla/5.0 (compatible; bestdeal/0.1)")
            .build()?;

        Ok(Self {
            client,
            bases: Bases {
                ipify: parse_base(&endpoints.ipify)?,
                ipapi_co: parse_base(&endpoints.ipapi_co)?,
                ipinfo: parse_base(&endpoints.ipinfo)?,
                ip_api_com: parse_base(&endpoints.ip_api_com)?,
            },
        })
    }

    /// Asks ipify for the public address this process is seen from.
    async fn public_ip(&self) -> Result<Option<IpAddr>, GeoError> {
        let mut url = self.bases.ipify.clone();
        url.query_pairs_mut().append_pair("format", "json");
        let body: IpifyResponse = self.get_json(url).await?;
        Ok(body.ip.and_then(|ip| ip.trim().parse().ok()))
    }

    async fn ipapi_co(&self, ip: &str) -> Result<Option<String>, GeoError> {
        let url = join(&self.bases.ipapi_co, &format!("{ip}/json/"))?;
        let body: IpapiCoResponse = self.get_json(url).await?;
        Ok(non_empty(body.city).map(|city| {
            format!(
                "{city}, {}, {}",
                body.region.unwrap_or_default(),
                body.country_name.unwrap_or_default()
            )
        }))
    }

    async fn ipinfo(&self, ip: &str) -> Result<Option<String>, GeoError> {
        let url = join(&self.bases.ipinfo, &format!("{ip}/json"))?;
        let body: IpinfoResponse = self.get_json(url).await?;
        Ok(non_empty(body.city).map(|city| {
            format!(
                "{city}, {}, {}",
                body.region.unwrap_or_default(),
                body.country.unwrap_or_default()
            )
        }))
    }

    async fn ip_api_com(&self, ip: &str) -> Result<Option<String>, GeoError> {
        let url = join(&self.bases.ip_api_com, &format!("json/{ip}"))?;
        let body: IpApiComResponse = self.get_json(url).await?;
        if body.status.as_deref() != Some("success") {
            return Ok(None);
        }
        Ok(Some(format!(
            "{}, {}, {}",
            body.city.unwrap_or_default(),
            body.region_name.unwrap_or_default(),
            body.country.unwrap_or_default()
        )))
    }

    /// Sends a GET request, asserts a 2xx status and parses the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GeoError> {
        let response = self.client.get(url.clone()).send().await?;
        let body = response.error_for_status()?.text().await?;
        serde_json::from_str(&body).map_err(|e| GeoError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl LocationResolver for GeoLocationResolver {
    async fn resolve(&self, identifier: Option<&str>) -> String {
        let ip = match identifier.and_then(routable_address) {
            Some(ip) => ip.to_string(),
            None => {
                if let Some(id) = identifier.filter(|id| !id.trim().is_empty()) {
                    tracing::debug!(identifier = %id, "identifier is not a public IP, discovering one");
                }
                match self.public_ip().await {
                    Ok(Some(ip)) => ip.to_string(),
                    Ok(None) => {
                        tracing::warn!("public IP lookup returned no usable address");
                        return UNKNOWN_LOCATION.to_owned();
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "public IP lookup failed");
                        return UNKNOWN_LOCATION.to_owned();
                    }
                }
            }
        };

        for service in Service::ORDER {
            let outcome = match service {
                Service::IpapiCo => self.ipapi_co(&ip).await,
                Service::Ipinfo => self.ipinfo(&ip).await,
                Service::IpApiCom => self.ip_api_com(&ip).await,
            };
            match outcome {
                Ok(Some(location)) => {
                    tracing::info!(ip = %ip, service = service.name(), location = %location, "resolved location");
                    return location;
                }
                Ok(None) => {
                    tracing::debug!(ip = %ip, service = service.name(), "service could not place address");
                }
                Err(e) => {
                    tracing::warn!(ip = %ip, service = service.name(), error = %e, "geolocation request failed");
                }
            }
        }
        UNKNOWN_LOCATION.to_owned()
    }
}

#[derive(Debug, Clone, Copy)]
enum Service {
    IpapiCo,
    Ipinfo,
    IpApiCom,
}

impl Service {
    const ORDER: [Service; 3] = [Service::IpapiCo, Service::Ipinfo, Service::IpApiCom];

    fn name(self) -> &'static str {
        match self {
            Service::IpapiCo => "ipapi.co",
            Service::Ipinfo => "ipinfo.io",
            Service::IpApiCom => "ip-api.com",
        }
    }
}

/// The identifier as an IP address worth looking up. Loopback addresses,
/// `localhost`, hostnames and free text say nothing about where the caller
/// is, so they yield `None` and the public address is discovered instead.
fn routable_address(identifier: &str) -> Option<IpAddr> {
    identifier
        .trim()
        .parse::<IpAddr>()
        .ok()
        .filter(|ip| !ip.is_loopback())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_base(raw: &str) -> Result<Url, GeoError> {
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| GeoError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })
}

fn join(base: &Url, path: &str) -> Result<Url, GeoError> {
    base.join(path).map_err(|e| GeoError::InvalidBaseUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })
}
