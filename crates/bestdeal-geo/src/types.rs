//! Response shapes of the public geolocation services.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct IpifyResponse {
    pub ip: Option<String>,
}

/// `ipapi.co/{ip}/json/`
#[derive(Debug, Deserialize)]
pub(crate) struct IpapiCoResponse {
    pub city: Option<String>,
    pub region: Option<String>,
    pub country_name: Option<String>,
}

/// `ipinfo.io/{ip}/json`
#[derive(Debug, Deserialize)]
pub(crate) struct IpinfoResponse {
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

/// `ip-api.com/json/{ip}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IpApiComResponse {
    pub status: Option<String>,
    pub city: Option<String>,
    pub region_name: Option<String>,
    pub country: Option<String>,
}
