//! Integration tests for `GeoLocationResolver` using wiremock HTTP mocks.

use bestdeal_geo::{GeoEndpoints, GeoLocationResolver, LocationResolver, UNKNOWN_LOCATION};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IP: &str = "49.207.10.4";

fn resolver(server: &MockServer) -> GeoLocationResolver {
    GeoLocationResolver::with_endpoints(3, &GeoEndpoints::all_at(&server.uri()))
        .expect("resolver construction should not fail")
}

async fn mount_json(server: &MockServer, route: &str, status: u16, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn first_service_wins() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        &format!("/{IP}/json/"),
        200,
        serde_json::json!({ "city": "Bengaluru", "region": "Karnataka", "country_name": "India" }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(format!("/{IP}/json")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let location = resolver(&server).resolve(Some(IP)).await;

    assert_eq!(location, "Bengaluru, Karnataka, India");
}

#[tokio::test]
async fn rate_limited_service_falls_through_to_ipinfo() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        &format!("/{IP}/json/"),
        429,
        serde_json::json!({ "error": true, "reason": "RateLimited" }),
    )
    .await;
    mount_json(
        &server,
        &format!("/{IP}/json"),
        200,
        serde_json::json!({ "city": "Mumbai", "region": "Maharashtra", "country": "IN" }),
    )
    .await;

    let location = resolver(&server).resolve(Some(IP)).await;

    assert_eq!(location, "Mumbai, Maharashtra, IN");
}

#[tokio::test]
async fn cityless_and_failing_services_fall_through_to_ip_api() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        &format!("/{IP}/json/"),
        200,
        serde_json::json!({ "ip": IP, "city": "", "region": "" }),
    )
    .await;
    mount_json(&server, &format!("/{IP}/json"), 500, serde_json::json!({})).await;
    mount_json(
        &server,
        &format!("/json/{IP}"),
        200,
        serde_json::json!({
            "status": "success",
            "city": "Pune",
            "regionName": "Maharashtra",
            "country": "India"
        }),
    )
    .await;

    let location = resolver(&server).resolve(Some(IP)).await;

    assert_eq!(location, "Pune, Maharashtra, India");
}

#[tokio::test]
async fn every_service_failing_yields_unknown() {
    let server = MockServer::start().await;
    mount_json(&server, &format!("/{IP}/json/"), 503, serde_json::json!({})).await;
    mount_json(&server, &format!("/{IP}/json"), 200, serde_json::json!({ "bogon": true })).await;
    mount_json(
        &server,
        &format!("/json/{IP}"),
        200,
        serde_json::json!({ "status": "fail", "message": "reserved range" }),
    )
    .await;

    let location = resolver(&server).resolve(Some(IP)).await;

    assert_eq!(location, UNKNOWN_LOCATION);
}

#[tokio::test]
async fn malformed_body_is_treated_as_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/{IP}/json/")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .mount(&server)
        .await;
    mount_json(
        &server,
        &format!("/{IP}/json"),
        200,
        serde_json::json!({ "city": "Chennai", "region": "Tamil Nadu", "country": "IN" }),
    )
    .await;

    let location = resolver(&server).resolve(Some(IP)).await;

    assert_eq!(location, "Chennai, Tamil Nadu, IN");
}

#[tokio::test]
async fn loopback_caller_discovers_public_ip_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ip": IP })))
        .expect(2)
        .mount(&server)
        .await;
    mount_json(
        &server,
        &format!("/{IP}/json/"),
        200,
        serde_json::json!({ "city": "Bengaluru", "region": "Karnataka", "country_name": "India" }),
    )
    .await;

    let resolver = resolver(&server);
    assert_eq!(resolver.resolve(Some("127.0.0.1")).await, "Bengaluru, Karnataka, India");
    assert_eq!(resolver.resolve(None).await, "Bengaluru, Karnataka, India");
}

#[tokio::test]
async fn failed_discovery_yields_unknown_without_lookups() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/{IP}/json/")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let location = resolver(&server).resolve(Some("localhost")).await;

    assert_eq!(location, UNKNOWN_LOCATION);
}

#[tokio::test]
async fn free_text_identifier_is_not_sent_as_an_address() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ip": IP })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Bengaluru/json/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_json(
        &server,
        &format!("/{IP}/json/"),
        200,
        serde_json::json!({ "city": "Bengaluru", "region": "Karnataka", "country_name": "India" }),
    )
    .await;

    let resolver = resolver(&server);
    assert_eq!(resolver.resolve(Some("Bengaluru")).await, "Bengaluru, Karnataka, India");
    assert_eq!(
        resolver.resolve(Some("http://attacker.test/")).await,
        "Bengaluru, Karnataka, India"
    );
}

#[tokio::test]
async fn discovered_address_must_be_an_ip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ip": "../admin" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let location = resolver(&server).resolve(None).await;

    assert_eq!(location, UNKNOWN_LOCATION);
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
}
