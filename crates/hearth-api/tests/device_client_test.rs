#![allow(clippy::unwrap_used, clippy::float_cmp)]
// Integration tests for `DeviceClient` using wiremock.

use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hearth_api::{DeviceClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DeviceClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = DeviceClient::with_base_url(reqwest::Client::new(), base_url);
    (server, client)
}

fn xml_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_owned(), "text/xml")
}

const ERROR_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<eta version="1.0"><error>Not found</error></eta>"#;

// ── API version ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_api_version() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/user/api"))
        .respond_with(xml_response(
            r#"<eta version="1.0"><api version="1.2"/></eta>"#,
        ))
        .mount(&server)
        .await;

    let version = client.api_version().await.unwrap();
    assert_eq!(version.to_string(), "1.2");
    assert!(version.supports_metadata());
}

// ── Menu ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_menu() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/user/menu"))
        .respond_with(xml_response(
            r#"<?xml version="1.0" encoding="utf-8"?>
               <eta version="1.0" xmlns="http://www.eta.co.at/rest/v1">
                 <menu>
                   <fub uri="/120/10111" name="WW">
                     <object uri="/120/10111/0/0/12271" name="Temp"/>
                   </fub>
                 </menu>
               </eta>"#,
        ))
        .mount(&server)
        .await;

    let menu = client.fetch_menu().await.unwrap();
    let leaves = menu.leaves();

    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].uri, "/120/10111/0/0/12271");
    assert_eq!(leaves[0].friendly_name, "WW > Temp");
}

#[tokio::test]
async fn test_fetch_menu_device_error_is_fatal() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/user/menu"))
        .respond_with(xml_response(ERROR_BODY))
        .mount(&server)
        .await;

    let result = client.fetch_menu().await;
    assert!(
        matches!(result, Err(Error::Device { .. })),
        "expected Device error, got: {result:?}"
    );
}

// ── Metadata ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_metadata() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/user/varinfo//120/10111/0/0/12271"))
        .respond_with(xml_response(
            r#"<eta version="1.0">
                 <varInfo uri="/user/varinfo/120/10111/0/0/12271">
                   <variable uri="120/10111/0/0/12271" name="Temp" fullName="WW Temp"
                             unit="°C" decPlaces="0" scaleFactor="10" advTextOffset="0" isWritable="0">
                     <type>DEFAULT</type>
                   </variable>
                 </varInfo>
               </eta>"#,
        ))
        .mount(&server)
        .await;

    let info = client
        .fetch_metadata("/120/10111/0/0/12271")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(info.unit, "°C");
    assert_eq!(info.dec_places, 0);
    assert_eq!(info.scale_factor, 10);
    assert!(!info.is_writable);
}

#[tokio::test]
async fn test_fetch_metadata_device_error_yields_none() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/user/varinfo//120/10111/0/0/99999"))
        .respond_with(xml_response(ERROR_BODY))
        .mount(&server)
        .await;

    let info = client.fetch_metadata("/120/10111/0/0/99999").await.unwrap();
    assert!(info.is_none());
}

// ── Values ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_value() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/user/var//120/10111/0/0/12271"))
        .respond_with(xml_response(
            r#"<eta version="1.0">
                 <value uri="/user/var/120/10111/0/0/12271" strValue="50"
                        unit="°C" decPlaces="0" scaleFactor="10" advTextOffset="0">500</value>
               </eta>"#,
        ))
        .mount(&server)
        .await;

    let reading = client.fetch_value("/120/10111/0/0/12271").await.unwrap();

    assert_eq!(reading.raw, 500);
    assert_eq!(reading.scaled(), 50.0);
    assert_eq!(reading.unit, "°C");
}

#[tokio::test]
async fn test_fetch_value_device_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/user/var//120/10111/0/0/99999"))
        .respond_with(xml_response(ERROR_BODY))
        .mount(&server)
        .await;

    let result = client.fetch_value("/120/10111/0/0/99999").await;
    assert!(matches!(result, Err(Error::Device { .. })));
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_write_value_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/user/var//120/10111/0/0/12129"))
        .and(body_string_contains("value=505"))
        .respond_with(xml_response(
            r#"<eta version="1.0"><success uri="/user/var/120/10111/0/0/12129"/></eta>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let ok = client
        .write_value("/120/10111/0/0/12129", 505.0, None, None)
        .await
        .unwrap();
    assert!(ok);
}

#[tokio::test]
async fn test_write_value_rejection_returns_false() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/user/var//120/10111/0/0/12129"))
        .respond_with(xml_response(
            r#"<eta version="1.0"><error>Value out of range</error></eta>"#,
        ))
        .mount(&server)
        .await;

    let ok = client
        .write_value("/120/10111/0/0/12129", 9999.0, None, None)
        .await
        .unwrap();
    assert!(!ok);
}

#[tokio::test]
async fn test_write_value_with_schedule_slots() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/user/var//120/10111/0/0/12130"))
        .and(body_string_contains("begin=32"))
        .and(body_string_contains("end=88"))
        .respond_with(xml_response(r#"<eta version="1.0"><success/></eta>"#))
        .expect(1)
        .mount(&server)
        .await;

    let ok = client
        .write_value("/120/10111/0/0/12130", 1.0, Some(32), Some(88))
        .await
        .unwrap();
    assert!(ok);
}

#[tokio::test]
async fn test_write_value_rejects_out_of_range_slot() {
    let (server, client) = setup().await;

    // No mock mounted: the slot check must fail before any request is sent.
    let result = client
        .write_value("/120/10111/0/0/12130", 1.0, Some(97), None)
        .await;

    assert!(matches!(result, Err(Error::InvalidSlot { value: 97 })));
    drop(server);
}

// ── Faults ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_faults() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/user/errors"))
        .respond_with(xml_response(
            r#"<eta version="1.0">
                 <errors uri="/user/errors">
                   <fub uri="/120/10111" name="Boiler">
                     <error msg="Water pressure low" priority="Warning" time="2011-06-29 12:47">Fill water</error>
                   </fub>
                 </errors>
               </eta>"#,
        ))
        .mount(&server)
        .await;

    let faults = client.fetch_faults().await.unwrap();

    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0].msg, "Water pressure low");
    assert_eq!(faults[0].source, "Boiler");
    assert_eq!(faults[0].time.to_string(), "2011-06-29 12:47:00");
}

// ── Transport errors ────────────────────────────────────────────────

#[tokio::test]
async fn test_connection_failure_is_transport_error() {
    let (server, client) = setup().await;
    drop(server); // shut the mock server down

    let result = client.fetch_menu().await;
    match result {
        Err(err @ Error::Transport(_)) => assert!(err.is_transient()),
        other => panic!("expected Transport error, got: {other:?}"),
    }
}
