//! Location picker against a mock geocoding service

use std::sync::Arc;

use mockito::Matcher;
use tripshare::config::GeocodingConfig;
use tripshare::{LocationPicker, NominatimClient, SearchState, SelectionState};

fn geocoding_config(server: &mockito::Server) -> GeocodingConfig {
    GeocodingConfig {
        search_url: format!("{}/search", server.url()),
        reverse_url: format!("{}/reverse", server.url()),
        min_request_interval_ms: 0,
        max_retries: 0,
        debounce_ms: 300,
        ..GeocodingConfig::default()
    }
}

#[tokio::test]
async fn test_typing_then_choosing_a_result() {
    let mut server = mockito::Server::new_async().await;
    let search = server
        .mock("GET", "/search")
        .match_query(Matcher::UrlEncoded("q".into(), "Smith Rock".into()))
        .with_status(200)
        .with_body(
            r#"[{"lat": "44.3664842", "lon": "-121.1403312", "display_name": "Smith Rock State Park, Deschutes County, Oregon, United States"}]"#,
        )
        .expect(1)
        .create_async()
        .await;

    let config = geocoding_config(&server);
    let client = Arc::new(NominatimClient::new(config.clone()).unwrap());
    let mut picker = LocationPicker::new(client, &config);

    picker.type_query("Sm");
    picker.type_query("Smith");
    picker.type_query("Smith Rock");

    let mut candidates = Vec::new();
    for _ in 0..50 {
        if let SearchState::ResultsShown { candidates: found, .. } = picker.search_state() {
            candidates = found;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    assert_eq!(candidates.len(), 1);

    let location = picker.choose_result(&candidates[0]).unwrap();
    assert_eq!(location.latitude(), 44.366_484);
    assert_eq!(location.longitude(), -121.140_331);
    assert_eq!(
        picker.query(),
        "Smith Rock State Park, Deschutes County, Oregon, United States"
    );

    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    search.assert_async().await;
}

#[tokio::test]
async fn test_map_click_backfills_address() {
    let mut server = mockito::Server::new_async().await;
    let reverse = server
        .mock("GET", "/reverse")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("lat".into(), "45.373512".into()),
            Matcher::UrlEncoded("lon".into(), "-121.695932".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"address": {"road": "Timberline Highway", "village": "Government Camp", "state": "Oregon", "country": "United States"}}"#,
        )
        .create_async()
        .await;

    let config = geocoding_config(&server);
    let client = Arc::new(NominatimClient::new(config.clone()).unwrap());
    let mut picker = LocationPicker::new(client, &config);

    let clicked = picker.click_map(45.373_512_4, -121.695_932_1).unwrap();
    assert_eq!(clicked.address(), "");

    let location = picker.resolved_location().await.unwrap();
    reverse.assert_async().await;
    assert_eq!(
        location.address(),
        "Timberline Highway, Government Camp, Oregon, United States"
    );
    assert_eq!(picker.query(), location.address());
}

#[tokio::test]
async fn test_map_click_survives_service_outage() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/reverse")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let config = geocoding_config(&server);
    let client = Arc::new(NominatimClient::new(config.clone()).unwrap());
    let mut picker = LocationPicker::new(client, &config);

    picker.click_map(44.5618, -123.2823).unwrap();
    let location = picker.resolved_location().await.unwrap();

    assert_eq!(location.latitude(), 44.5618);
    assert_eq!(location.longitude(), -123.2823);
    assert_eq!(location.address(), "");
    assert!(matches!(
        picker.selection(),
        SelectionState::ResolvedWithoutLabel(_)
    ));
}
