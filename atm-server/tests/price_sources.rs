//! Kraken and ECB clients against a mocked HTTP server

use atm_server::pricing::{self, KrakenClient, PriceService, ecb};
use mockito::Matcher;
use shared::ErrorCode;
use std::collections::HashMap;
use std::sync::Arc;

const ECB_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gesmes:Envelope xmlns:gesmes="http://www.gesmes.org/xml/2002-08-01" xmlns="http://www.ecb.int/vocabulary/2002-08-01/eurofxref">
	<gesmes:subject>Reference rates</gesmes:subject>
	<gesmes:Sender><gesmes:name>European Central Bank</gesmes:name></gesmes:Sender>
	<Cube>
		<Cube time='2024-05-02'>
			<Cube currency='USD' rate='1.0712'/>
			<Cube currency='GBP' rate='0.85553'/>
		</Cube>
	</Cube>
</gesmes:Envelope>"#;

fn ticker(pair: &str, price: &str) -> String {
    format!(r#"{{"error":[],"result":{{"{pair}":{{"a":["1","1","1"],"c":["{price}","0.1"]}}}}}}"#)
}

async fn mock_ticker(server: &mut mockito::Server, currency: &str, price: &str) -> mockito::Mock {
    server
        .mock("GET", "/0/public/Ticker")
        .match_query(Matcher::UrlEncoded("pair".into(), format!("XMR{currency}")))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ticker(&format!("XXMRZ{currency}"), price))
        .create_async()
        .await
}

#[tokio::test]
async fn test_kraken_last_price() {
    let mut server = mockito::Server::new_async().await;
    let eur = mock_ticker(&mut server, "EUR", "150.25").await;

    let kraken = KrakenClient::new(server.url());
    assert_eq!(kraken.last_price("EUR").await.unwrap(), 150.25);
    eur.assert_async().await;
}

#[tokio::test]
async fn test_kraken_rejects_unlisted_pair_without_request() {
    let kraken = KrakenClient::new("http://127.0.0.1:1");
    let err = kraken.last_price("GBP").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::RateUnavailable);
}

#[tokio::test]
async fn test_kraken_api_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/0/public/Ticker")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"error":["EQuery:Unknown asset pair"],"result":{}}"#)
        .create_async()
        .await;

    let err = KrakenClient::new(server.url())
        .last_price("USD")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RateUnavailable);
    assert!(err.message.contains("Unknown asset pair"));
}

#[tokio::test]
async fn test_snapshot_from_kraken_and_ecb() {
    let mut server = mockito::Server::new_async().await;
    let _eur = mock_ticker(&mut server, "EUR", "100.0").await;
    let _usd = mock_ticker(&mut server, "USD", "110.0").await;
    let _ecb = server
        .mock("GET", "/eurofxref-daily.xml")
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(ECB_XML)
        .create_async()
        .await;

    let currencies = vec!["EUR".to_string(), "USD".to_string(), "GBP".to_string()];
    let cross = pricing::load_cross_rates(
        &["GBP".to_string()],
        None,
        &format!("{}/eurofxref-daily.xml", server.url()),
    )
    .await
    .unwrap();
    assert_eq!(cross, HashMap::from([("GBP".to_string(), 0.85553)]));

    let service = PriceService::new(Arc::new(KrakenClient::new(server.url())), currencies, cross, 0.0);
    let snapshot = service.snapshot().await.unwrap();

    let prices: HashMap<String, f64> = snapshot
        .currencies
        .into_iter()
        .map(|p| (p.short, p.amount))
        .collect();
    assert_eq!(prices["EUR"], 100.0);
    assert_eq!(prices["USD"], 110.0);
    assert_eq!(prices["GBP"], 100.0 * 0.85553);
}

#[tokio::test]
async fn test_unknown_currency_fails_each_cycle_not_startup() {
    let mut server = mockito::Server::new_async().await;
    let _eur = mock_ticker(&mut server, "EUR", "100.0").await;
    let _ecb = server
        .mock("GET", "/eurofxref-daily.xml")
        .with_status(200)
        .with_body(ECB_XML)
        .create_async()
        .await;

    let cross = pricing::load_cross_rates(
        &["GBP".to_string(), "XTS".to_string()],
        None,
        &format!("{}/eurofxref-daily.xml", server.url()),
    )
    .await
    .unwrap();
    assert!(cross.contains_key("GBP"));
    assert!(!cross.contains_key("XTS"));

    let currencies = vec!["EUR".to_string(), "GBP".to_string(), "XTS".to_string()];
    let service = PriceService::new(Arc::new(KrakenClient::new(server.url())), currencies, cross, 0.0);
    for _ in 0..2 {
        let err = service.snapshot().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CrossRateMissing);
    }
}

#[tokio::test]
async fn test_ecb_unavailable_is_fatal_for_cross_rates() {
    let mut server = mockito::Server::new_async().await;
    let _ecb = server
        .mock("GET", "/eurofxref-daily.xml")
        .with_status(503)
        .create_async()
        .await;

    let err = pricing::load_cross_rates(
        &["GBP".to_string()],
        None,
        &format!("{}/eurofxref-daily.xml", server.url()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::RateUnavailable);
}

#[tokio::test]
async fn test_ecb_fetch_and_parse() {
    let mut server = mockito::Server::new_async().await;
    let _ecb = server
        .mock("GET", "/daily.xml")
        .with_status(200)
        .with_body(ECB_XML)
        .create_async()
        .await;

    let rates = ecb::fetch_daily_rates(&format!("{}/daily.xml", server.url()))
        .await
        .unwrap();
    assert_eq!(rates.get("USD"), Some(&1.0712));
    assert_eq!(rates.len(), 2);
}
