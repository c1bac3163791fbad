//! ECB daily reference rates
//!
//! `eurofxref-daily.xml` lists how many units of each currency one euro
//! buys. Loaded once at startup and kept for the process lifetime.

use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::Client;
use shared::{AppError, AppResult, ErrorCode};
use std::collections::HashMap;

/// Download and parse the daily rate table
pub async fn fetch_daily_rates(url: &str) -> AppResult<HashMap<String, f64>> {
    let response = Client::new()
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::network(format!("ECB request failed: {e}")))?;

    if !response.status().is_success() {
        return Err(AppError::rate_unavailable(format!(
            "ECB rates unavailable: status {}",
            response.status()
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| AppError::network(format!("Failed to read ECB response: {e}")))?;

    parse_daily_rates(&body)
}

/// Collect every `<Cube currency=".." rate=".."/>` element
pub fn parse_daily_rates(xml: &str) -> AppResult<HashMap<String, f64>> {
    let mut reader = Reader::from_str(xml);
    let mut rates = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) if e.local_name().as_ref() == b"Cube" => {
                let mut currency = None;
                let mut rate = None;
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| xml_error(e.to_string()))?;
                    let value = std::str::from_utf8(&attr.value)
                        .map_err(|e| xml_error(e.to_string()))?
                        .to_string();
                    match attr.key.as_ref() {
                        b"currency" => currency = Some(value),
                        b"rate" => rate = Some(value),
                        _ => {}
                    }
                }

                // The enclosing time cube has neither attribute
                if let (Some(currency), Some(rate)) = (currency, rate) {
                    let rate: f64 = rate
                        .parse()
                        .map_err(|_| xml_error(format!("bad rate {rate:?} for {currency}")))?;
                    rates.insert(currency.to_uppercase(), rate);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e.to_string())),
            _ => {}
        }
    }

    if rates.is_empty() {
        return Err(AppError::rate_unavailable("ECB response contains no rates"));
    }
    Ok(rates)
}

fn xml_error(msg: String) -> AppError {
    AppError::with_message(
        ErrorCode::RateUnavailable,
        format!("Malformed ECB rate table: {msg}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gesmes:Envelope xmlns:gesmes="http://www.gesmes.org/xml/2002-08-01" xmlns="http://www.ecb.int/vocabulary/2002-08-01/eurofxref">
	<gesmes:subject>Reference rates</gesmes:subject>
	<Cube>
		<Cube time='2024-05-02'>
			<Cube currency='USD' rate='1.0712'/>
			<Cube currency='GBP' rate='0.85553'/>
			<Cube currency='CHF' rate='0.9777'/>
		</Cube>
	</Cube>
</gesmes:Envelope>"#;

    #[test]
    fn test_parse_sample() {
        let rates = parse_daily_rates(SAMPLE).unwrap();
        assert_eq!(rates.len(), 3);
        assert_eq!(rates.get("GBP"), Some(&0.85553));
        assert_eq!(rates.get("CHF"), Some(&0.9777));
    }

    #[test]
    fn test_parse_rejects_bad_rate() {
        let xml = "<Cube><Cube currency='GBP' rate='abc'/></Cube>";
        let err = parse_daily_rates(xml).unwrap_err();
        assert_eq!(err.code, ErrorCode::RateUnavailable);
    }

    #[test]
    fn test_parse_rejects_empty_table() {
        assert!(parse_daily_rates("<Cube><Cube time='2024-05-02'/></Cube>").is_err());
    }
}
