//! Hardware event listener
//!
//! Drives the bus event loop, decodes daemon events once and forwards the
//! typed result to the orchestrator.

use kiosk_bus::{BusEventLoop, BusMessage};
use shared::HardwareEvent;
use shared::message::DecodeError;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Pause before polling again after a connection error
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

pub struct HardwareListener {
    events: BusEventLoop,
    tx: mpsc::Sender<HardwareEvent>,
}

impl HardwareListener {
    pub fn new(events: BusEventLoop, tx: mpsc::Sender<HardwareEvent>) -> Self {
        Self { events, tx }
    }

    pub async fn run(mut self, shutdown: CancellationToken) {
        tracing::info!("Hardware listener started");

        loop {
            let result = tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Hardware listener received shutdown signal");
                    break;
                }
                result = self.events.next_message() => result,
            };

            match result {
                Ok(msg) => {
                    let Some(event) = decode(&msg) else {
                        continue;
                    };
                    if self.tx.send(event).await.is_err() {
                        tracing::info!("Orchestrator gone, hardware listener stopping");
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Hardware bus connection error");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }
}

/// Decode one bus message; other daemons' events and garbage are dropped
fn decode(msg: &BusMessage) -> Option<HardwareEvent> {
    match HardwareEvent::decode(&msg.payload) {
        Ok(event) => {
            tracing::info!(topic = %msg.topic, kind = event.kind(), "Hardware event");
            Some(event)
        }
        Err(DecodeError::UnsupportedEvent(kind)) => {
            tracing::debug!(topic = %msg.topic, kind = %kind, "Ignoring hardware event");
            None
        }
        Err(e) => {
            tracing::warn!(topic = %msg.topic, error = %e, "Discarding malformed hardware message");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::MoneyInData;

    fn message(payload: &str) -> BusMessage {
        BusMessage {
            topic: "events".into(),
            payload: payload.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_decode_money_in() {
        let event = decode(&message(
            r#"{"event":"moneyin","data":{"currency":"EUR","amount":500}}"#,
        ));
        assert_eq!(
            event,
            Some(HardwareEvent::MoneyIn(MoneyInData {
                currency: "EUR".into(),
                amount: 500,
            }))
        );
    }

    #[test]
    fn test_decode_drops_unknown_and_malformed() {
        assert_eq!(decode(&message(r#"{"event":"door_open","data":{}}"#)), None);
        assert_eq!(decode(&message("not json")), None);
        assert_eq!(
            decode(&message(r#"{"event":"codescan","data":{"scan":"%%%"}}"#)),
            None
        );
    }
}
