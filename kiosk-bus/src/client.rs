//! MQTT connection to the kiosk hardware bus
//!
//! ```text
//! BusClient ──publish (QoS 2)──▶ broker ──▶ codescannerd / moneyacceptord
//!     ▲
//!     │ connected flag (watch)
//!     │
//! BusEventLoop ◀── publish ── broker ◀── daemon events
//! ```
//!
//! [`connect`] returns two halves: a cloneable [`BusClient`] for commands and
//! a [`BusEventLoop`] that must be polled continuously to keep the connection
//! alive and to receive daemon events.

use crate::command::{self, Command};
use crate::error::{BusError, BusResult};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Request queue capacity between client handles and the event loop
const REQUEST_CAPACITY: usize = 16;

/// Bus connection settings
#[derive(Debug, Clone)]
pub struct BusConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    /// Topics the daemons publish their events on
    pub topics: Vec<String>,
    /// Max wait for a live broker connection before a command fails
    pub ready_timeout: Duration,
    pub keep_alive: Duration,
}

impl BusConfig {
    pub fn new(host: impl Into<String>, port: u16, client_id: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            client_id: client_id.into(),
            topics: Vec::new(),
            ready_timeout: Duration::from_secs(5),
            keep_alive: Duration::from_secs(5),
        }
    }

    pub fn with_topics(mut self, topics: Vec<String>) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }
}

/// Raw message received from the bus
#[derive(Debug, Clone)]
pub struct BusMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Command side of the bus connection
#[derive(Debug, Clone)]
pub struct BusClient {
    client: AsyncClient,
    connected: watch::Receiver<bool>,
    ready_timeout: Duration,
}

/// Event side of the bus connection
pub struct BusEventLoop {
    eventloop: EventLoop,
    client: AsyncClient,
    topics: Vec<String>,
    connected: watch::Sender<bool>,
}

/// Create both halves of a bus connection
///
/// Nothing touches the network until [`BusEventLoop::next_message`] is polled.
pub fn connect(config: &BusConfig) -> BusResult<(BusClient, BusEventLoop)> {
    if config.host.is_empty() {
        return Err(BusError::InvalidConfig("empty broker host".to_string()));
    }

    let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
    options.set_keep_alive(config.keep_alive);

    let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
    let (connected_tx, connected_rx) = watch::channel(false);

    let bus_client = BusClient {
        client: client.clone(),
        connected: connected_rx,
        ready_timeout: config.ready_timeout,
    };
    let bus_loop = BusEventLoop {
        eventloop,
        client,
        topics: config.topics.clone(),
        connected: connected_tx,
    };

    Ok((bus_client, bus_loop))
}

impl BusClient {
    /// Whether the broker connection is currently up
    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Send a start/stop command to a daemon
    ///
    /// Waits up to `ready_timeout` for the broker connection, then queues a
    /// QoS 2 publish. `Ok` means the event loop accepted the request; the
    /// broker handshake (PubRec/PubComp) completes later inside
    /// [`BusEventLoop::next_message`].
    #[instrument(skip(self), fields(service = %service, cmd = %cmd))]
    pub async fn send_command(&self, service: &str, cmd: Command) -> BusResult<()> {
        self.await_connection().await?;

        let payload = command::encode(cmd)?;
        self.client
            .publish(service, QoS::ExactlyOnce, false, payload)
            .await
            .map_err(|e| BusError::Publish(e.to_string()))?;

        info!("Queued command for delivery");
        Ok(())
    }

    async fn await_connection(&self) -> BusResult<()> {
        let mut connected = self.connected.clone();
        match tokio::time::timeout(self.ready_timeout, connected.wait_for(|up| *up)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => Err(BusError::Connection("bus event loop stopped".to_string())),
            Err(_) => Err(BusError::Timeout(format!(
                "broker not ready after {:?}",
                self.ready_timeout
            ))),
        }
    }
}

impl BusEventLoop {
    /// Drive the connection until the next daemon event arrives
    ///
    /// Connection errors are returned to the caller; polling again afterwards
    /// reconnects.
    pub async fn next_message(&mut self) -> BusResult<BusMessage> {
        loop {
            let event = match self.eventloop.poll().await {
                Ok(event) => event,
                Err(e) => {
                    self.connected.send_replace(false);
                    return Err(BusError::Connection(e.to_string()));
                }
            };

            match event {
                Event::Incoming(Packet::ConnAck(_)) => {
                    info!("MQTT connection up");
                    self.subscribe_all();
                    self.connected.send_replace(true);
                }
                Event::Incoming(Packet::Publish(publish)) => {
                    debug!(topic = %publish.topic, len = publish.payload.len(), "Bus message");
                    return Ok(BusMessage {
                        topic: publish.topic,
                        payload: publish.payload.to_vec(),
                    });
                }
                Event::Incoming(Packet::PubComp(ack)) => {
                    debug!(pkid = ack.pkid, "Broker confirmed command delivery");
                }
                Event::Incoming(Packet::Disconnect) => {
                    warn!("Server requested disconnect");
                    self.connected.send_replace(false);
                }
                _ => {}
            }
        }
    }

    /// Broker sessions are clean, so topics are re-subscribed on every ConnAck
    fn subscribe_all(&self) {
        for topic in &self.topics {
            if let Err(e) = self.client.try_subscribe(topic.as_str(), QoS::ExactlyOnce) {
                warn!(topic = %topic, error = %e, "Failed to subscribe, events on this topic will be missed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_rejects_empty_host() {
        let config = BusConfig::new("", 1883, "atm");
        assert!(matches!(connect(&config), Err(BusError::InvalidConfig(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_times_out_without_broker() {
        let config = BusConfig::new("127.0.0.1", 1883, "atm")
            .with_ready_timeout(Duration::from_secs(5));
        let (client, _event_loop) = connect(&config).unwrap();

        assert!(!client.is_connected());
        let result = client.send_command("codescannerd", Command::Start).await;
        assert!(matches!(result, Err(BusError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_command_fails_when_event_loop_dropped() {
        let config = BusConfig::new("127.0.0.1", 1883, "atm");
        let (client, event_loop) = connect(&config).unwrap();
        drop(event_loop);

        let result = client.send_command("moneyacceptord", Command::Stop).await;
        assert!(matches!(result, Err(BusError::Connection(_))));
    }
}
