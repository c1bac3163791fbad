//! Hardware command dispatch over the kiosk bus

use async_trait::async_trait;
use kiosk_bus::{BusClient, BusError, Command};
use shared::message::HardwareService;
use shared::{AppError, AppResult, ErrorCode};

use crate::orchestrator::ports::HardwareCommander;

/// [`HardwareCommander`] backed by the MQTT bus
#[derive(Debug, Clone)]
pub struct BusCommander {
    client: BusClient,
}

impl BusCommander {
    pub fn new(client: BusClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HardwareCommander for BusCommander {
    async fn command(&self, service: HardwareService, cmd: Command) -> AppResult<()> {
        self.client
            .send_command(service.topic(), cmd)
            .await
            .map_err(|e| bus_error(service, cmd, e))
    }
}

fn bus_error(service: HardwareService, cmd: Command, e: BusError) -> AppError {
    let code = match e {
        BusError::Timeout(_) | BusError::Connection(_) => ErrorCode::HardwareBusUnavailable,
        _ => ErrorCode::HardwareCommandFailed,
    };
    AppError::with_message(code, format!("{cmd} {service}: {e}"))
        .with_detail("service", service.topic())
        .with_detail("cmd", cmd.to_string())
}
