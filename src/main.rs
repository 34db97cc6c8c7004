mod command;
mod config;
mod device;
mod scheduler;
mod transport;

use std::sync::Arc;

use anyhow::Result;
use command::CommandDispatcher;
use config::DeviceConfig;
use device::{Actuator, Device, PwmActuator};
use scheduler::TimerScheduler;
use smartlamp_shared::discovery;
use tokio_util::sync::CancellationToken;
use transport::UdpTransport;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = DeviceConfig::from_env();
    info!("SmartLamp starting: {}", config.hostname);
    info!("  bind: {}", config.bind_address);

    let pwm = Arc::new(PwmActuator::new(config.pwm_channel));
    pwm.set_brightness(0);
    info!("PWM channel {} initialized (duty={})", pwm.channel(), pwm.duty());

    let device = Device::new(pwm);
    let scheduler = TimerScheduler::new(device.clone());
    let dispatcher = CommandDispatcher::new(device, scheduler);

    log_discovery_table(&config);

    let socket = UdpTransport::bind(&config.bind_address).await?;
    info!("UDP listening on {}", socket.local_addr()?);

    let shutdown = CancellationToken::new();
    let listener = transport::serve(
        &socket,
        &dispatcher,
        config.recv_buffer_size,
        shutdown.clone(),
    );
    tokio::pin!(listener);

    tokio::select! {
        result = &mut listener => {
            if let Err(e) = &result {
                error!("Listener failed: {:#}", e);
            }
            return result;
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
            shutdown.cancel();
        }
    }

    listener.await
}

/// Print the static discovery record published by the advertiser
fn log_discovery_table(config: &DeviceConfig) {
    info!(
        "Discovery: {}.{}.local port {}",
        config.hostname,
        discovery::SERVICE_TYPE,
        discovery::PORT
    );
    for (key, value) in discovery::TXT_RECORDS {
        info!("  TXT {}={}", key, value);
    }
    info!("Onboarding payload: {}", discovery::onboarding_payload());
}
