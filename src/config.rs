//! Device configuration

use smartlamp_shared::discovery;
use tracing::warn;

/// Environment variable overriding the UDP bind address
pub const ENV_BIND: &str = "SMARTLAMP_BIND";

/// Large enough for any UDP payload, so datagrams are never cut short
pub const DEFAULT_RECV_BUFFER_SIZE: usize = u16::MAX as usize;

/// Runtime configuration for the lamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// UDP address the command socket binds to
    pub bind_address: String,
    /// Largest datagram accepted; longer ones are truncated by the socket
    pub recv_buffer_size: usize,
    /// Host name published in the discovery table
    pub hostname: String,
    /// PWM channel driving the LED
    pub pwm_channel: u8,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            bind_address: format!("0.0.0.0:{}", discovery::PORT),
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
            hostname: discovery::HOSTNAME.into(),
            pwm_channel: 0,
        }
    }
}

impl DeviceConfig {
    /// Defaults with overrides from the process environment
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; unparseable values are logged and ignored
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(bind) = lookup(ENV_BIND) {
            if bind.parse::<std::net::SocketAddr>().is_ok() {
                self.bind_address = bind;
            } else {
                warn!("Ignoring {}={:?}: not a socket address", ENV_BIND, bind);
            }
        }

        self
    }
}
