//! SmartLamp Shared Protocol Types
//!
//! This crate provides the TLV codec, protocol constants and pairing state
//! machine shared between the lamp firmware and host-side tooling.

pub mod client;
pub mod codec;
pub mod state_machine;

/// The literal acknowledgement sent for commands without a data response
pub const ACK: &[u8; 3] = b"ACK";

/// Cluster identifiers handled by the device
pub mod cluster {
    /// Pairing (secure channel) pseudo-cluster
    pub const PAIRING: u16 = 0x0000;
    pub const IDENTIFY: u16 = 0x0003;
    pub const ON_OFF: u16 = 0x0006;
    pub const LEVEL_CONTROL: u16 = 0x0008;
    pub const DESCRIPTOR: u16 = 0x001D;
    pub const BASIC_INFORMATION: u16 = 0x0028;
}

/// Command identifiers, grouped per cluster
pub mod command {
    pub mod on_off {
        pub const OFF: u8 = 0x00;
        pub const ON: u8 = 0x01;
        /// Write attribute; toggles when no delayed-off attribute is given
        pub const WRITE_ATTRIBUTE: u8 = 0x02;
        pub const READ_ATTRIBUTE: u8 = 0x03;
    }

    pub mod identify {
        pub const IDENTIFY: u8 = 0x00;
    }

    pub mod level {
        pub const READ_ATTRIBUTE: u8 = 0x03;
        pub const MOVE_TO_LEVEL: u8 = 0x04;
    }

    /// Descriptor and basic information both answer a single read command
    pub const READ_INFO: u8 = 0x01;
}

/// Attribute identifiers
pub mod attribute {
    /// Level control CurrentLevel
    pub const CURRENT_LEVEL: u16 = 0x0000;
    /// On/Off delayed-off countdown in seconds
    pub const DELAYED_OFF: u16 = 0x4001;
}

/// Context tags used by requests and responses
pub mod tag {
    pub const ENDPOINT: u8 = 0;
    pub const CLUSTER: u8 = 1;
    pub const COMMAND: u8 = 2;
    pub const LEVEL: u8 = 3;
    pub const ATTRIBUTE_ID: u8 = 4;
    pub const VALUE: u8 = 5;
    /// Identify duration, carried as a 2-byte value next to the 1-byte endpoint
    pub const IDENTIFY_TIME: u8 = 0;
}

/// Secure channel opcodes for the stubbed PASE exchange
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaseOpcode {
    PbkdfParamRequest = 0x01,
    PbkdfParamResponse = 0x02,
    Pake1 = 0x03,
    Pake2 = 0x04,
    Pake3 = 0x05,
}

impl PaseOpcode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::PbkdfParamRequest),
            0x02 => Some(Self::PbkdfParamResponse),
            0x03 => Some(Self::Pake1),
            0x04 => Some(Self::Pake2),
            0x05 => Some(Self::Pake3),
            _ => None,
        }
    }
}

/// Static values reported by the descriptor and basic information clusters
pub mod identity {
    pub const VENDOR_ID: u16 = 0xFFF1;
    pub const PRODUCT_ID: u16 = 0x8000;
    /// Dimmable light
    pub const DEVICE_TYPE: u16 = 0x0101;
    pub const SOFTWARE_VERSION_MAJOR: u8 = 0;
    pub const ROOT_ENDPOINT: u8 = 0;

    /// Server clusters listed by the descriptor, little-endian u16 pairs
    pub const SERVER_CLUSTER_LIST: [u8; 8] = [0x06, 0x00, 0x08, 0x00, 0x1D, 0x00, 0x28, 0x00];
}

/// Placeholder parameters for the non-cryptographic pairing exchange
pub mod pase {
    pub const SESSION_ID: u16 = 0x1234;
    pub const PBKDF_ITERATIONS_FIELD: u8 = 0x20;
    pub const PBKDF_PARAMS_FIELD: u8 = 0x03;
    pub const SALT_LEN: usize = 16;
    /// Length of the zero-filled Pake2 body following the opcode byte
    pub const PAKE2_PAYLOAD_LEN: usize = 65;
}

/// Timing parameters for the background behaviours
pub mod timing {
    use std::time::Duration;

    /// Half period of the identify blink
    pub const BLINK_HALF_PERIOD: Duration = Duration::from_millis(83);

    /// Number of blink half-cycles per identify second
    pub const BLINK_HALF_CYCLES_PER_SECOND: u32 = 6;

    /// Brightness used by On/Toggle and identify when the stored level is zero
    pub const DEFAULT_ON_LEVEL: u8 = 127;
}

/// Static discovery table published by the advertisement collaborator
pub mod discovery {
    pub const SERVICE_TYPE: &str = "_matter._udp";
    pub const HOSTNAME: &str = "smartlamp";
    pub const PORT: u16 = 5540;

    pub const DISCRIMINATOR: u16 = 4520;
    pub const PASSCODE: u32 = 20202021;

    /// TXT records, in publication order
    pub const TXT_RECORDS: &[(&str, &str)] = &[
        ("VP", "0xFFF1+0x8000"),
        ("DT", "0x0101"),
        ("CM", "2"),
        ("DN", "SmartLamp"),
        ("SII", "4520"),
        ("CRI", "300"),
        ("PI", "20202021"),
    ];

    /// Look up a TXT record value by key
    pub fn txt(key: &str) -> Option<&'static str> {
        TXT_RECORDS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// Manual pairing string printed next to the QR code by host tooling
    pub fn onboarding_payload() -> String {
        format!(
            "MT:{:04X}-{:04X}:{}:{}",
            super::identity::VENDOR_ID,
            super::identity::PRODUCT_ID,
            DISCRIMINATOR,
            PASSCODE
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_onboarding_payload() {
        assert_eq!(discovery::onboarding_payload(), "MT:FFF1-8000:4520:20202021");
    }

    #[test]
    fn test_txt_lookup() {
        assert_eq!(discovery::txt("DN"), Some("SmartLamp"));
        assert_eq!(discovery::txt("PI"), Some("20202021"));
        assert_eq!(discovery::txt("XX"), None);
        assert_eq!(discovery::TXT_RECORDS.len(), 7);
    }

    #[test]
    fn test_pase_opcode_from_u8() {
        assert_eq!(PaseOpcode::from_u8(0x01), Some(PaseOpcode::PbkdfParamRequest));
        assert_eq!(PaseOpcode::from_u8(0x05), Some(PaseOpcode::Pake3));
        assert_eq!(PaseOpcode::from_u8(0x06), None);
    }
}
