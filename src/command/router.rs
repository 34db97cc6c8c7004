//! Maps decoded datagrams to device actions

use smartlamp_shared::codec::DecodedMessage;
use smartlamp_shared::command::{identify, level, on_off, READ_INFO};
use smartlamp_shared::{cluster, identity, tag, PaseOpcode};

/// A recognised request, with absent fields already defaulted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    On,
    Off,
    /// Arms the delayed-off countdown for attribute 0x4001, toggles otherwise
    WriteOnOff { attribute: u16, value: u16 },
    ReadOnOff { attribute: u16 },
    Identify { seconds: u16 },
    MoveToLevel { level: u8 },
    ReadLevel { attribute: u16 },
    ReadDescriptor,
    ReadBasicInfo,
    ParamRequest,
    Pake1,
    Pake3,
}

/// Pick the action for a message; `None` means no response and no mutation
///
/// The On/Off cluster is only served on the root endpoint. Other clusters
/// ignore the endpoint.
pub fn route(message: &DecodedMessage) -> Option<Action> {
    let cluster_id = message.uint16(tag::CLUSTER)?;
    let command_id = message.uint8(tag::COMMAND)?;
    let attribute = message.uint16(tag::ATTRIBUTE_ID).unwrap_or(0);

    let action = match cluster_id {
        cluster::ON_OFF => {
            if message.uint8(tag::ENDPOINT) != Some(identity::ROOT_ENDPOINT) {
                return None;
            }
            match command_id {
                on_off::ON => Action::On,
                on_off::OFF => Action::Off,
                on_off::WRITE_ATTRIBUTE => Action::WriteOnOff {
                    attribute,
                    value: message.uint16(tag::VALUE).unwrap_or(0),
                },
                on_off::READ_ATTRIBUTE => Action::ReadOnOff { attribute },
                _ => return None,
            }
        }
        cluster::IDENTIFY if command_id == identify::IDENTIFY => Action::Identify {
            seconds: message.uint16(tag::IDENTIFY_TIME).unwrap_or(0),
        },
        cluster::LEVEL_CONTROL => match command_id {
            level::MOVE_TO_LEVEL => Action::MoveToLevel {
                level: message.uint8(tag::LEVEL).unwrap_or(0),
            },
            level::READ_ATTRIBUTE => Action::ReadLevel { attribute },
            _ => return None,
        },
        cluster::DESCRIPTOR if command_id == READ_INFO => Action::ReadDescriptor,
        cluster::BASIC_INFORMATION if command_id == READ_INFO => Action::ReadBasicInfo,
        cluster::PAIRING => match PaseOpcode::from_u8(command_id)? {
            PaseOpcode::PbkdfParamRequest => Action::ParamRequest,
            PaseOpcode::Pake1 => Action::Pake1,
            PaseOpcode::Pake3 => Action::Pake3,
            PaseOpcode::PbkdfParamResponse | PaseOpcode::Pake2 => return None,
        },
        _ => return None,
    };

    Some(action)
}
