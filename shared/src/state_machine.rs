//! Pairing State Machine
//!
//! Gates the three-message PASE exchange. The exchange carries no real
//! cryptography; this machine only tracks which message is accepted next.

use std::net::SocketAddr;

use crate::pase;

/// Progress of the pairing exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairingState {
    /// No exchange in progress
    #[default]
    Idle,
    /// Parameters sent, waiting for Pake1
    AwaitingPake1,
    /// Pake2 sent, waiting for Pake3
    AwaitingPake3,
    /// Exchange finished
    Complete,
}

impl PairingState {
    /// Numeric pairing step: 0 before Pake1, 1 before Pake3, 2 when done
    pub fn step(&self) -> u8 {
        match self {
            PairingState::Idle | PairingState::AwaitingPake1 => 0,
            PairingState::AwaitingPake3 => 1,
            PairingState::Complete => 2,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, PairingState::AwaitingPake1 | PairingState::AwaitingPake3)
    }
}

/// Messages that drive the pairing exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingEvent {
    /// PBKDFParamRequest from a commissioner
    ParamRequest { peer: SocketAddr },
    /// PASE Pake1
    Pake1,
    /// PASE Pake3
    Pake3,
}

/// Result of a state transition attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition was valid and state changed (or was re-entered)
    Success(PairingState),
    /// Message arrived out of order; nothing changed
    Invalid {
        from: PairingState,
        event: PairingEvent,
    },
}

/// The pairing sub-record of the device state
#[derive(Debug, Clone, Default)]
pub struct PairingStateMachine {
    state: PairingState,
    session_id: u16,
    peer: Option<SocketAddr>,
}

impl PairingStateMachine {
    /// Create a new state machine in Idle state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PairingState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn step(&self) -> u8 {
        self.state.step()
    }

    pub fn session_id(&self) -> u16 {
        self.session_id
    }

    /// Address of the commissioner that started the current exchange
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Process an event and return the transition result
    pub fn process_event(&mut self, event: PairingEvent) -> TransitionResult {
        use PairingState::*;

        let next = match (&event, self.state) {
            // A parameter request always restarts the exchange
            (PairingEvent::ParamRequest { peer }, _) => {
                self.session_id = pase::SESSION_ID;
                self.peer = Some(*peer);
                Some(AwaitingPake1)
            }
            (PairingEvent::Pake1, AwaitingPake1 | AwaitingPake3) => Some(AwaitingPake3),
            (PairingEvent::Pake3, AwaitingPake3) => Some(Complete),
            _ => None,
        };

        match next {
            Some(state) => {
                self.state = state;
                TransitionResult::Success(state)
            }
            None => TransitionResult::Invalid {
                from: self.state,
                event,
            },
        }
    }

    /// Abandon any exchange in progress
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "192.168.1.20:40000".parse().unwrap()
    }

    #[test]
    fn test_initial_state() {
        let fsm = PairingStateMachine::new();
        assert_eq!(fsm.state(), PairingState::Idle);
        assert!(!fsm.is_active());
        assert_eq!(fsm.step(), 0);
        assert_eq!(fsm.peer(), None);
    }

    #[test]
    fn test_normal_pairing_flow() {
        let mut fsm = PairingStateMachine::new();

        let result = fsm.process_event(PairingEvent::ParamRequest { peer: peer() });
        assert_eq!(result, TransitionResult::Success(PairingState::AwaitingPake1));
        assert!(fsm.is_active());
        assert_eq!(fsm.step(), 0);
        assert_eq!(fsm.session_id(), 0x1234);
        assert_eq!(fsm.peer(), Some(peer()));

        let result = fsm.process_event(PairingEvent::Pake1);
        assert_eq!(result, TransitionResult::Success(PairingState::AwaitingPake3));
        assert_eq!(fsm.step(), 1);

        let result = fsm.process_event(PairingEvent::Pake3);
        assert_eq!(result, TransitionResult::Success(PairingState::Complete));
        assert!(!fsm.is_active());
        assert_eq!(fsm.step(), 2);
    }

    #[test]
    fn test_pake3_before_pake1_is_invalid() {
        let mut fsm = PairingStateMachine::new();
        fsm.process_event(PairingEvent::ParamRequest { peer: peer() });

        let result = fsm.process_event(PairingEvent::Pake3);
        assert!(matches!(
            result,
            TransitionResult::Invalid {
                from: PairingState::AwaitingPake1,
                ..
            }
        ));
        assert!(fsm.is_active());
        assert_eq!(fsm.step(), 0);
    }

    #[test]
    fn test_messages_without_exchange_are_invalid() {
        let mut fsm = PairingStateMachine::new();
        assert!(matches!(
            fsm.process_event(PairingEvent::Pake1),
            TransitionResult::Invalid { .. }
        ));
        assert!(matches!(
            fsm.process_event(PairingEvent::Pake3),
            TransitionResult::Invalid { .. }
        ));
        assert_eq!(fsm.state(), PairingState::Idle);
    }

    #[test]
    fn test_completed_exchange_rejects_further_pake_messages() {
        let mut fsm = PairingStateMachine::new();
        fsm.process_event(PairingEvent::ParamRequest { peer: peer() });
        fsm.process_event(PairingEvent::Pake1);
        fsm.process_event(PairingEvent::Pake3);

        assert!(matches!(
            fsm.process_event(PairingEvent::Pake1),
            TransitionResult::Invalid { from: PairingState::Complete, .. }
        ));
        assert_eq!(fsm.step(), 2);
    }

    #[test]
    fn test_param_request_restarts_exchange() {
        let mut fsm = PairingStateMachine::new();
        fsm.process_event(PairingEvent::ParamRequest { peer: peer() });
        fsm.process_event(PairingEvent::Pake1);
        assert_eq!(fsm.step(), 1);

        let other: SocketAddr = "10.0.0.9:5000".parse().unwrap();
        let result = fsm.process_event(PairingEvent::ParamRequest { peer: other });
        assert_eq!(result, TransitionResult::Success(PairingState::AwaitingPake1));
        assert_eq!(fsm.step(), 0);
        assert_eq!(fsm.peer(), Some(other));
    }

    #[test]
    fn test_repeated_pake1_stays_on_step_one() {
        let mut fsm = PairingStateMachine::new();
        fsm.process_event(PairingEvent::ParamRequest { peer: peer() });
        fsm.process_event(PairingEvent::Pake1);
        let result = fsm.process_event(PairingEvent::Pake1);
        assert_eq!(result, TransitionResult::Success(PairingState::AwaitingPake3));
        assert_eq!(fsm.step(), 1);
    }

    #[test]
    fn test_reset() {
        let mut fsm = PairingStateMachine::new();
        fsm.process_event(PairingEvent::ParamRequest { peer: peer() });
        fsm.reset();
        assert_eq!(fsm.state(), PairingState::Idle);
        assert_eq!(fsm.session_id(), 0);
    }
}
