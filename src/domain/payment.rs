use serde::Serialize;

use super::errors::DomainError;

/// Two-phase payment acknowledgment lifecycle of an order.
///
/// `Created` -> `BuyerMarkedPaid` -> `OperatorConfirmedReceived`. The last
/// state is terminal and no transition skips `BuyerMarkedPaid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    Created,
    BuyerMarkedPaid,
    OperatorConfirmedReceived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The order moved into the given state.
    Applied(PaymentState),
    /// The order was already in (or past) the target state; nothing changes.
    Unchanged,
}

impl PaymentState {
    /// Derive the state from the persisted flags. `None` when the flags
    /// violate "received implies done".
    pub fn from_flags(payment_done: bool, payment_received: bool) -> Option<Self> {
        match (payment_done, payment_received) {
            (false, false) => Some(PaymentState::Created),
            (true, false) => Some(PaymentState::BuyerMarkedPaid),
            (true, true) => Some(PaymentState::OperatorConfirmedReceived),
            (false, true) => None,
        }
    }

    /// Buyer reports the payment as done.
    pub fn mark_paid(self) -> Transition {
        match self {
            PaymentState::Created => Transition::Applied(PaymentState::BuyerMarkedPaid),
            PaymentState::BuyerMarkedPaid | PaymentState::OperatorConfirmedReceived => {
                Transition::Unchanged
            }
        }
    }

    /// Operator confirms the money arrived.
    pub fn confirm_received(self) -> Result<Transition, DomainError> {
        match self {
            PaymentState::Created => Err(DomainError::InvalidStateTransition {
                from: self,
                to: PaymentState::OperatorConfirmedReceived,
            }),
            PaymentState::BuyerMarkedPaid => {
                Ok(Transition::Applied(PaymentState::OperatorConfirmedReceived))
            }
            PaymentState::OperatorConfirmedReceived => Ok(Transition::Unchanged),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_states() {
        assert_eq!(PaymentState::from_flags(false, false), Some(PaymentState::Created));
        assert_eq!(
            PaymentState::from_flags(true, false),
            Some(PaymentState::BuyerMarkedPaid)
        );
        assert_eq!(
            PaymentState::from_flags(true, true),
            Some(PaymentState::OperatorConfirmedReceived)
        );
        assert_eq!(PaymentState::from_flags(false, true), None);
    }

    #[test]
    fn mark_paid_is_idempotent() {
        assert_eq!(
            PaymentState::Created.mark_paid(),
            Transition::Applied(PaymentState::BuyerMarkedPaid)
        );
        assert_eq!(PaymentState::BuyerMarkedPaid.mark_paid(), Transition::Unchanged);
        assert_eq!(
            PaymentState::OperatorConfirmedReceived.mark_paid(),
            Transition::Unchanged
        );
    }

    #[test]
    fn confirm_received_requires_buyer_payment() {
        let err = PaymentState::Created.confirm_received().unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidStateTransition {
                from: PaymentState::Created,
                to: PaymentState::OperatorConfirmedReceived,
            }
        ));
    }

    #[test]
    fn confirm_received_moves_to_terminal_state_once() {
        assert_eq!(
            PaymentState::BuyerMarkedPaid.confirm_received().unwrap(),
            Transition::Applied(PaymentState::OperatorConfirmedReceived)
        );
        assert_eq!(
            PaymentState::OperatorConfirmedReceived
                .confirm_received()
                .unwrap(),
            Transition::Unchanged
        );
    }

    #[test]
    fn state_serializes_as_snake_case() {
        let json = serde_json::to_string(&PaymentState::BuyerMarkedPaid).unwrap();
        assert_eq!(json, "\"buyer_marked_paid\"");
    }
}
