use crate::address::EthAddress;
use crate::identity::Identity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// On-chain lifecycle state of a membership slot.
///
/// Observed via contract queries, never mutated locally except at
/// registration. Transitions outside the predicates below are rejected
/// before any transaction is submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipState {
    Unregistered,
    Active,
    GracePeriod,
    ErasedAwaitsWithdrawal,
}

impl MembershipState {
    /// Extension re-activates a membership whose validity window lapsed.
    pub fn can_extend(&self) -> bool {
        matches!(self, MembershipState::GracePeriod)
    }

    /// Erasure ends a live membership early and frees its deposit.
    pub fn can_erase(&self) -> bool {
        matches!(self, MembershipState::Active | MembershipState::GracePeriod)
    }

    /// The deposit is only withdrawable once the membership is erased.
    pub fn can_withdraw(&self) -> bool {
        matches!(self, MembershipState::ErasedAwaitsWithdrawal)
    }
}

impl fmt::Display for MembershipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MembershipState::Unregistered => "Unregistered",
            MembershipState::Active => "Active",
            MembershipState::GracePeriod => "GracePeriod",
            MembershipState::ErasedAwaitsWithdrawal => "ErasedAwaitsWithdrawal",
        };
        write!(f, "{}", s)
    }
}

/// Mutable view of one membership's on-chain record.
///
/// Refreshed by query; a stored copy is only the snapshot taken at
/// registration time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub contract_address: EthAddress,
    pub chain_id: u64,
    pub tree_index: u64,
    /// Messages per epoch this membership may send.
    pub rate_limit: u32,
    pub start_block: u64,
    pub end_block: u64,
    /// Smallest token unit.
    pub deposit_amount: u128,
    pub active_duration: u64,
    pub grace_period_duration: u64,
    pub holder: EthAddress,
    pub token: EthAddress,
    pub state: MembershipState,
}

/// One stored credential: an identity bound to exactly one on-chain
/// membership slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub identity: Identity,
    pub membership: MembershipRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{IdCommitment, IdNullifier};

    fn record(state: MembershipState) -> MembershipRecord {
        MembershipRecord {
            contract_address: EthAddress::from_bytes([0x01; 20]),
            chain_id: 59141,
            tree_index: 7,
            rate_limit: 100,
            start_block: 1_000,
            end_block: 2_000,
            deposit_amount: 5_000_000_000_000_000_000,
            active_duration: 1_000,
            grace_period_duration: 100,
            holder: EthAddress::from_bytes([0x02; 20]),
            token: EthAddress::from_bytes([0x03; 20]),
            state,
        }
    }

    #[test]
    fn test_transition_predicates() {
        assert!(!MembershipState::Active.can_extend());
        assert!(MembershipState::GracePeriod.can_extend());
        assert!(!MembershipState::ErasedAwaitsWithdrawal.can_extend());

        assert!(MembershipState::Active.can_erase());
        assert!(MembershipState::GracePeriod.can_erase());
        assert!(!MembershipState::ErasedAwaitsWithdrawal.can_erase());
        assert!(!MembershipState::Unregistered.can_erase());

        assert!(!MembershipState::Active.can_withdraw());
        assert!(!MembershipState::GracePeriod.can_withdraw());
        assert!(MembershipState::ErasedAwaitsWithdrawal.can_withdraw());
    }

    #[test]
    fn test_credential_serde_round_trip() {
        let credential = Credential {
            identity: Identity::new(
                IdCommitment::from_bytes([0x11; 32]),
                IdNullifier::from_bytes([0x22; 32]),
            ),
            membership: record(MembershipState::Active),
        };
        let json = serde_json::to_string(&credential).unwrap();
        let back: Credential = serde_json::from_str(&json).unwrap();
        assert_eq!(back, credential);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(MembershipState::GracePeriod.to_string(), "GracePeriod");
        assert_eq!(
            MembershipState::ErasedAwaitsWithdrawal.to_string(),
            "ErasedAwaitsWithdrawal"
        );
    }
}
