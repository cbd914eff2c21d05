//! Ecosystem Constants for the BigBond ledger
//!
//! This module centralizes the system-level constants: the custody pallet ID, the
//! default time windows and the fixed pieces of the withdrawal authorization encoding.
//!
//! These constants are the single source of truth for the pallet defaults and are
//! re-used by runtime configurations and test mocks via the primitives crate.

/// Balance type alias for consistency across the ecosystem
pub type Balance = u128;

/// Wall-clock time in whole seconds since the Unix epoch
pub type Moment = u64;

/// Pallet identifiers for deriving pallet-owned accounts.
///
/// These IDs are used by Polkadot SDK's `PalletId::into_account_truncating()`
/// to deterministically generate accounts for pallet-specific operations.
pub mod pallet_ids {
  /// BigBond custody pallet ID (holds every deposited unit)
  pub const BIG_BOND_PALLET_ID: &[u8; 8] = b"py/bbond";
}

/// Ecosystem parameters defining the authorization and settlement windows.
pub mod params {
  use super::Moment;

  /// How long a backend-issued withdrawal authorization stays redeemable (3 minutes).
  ///
  /// Counted from the signing time embedded in the signed payload.
  pub const SIGNATURE_VALID_TIME: Moment = 3 * 60;

  /// Minimum delay between an accepted withdrawal request and its claim (7 days).
  ///
  /// Must never be shorter than [`SIGNATURE_VALID_TIME`], otherwise an authorization
  /// could be replayed once the first claim settles.
  pub const LOCKING_TIME: Moment = 7 * 24 * 60 * 60;

  /// Length of the ABI-word encoded request payload: four 32-byte words.
  pub const REQUEST_PAYLOAD_LEN: usize = 4 * 32;

  /// Personal-message prefix declaring a 128-byte payload.
  pub const ETH_SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n128";

  /// Full length of the prefixed message that gets hashed.
  pub const REQUEST_MESSAGE_LEN: usize = ETH_SIGNED_MESSAGE_PREFIX.len() + REQUEST_PAYLOAD_LEN;
}

#[cfg(test)]
mod tests {
  use super::params::*;

  #[test]
  fn locking_window_outlasts_signature_window() {
    assert!(LOCKING_TIME >= SIGNATURE_VALID_TIME);
    assert!(SIGNATURE_VALID_TIME > 0);
  }

  #[test]
  fn prefix_declares_payload_length() {
    assert_eq!(ETH_SIGNED_MESSAGE_PREFIX.len(), 29);
    assert!(ETH_SIGNED_MESSAGE_PREFIX.ends_with(b"128"));
    assert_eq!(REQUEST_MESSAGE_LEN, 157);
  }
}
