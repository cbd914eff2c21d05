use crate::ecosystem::{Balance, Moment};
use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Withdrawal state of a single depositor.
///
/// - `Normal`: no withdrawal outstanding, a new request may be submitted.
/// - `Pending`: an authorized request is waiting out the locking window.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub enum AssetStatus {
  #[default]
  Normal,
  Pending,
}

/// Per-user withdrawal record.
///
/// Created lazily with zero values on first access and reset to zero values once a
/// pending withdrawal is claimed.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub struct UserAsset {
  /// Current state of the record
  pub status: AssetStatus,
  /// Amount locked for withdrawal, zero while `Normal`
  pub pending_amount: Balance,
  /// Time the pending request was accepted, zero while `Normal`
  pub request_time: Moment,
}

impl UserAsset {
  /// A record that has just had a withdrawal request accepted.
  pub fn pending(amount: Balance, request_time: Moment) -> Self {
    Self {
      status: AssetStatus::Pending,
      pending_amount: amount,
      request_time,
    }
  }

  pub fn is_pending(&self) -> bool {
    self.status == AssetStatus::Pending
  }

  /// `Pending` iff both the pending amount and the request time are non-zero,
  /// and a `Normal` record carries no leftovers.
  pub fn is_consistent(&self) -> bool {
    match self.status {
      AssetStatus::Pending => self.pending_amount > 0 && self.request_time > 0,
      AssetStatus::Normal => self.pending_amount == 0 && self.request_time == 0,
    }
  }
}
