//! Withdrawal authorization encoding and signer recovery.
//!
//! The backend signer authorizes a withdrawal by signing the Keccak-256 digest of
//!
//! ```text
//! "\x19Ethereum Signed Message:\n128" ‖ word(address) ‖ word(amount) ‖ word(signing_time) ‖ salt
//! ```
//!
//! where every `word` is a 32-byte big-endian value (the address is left-padded with
//! zeroes). The signature is a 65-byte `r ‖ s ‖ v` secp256k1 recoverable signature.

use polkadot_sdk::sp_core::{H160, H256};
use polkadot_sdk::sp_io::{crypto::secp256k1_ecdsa_recover, hashing::keccak_256};
use primitives::ecosystem::{
  Balance, Moment,
  params::{ETH_SIGNED_MESSAGE_PREFIX, REQUEST_MESSAGE_LEN},
};

/// Raw `r ‖ s ‖ v` signature bytes.
pub type RawSignature = [u8; 65];

/// Half of the secp256k1 group order. Signatures with a larger `s` are rejected.
const SECP256K1_HALF_ORDER: [u8; 32] = [
  0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
  0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

/// Reasons a signature cannot be turned into a signer identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureError {
  /// `v` is not one of 0, 1, 27, 28
  InvalidRecoveryId,
  /// `s` lies in the upper half of the curve order
  MalleableSignature,
  /// No public key recovers from `(r, s, v)` for this digest
  Unrecoverable,
}

fn write_word(out: &mut [u8], offset: usize, be_bytes: &[u8]) {
  let end = offset + 32;
  out[end - be_bytes.len()..end].copy_from_slice(be_bytes);
}

/// Prefixed message whose Keccak-256 hash the signer signs.
pub fn request_message(
  address: H160,
  amount: Balance,
  signing_time: Moment,
  salt: H256,
) -> [u8; REQUEST_MESSAGE_LEN] {
  let mut message = [0u8; REQUEST_MESSAGE_LEN];
  let prefix_len = ETH_SIGNED_MESSAGE_PREFIX.len();
  message[..prefix_len].copy_from_slice(ETH_SIGNED_MESSAGE_PREFIX);
  write_word(&mut message, prefix_len, address.as_bytes());
  write_word(&mut message, prefix_len + 32, &amount.to_be_bytes());
  write_word(&mut message, prefix_len + 64, &signing_time.to_be_bytes());
  write_word(&mut message, prefix_len + 96, salt.as_bytes());
  message
}

/// Digest binding `(address, amount, signing_time, salt)` for signing.
pub fn request_digest(address: H160, amount: Balance, signing_time: Moment, salt: H256) -> [u8; 32] {
  keccak_256(&request_message(address, amount, signing_time, salt))
}

/// Ethereum-style identity of an uncompressed public key (without the `0x04` tag).
pub fn public_to_address(public: &[u8; 64]) -> H160 {
  H160::from_slice(&keccak_256(public)[12..])
}

/// Recover the identity that produced `signature` over `digest`.
pub fn recover_signer(digest: &[u8; 32], signature: &RawSignature) -> Result<H160, SignatureError> {
  if !matches!(signature[64], 0 | 1 | 27 | 28) {
    return Err(SignatureError::InvalidRecoveryId);
  }
  if signature[32..64] > SECP256K1_HALF_ORDER[..] {
    return Err(SignatureError::MalleableSignature);
  }
  let public =
    secp256k1_ecdsa_recover(signature, digest).map_err(|_| SignatureError::Unrecoverable)?;
  Ok(public_to_address(&public))
}
