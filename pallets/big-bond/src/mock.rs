extern crate alloc;

use crate as pallet_big_bond;
use crate::RawSignature;
use hex_literal::hex;
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl,
  traits::{ConstU32, ConstU64, ConstU128, Get},
};
use polkadot_sdk::frame_system::{self, EnsureRoot};
use polkadot_sdk::sp_core::{H160, H256, Pair, ecdsa};
use polkadot_sdk::sp_runtime::{
  BuildStorage,
  traits::{BlakeTwo256, Convert, IdentityLookup},
};
use primitives::ecosystem::{
  Balance, Moment,
  params::{LOCKING_TIME, SIGNATURE_VALID_TIME},
};

type Block = frame_system::mocking::MockBlock<Test>;

pub const ALICE: u64 = 1;
pub const BOB: u64 = 2;
pub const OPERATOR: u64 = 3;
pub const ADMIN: u64 = 4;
pub const EVE: u64 = 5;

pub const BOND_ASSET: u32 = 1;
pub const INITIAL_USER_BALANCE: Balance = 20_000_000;
pub const INITIAL_OPERATOR_BALANCE: Balance = 10_000_000;

/// Wall clock (seconds) at the start of every test
pub const START_TIME: Moment = 1_700_000_000;

/// Backend signer key (well-known development key) and its address
pub const SIGNER_KEY: [u8; 32] =
  hex!("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80");
pub const SIGNER_ADDRESS: [u8; 20] = hex!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

/// A second well-known key that is never configured as signer
pub const ROGUE_KEY: [u8; 32] =
  hex!("59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d");
pub const ROGUE_ADDRESS: [u8; 20] = hex!("70997970c51812dc3a010c7d01b50e0d17dc79c8");

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Timestamp: polkadot_sdk::pallet_timestamp,
    Balances: polkadot_sdk::pallet_balances,
    Assets: polkadot_sdk::pallet_assets,
    BigBond: pallet_big_bond,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = u64;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<u128>;
}

impl polkadot_sdk::pallet_timestamp::Config for Test {
  type Moment = u64;
  type OnTimestampSet = ();
  type MinimumPeriod = ConstU64<1>;
  type WeightInfo = ();
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = u128;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

impl polkadot_sdk::pallet_assets::Config for Test {
  type RuntimeEvent = RuntimeEvent;
  type Balance = u128;
  type AssetId = u32;
  type AssetIdParameter = u32;
  type Currency = Balances;
  type CreateOrigin = polkadot_sdk::frame_support::traits::AsEnsureOriginWithArg<
    frame_system::EnsureSigned<Self::AccountId>,
  >;
  type ForceOrigin = frame_system::EnsureRoot<Self::AccountId>;
  type AssetDeposit = ConstU128<1>;
  type AssetAccountDeposit = ConstU128<1>;
  type MetadataDepositBase = ConstU128<1>;
  type MetadataDepositPerByte = ConstU128<1>;
  type ApprovalDeposit = ConstU128<1>;
  type StringLimit = ConstU32<50>;
  type Freezer = ();
  type Extra = ();
  type ReserveData = ();
  type CallbackHandle = ();
  type WeightInfo = ();
  type RemoveItemsLimit = ConstU32<5>;
  type Holder = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = AssetBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct AssetBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl polkadot_sdk::pallet_assets::BenchmarkHelper<u32, ()> for AssetBenchmarkHelper {
  fn create_asset_id_parameter(id: u32) -> u32 {
    id
  }
  fn create_reserve_id_parameter(_id: u32) -> () {
    ()
  }
}

/// Account `n` maps to the address whose low 8 bytes are `n` big-endian
pub struct AccountToAddress;
impl Convert<u64, H160> for AccountToAddress {
  fn convert(who: u64) -> H160 {
    H160::from_low_u64_be(who)
  }
}

pub struct BigBondPalletId;
impl Get<PalletId> for BigBondPalletId {
  fn get() -> PalletId {
    PalletId(*primitives::ecosystem::pallet_ids::BIG_BOND_PALLET_ID)
  }
}

pub struct SignatureSalt;
impl Get<H256> for SignatureSalt {
  fn get() -> H256 {
    H256::repeat_byte(0x42)
  }
}

impl pallet_big_bond::Config for Test {
  type Assets = Assets;
  type BondAsset = ConstU32<BOND_ASSET>;
  type PalletId = BigBondPalletId;
  type TimeProvider = Timestamp;
  type AddressMapping = AccountToAddress;
  type SignatureSalt = SignatureSalt;
  type DefaultSignatureValidTime = ConstU64<SIGNATURE_VALID_TIME>;
  type DefaultLockingTime = ConstU64<LOCKING_TIME>;
  type ForceOrigin = EnsureRoot<u64>;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = BigBondBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct BigBondBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<u64> for BigBondBenchmarkHelper {
  fn ensure_funded(who: &u64, amount: Balance) -> polkadot_sdk::sp_runtime::DispatchResult {
    use polkadot_sdk::frame_support::traits::fungibles::Mutate;
    Assets::mint_into(BOND_ASSET, who, amount)?;
    Ok(())
  }

  fn set_time(now: Moment) {
    set_now(now);
  }

  fn signer() -> H160 {
    H160::from(SIGNER_ADDRESS)
  }

  fn sign(digest: &[u8; 32]) -> RawSignature {
    sign_digest(&SIGNER_KEY, digest)
  }
}

/// Move the timestamp pallet to `now` seconds
pub fn set_now(now: Moment) {
  Timestamp::set_timestamp(now * 1000);
}

/// Sign a prehashed digest the way an Ethereum wallet would (`v` in {27, 28})
pub fn sign_digest(key: &[u8; 32], digest: &[u8; 32]) -> RawSignature {
  let pair = ecdsa::Pair::from_seed(key);
  let mut raw = [0u8; 65];
  raw.copy_from_slice(pair.sign_prehashed(digest).as_ref());
  raw[64] += 27;
  raw
}

/// Backend-style authorization for `who` withdrawing `amount`, signed at `signing_time`
pub fn sign_request(key: &[u8; 32], who: u64, amount: Balance, signing_time: Moment) -> RawSignature {
  let digest = BigBond::calculate_request_digest(&who, amount, signing_time);
  sign_digest(key, &digest)
}

pub fn asset_balance(who: u64) -> Balance {
  use polkadot_sdk::frame_support::traits::fungibles::Inspect;
  Assets::balance(BOND_ASSET, &who)
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  polkadot_sdk::pallet_assets::GenesisConfig::<Test> {
    assets: alloc::vec![(BOND_ASSET, ADMIN, true, 1)],
    metadata: alloc::vec![],
    accounts: alloc::vec![
      (BOND_ASSET, ALICE, INITIAL_USER_BALANCE),
      (BOND_ASSET, BOB, INITIAL_USER_BALANCE),
      (BOND_ASSET, OPERATOR, INITIAL_OPERATOR_BALANCE),
    ],
    reserves: alloc::vec![],
    next_asset_id: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  pallet_big_bond::GenesisConfig::<Test> {
    admin: Some(ADMIN),
    operator: Some(OPERATOR),
    withdraw_signer: Some(H160::from(SIGNER_ADDRESS)),
  }
  .assimilate_storage(&mut t)
  .unwrap();

  let mut ext: polkadot_sdk::sp_io::TestExternalities = t.into();
  ext.execute_with(|| {
    System::set_block_number(1);
    set_now(START_TIME);
  });
  ext
}
