//! BigBond Pallet
//!
//! Escrow ledger for a single fungible asset. Users deposit freely, withdraw through a
//! two-step flow (an off-chain signer authorizes a request, the funds unlock after a
//! locking window) and a designated operator may borrow against the custodied pool.
//!
//! ## Withdrawal flow
//!
//! 1. The backend signer signs `(user, amount, signing_time, salt)` off-chain, see
//!    [`signature`] for the exact encoding.
//! 2. `request_withdraw` recovers the signer, rejects stale authorizations and moves the
//!    user from `Normal` to `Pending`.
//! 3. Once `LockingTime` has elapsed, `claim` pays the pending amount out of custody and
//!    moves the user back to `Normal`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod signature;
pub use signature::RawSignature;

#[cfg(test)]
pub mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

pub const LOG_TARGET: &str = "runtime::big-bond";

/// Helper for benchmarking
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId> {
  /// Give `who` `amount` units of the bond asset.
  fn ensure_funded(who: &AccountId, amount: primitives::Balance)
  -> frame::deps::sp_runtime::DispatchResult;
  /// Move the time source to `now` (seconds).
  fn set_time(now: primitives::Moment);
  /// Identity of the key used by [`BenchmarkHelper::sign`].
  fn signer() -> polkadot_sdk::sp_core::H160;
  /// Sign a request digest with the benchmark signer key.
  fn sign(digest: &[u8; 32]) -> RawSignature;
}

#[frame::pallet]
pub mod pallet {
  use super::{LOG_TARGET, RawSignature, WeightInfo, signature};
  use frame::deps::{
    frame_support::{
      PalletId,
      traits::{
        UnixTime,
        fungibles::{Inspect as FungiblesInspect, Mutate as FungiblesMutate},
        tokens::Preservation,
      },
    },
    sp_runtime::{
      DispatchError,
      traits::{AccountIdConversion, Convert, Zero},
    },
  };
  use frame::prelude::*;
  use polkadot_sdk::sp_core::{H160, H256};
  use primitives::{AssetStatus, Balance, Moment, UserAsset};

  /// Privileged roles recognised by [`Pallet::ensure_role`].
  #[derive(Clone, Copy, Eq, PartialEq, RuntimeDebug)]
  pub enum Role {
    Admin,
    Operator,
  }

  /// Configuration trait for the BigBond pallet
  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Ledger of the custodied asset
    type Assets: FungiblesInspect<Self::AccountId, AssetId = u32, Balance = Balance>
      + FungiblesMutate<Self::AccountId, AssetId = u32, Balance = Balance>;

    /// The single asset this pallet holds in custody
    #[pallet::constant]
    type BondAsset: Get<u32>;

    /// Pallet ID for the custody account
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// Wall-clock source, read once per call
    type TimeProvider: UnixTime;

    /// Maps a chain account to the 20-byte identity bound into request digests
    type AddressMapping: Convert<Self::AccountId, H160>;

    /// Per-deployment salt folded into every request digest
    #[pallet::constant]
    type SignatureSalt: Get<H256>;

    /// Default validity window of a withdrawal authorization, in seconds
    #[pallet::constant]
    type DefaultSignatureValidTime: Get<Moment>;

    /// Default delay between request and claim, in seconds
    #[pallet::constant]
    type DefaultLockingTime: Get<Moment>;

    /// Origin that may act as admin regardless of the stored admin account
    type ForceOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;

    /// Helper for benchmarking
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId>;
  }

  #[pallet::pallet]
  #[pallet::storage_version(STORAGE_VERSION)]
  pub struct Pallet<T>(_);

  /// The current storage version.
  const STORAGE_VERSION: StorageVersion = StorageVersion::new(1);

  /// Withdrawal state per user
  #[pallet::storage]
  pub type UserAssets<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AccountId, UserAsset, ValueQuery>;

  #[pallet::storage]
  pub type Admin<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

  #[pallet::storage]
  pub type Operator<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

  /// Identity whose signatures authorize withdrawal requests
  #[pallet::storage]
  pub type WithdrawSigner<T: Config> = StorageValue<_, H160, OptionQuery>;

  /// Current signature validity window (can be updated by the admin)
  #[pallet::storage]
  #[pallet::getter(fn signature_valid_time)]
  pub type SignatureValidTime<T: Config> =
    StorageValue<_, Moment, ValueQuery, T::DefaultSignatureValidTime>;

  /// Current locking window (can be updated by the admin)
  #[pallet::storage]
  #[pallet::getter(fn locking_time)]
  pub type LockingTime<T: Config> = StorageValue<_, Moment, ValueQuery, T::DefaultLockingTime>;

  /// Borrowed-but-not-repaid total of the operator
  #[pallet::storage]
  #[pallet::getter(fn operator_debt)]
  pub type OperatorDebt<T: Config> = StorageValue<_, Balance, ValueQuery>;

  #[pallet::storage]
  #[pallet::getter(fn is_paused)]
  pub type Paused<T: Config> = StorageValue<_, bool, ValueQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Funds moved into custody
    Deposit { who: T::AccountId, amount: Balance },
    /// Withdrawal request accepted, funds locked until the window elapses
    Request {
      who: T::AccountId,
      amount: Balance,
      request_time: Moment,
    },
    /// Pending withdrawal paid out
    Claim { who: T::AccountId, amount: Balance },
    /// Operator took funds out of custody
    Borrow {
      operator: T::AccountId,
      amount: Balance,
      debt: Balance,
    },
    /// Operator returned funds to custody
    Repay {
      operator: T::AccountId,
      amount: Balance,
      debt: Balance,
    },
    AdminChanged {
      old: Option<T::AccountId>,
      new: T::AccountId,
    },
    OperatorChanged {
      old: Option<T::AccountId>,
      new: T::AccountId,
    },
    SignerChanged { old: Option<H160>, new: H160 },
    SignatureValidTimeUpdated { old: Moment, new: Moment },
    LockingTimeUpdated { old: Moment, new: Moment },
    Paused,
    Unpaused,
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Caller is not the admin
    NotAdmin,
    /// Caller is not the operator
    NotOperator,
    /// Signature was not produced by the withdraw signer for these parameters
    SignatureInvalid,
    /// Signature bytes are malformed or unrecoverable
    InvalidSignatureFormat,
    /// Authorization is older than the validity window
    SignatureExpired,
    /// Locking window has not elapsed yet
    ClaimTooEarly,
    /// A withdrawal is already pending for this user
    UserStateNotNormal,
    /// No withdrawal is pending for this user
    UserStateNotPending,
    /// Zero amount not allowed
    AmountIsZero,
    /// Parameter update would break the time window invariants
    InvalidParameter,
    /// Repayment is larger than the outstanding debt
    RepayExceedsDebt,
    /// State-mutating operations are suspended
    ContractPaused,
    /// Arithmetic overflow occurred
    Overflow,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Move `amount` of the bond asset from the caller into custody.
    ///
    /// Allowed in any withdrawal state.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::deposit())]
    pub fn deposit(origin: OriginFor<T>, amount: Balance) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_not_paused()?;
      ensure!(!amount.is_zero(), Error::<T>::AmountIsZero);

      T::Assets::transfer(
        T::BondAsset::get(),
        &who,
        &Self::account_id(),
        amount,
        Preservation::Expendable,
      )?;

      Self::deposit_event(Event::Deposit { who, amount });
      Ok(())
    }

    /// Lock `withdraw_amount` for withdrawal using an authorization issued by the
    /// withdraw signer at `signing_time`.
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::request_withdraw())]
    pub fn request_withdraw(
      origin: OriginFor<T>,
      withdraw_amount: Balance,
      signing_time: Moment,
      signature: RawSignature,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_not_paused()?;
      let now = Self::now();

      let record = UserAssets::<T>::get(&who);
      ensure!(
        record.status == AssetStatus::Normal,
        Error::<T>::UserStateNotNormal
      );
      ensure!(!withdraw_amount.is_zero(), Error::<T>::AmountIsZero);

      let digest = Self::calculate_request_digest(&who, withdraw_amount, signing_time);
      let recovered = signature::recover_signer(&digest, &signature).map_err(|e| {
        log::warn!(target: LOG_TARGET, "malformed withdraw signature from {:?}: {:?}", who, e);
        Error::<T>::InvalidSignatureFormat
      })?;
      if WithdrawSigner::<T>::get() != Some(recovered) {
        log::warn!(
          target: LOG_TARGET,
          "withdraw request from {:?} signed by unexpected {:?}",
          who,
          recovered
        );
        return Err(Error::<T>::SignatureInvalid.into());
      }

      let expires_at = signing_time.saturating_add(SignatureValidTime::<T>::get());
      ensure!(expires_at > now, Error::<T>::SignatureExpired);

      UserAssets::<T>::insert(&who, UserAsset::pending(withdraw_amount, now));
      log::debug!(
        target: LOG_TARGET,
        "withdraw of {} requested by {:?} at {}",
        withdraw_amount,
        who,
        now
      );

      Self::deposit_event(Event::Request {
        who,
        amount: withdraw_amount,
        request_time: now,
      });
      Ok(())
    }

    /// Pay out the caller's pending withdrawal once the locking window has elapsed.
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::claim())]
    pub fn claim(origin: OriginFor<T>) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_not_paused()?;
      let now = Self::now();

      let record = UserAssets::<T>::get(&who);
      ensure!(record.is_pending(), Error::<T>::UserStateNotPending);
      let unlocks_at = record
        .request_time
        .checked_add(LockingTime::<T>::get())
        .ok_or(Error::<T>::Overflow)?;
      ensure!(now >= unlocks_at, Error::<T>::ClaimTooEarly);

      // Funds move first; the record is only cleared once the transfer succeeded.
      let amount = record.pending_amount;
      T::Assets::transfer(
        T::BondAsset::get(),
        &Self::account_id(),
        &who,
        amount,
        Preservation::Expendable,
      )?;
      UserAssets::<T>::insert(&who, UserAsset::default());
      log::debug!(target: LOG_TARGET, "{:?} claimed {}", who, amount);

      Self::deposit_event(Event::Claim { who, amount });
      Ok(())
    }

    /// Operator takes `amount` out of custody, increasing the operator debt.
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::borrow())]
    pub fn borrow(origin: OriginFor<T>, amount: Balance) -> DispatchResult {
      let operator = Self::ensure_role(origin, Role::Operator)?;
      Self::ensure_not_paused()?;
      ensure!(!amount.is_zero(), Error::<T>::AmountIsZero);

      let debt = OperatorDebt::<T>::get()
        .checked_add(amount)
        .ok_or(Error::<T>::Overflow)?;
      T::Assets::transfer(
        T::BondAsset::get(),
        &Self::account_id(),
        &operator,
        amount,
        Preservation::Expendable,
      )?;
      OperatorDebt::<T>::put(debt);

      Self::deposit_event(Event::Borrow {
        operator,
        amount,
        debt,
      });
      Ok(())
    }

    /// Operator returns `amount` to custody. Repaying more than the debt is rejected.
    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::repay())]
    pub fn repay(origin: OriginFor<T>, amount: Balance) -> DispatchResult {
      let operator = Self::ensure_role(origin, Role::Operator)?;
      Self::ensure_not_paused()?;
      ensure!(!amount.is_zero(), Error::<T>::AmountIsZero);

      let debt = OperatorDebt::<T>::get()
        .checked_sub(amount)
        .ok_or(Error::<T>::RepayExceedsDebt)?;
      T::Assets::transfer(
        T::BondAsset::get(),
        &operator,
        &Self::account_id(),
        amount,
        Preservation::Expendable,
      )?;
      OperatorDebt::<T>::put(debt);

      Self::deposit_event(Event::Repay {
        operator,
        amount,
        debt,
      });
      Ok(())
    }

    /// Hand the admin role to `new` (admin only)
    #[pallet::call_index(5)]
    #[pallet::weight(T::WeightInfo::set_admin())]
    pub fn set_admin(origin: OriginFor<T>, new: T::AccountId) -> DispatchResult {
      Self::ensure_admin(origin)?;
      let old = Admin::<T>::get();
      Admin::<T>::put(&new);
      Self::deposit_event(Event::AdminChanged { old, new });
      Ok(())
    }

    /// Replace the operator (admin only)
    #[pallet::call_index(6)]
    #[pallet::weight(T::WeightInfo::set_operator())]
    pub fn set_operator(origin: OriginFor<T>, new: T::AccountId) -> DispatchResult {
      Self::ensure_admin(origin)?;
      let old = Operator::<T>::get();
      Operator::<T>::put(&new);
      Self::deposit_event(Event::OperatorChanged { old, new });
      Ok(())
    }

    /// Replace the withdraw signer (admin only)
    #[pallet::call_index(7)]
    #[pallet::weight(T::WeightInfo::set_signer())]
    pub fn set_signer(origin: OriginFor<T>, new: H160) -> DispatchResult {
      Self::ensure_admin(origin)?;
      let old = WithdrawSigner::<T>::get();
      WithdrawSigner::<T>::put(new);
      Self::deposit_event(Event::SignerChanged { old, new });
      Ok(())
    }

    /// Update the signature validity window (admin only)
    #[pallet::call_index(8)]
    #[pallet::weight(T::WeightInfo::set_signature_valid_time())]
    pub fn set_signature_valid_time(origin: OriginFor<T>, new: Moment) -> DispatchResult {
      Self::ensure_admin(origin)?;
      Self::ensure_windows(new, LockingTime::<T>::get())?;
      let old = SignatureValidTime::<T>::get();
      SignatureValidTime::<T>::put(new);
      Self::deposit_event(Event::SignatureValidTimeUpdated { old, new });
      Ok(())
    }

    /// Update the locking window (admin only)
    #[pallet::call_index(9)]
    #[pallet::weight(T::WeightInfo::set_locking_time())]
    pub fn set_locking_time(origin: OriginFor<T>, new: Moment) -> DispatchResult {
      Self::ensure_admin(origin)?;
      Self::ensure_windows(SignatureValidTime::<T>::get(), new)?;
      let old = LockingTime::<T>::get();
      LockingTime::<T>::put(new);
      Self::deposit_event(Event::LockingTimeUpdated { old, new });
      Ok(())
    }

    /// Suspend every state-mutating user and operator call (admin only)
    #[pallet::call_index(10)]
    #[pallet::weight(T::WeightInfo::pause())]
    pub fn pause(origin: OriginFor<T>) -> DispatchResult {
      Self::ensure_admin(origin)?;
      Paused::<T>::put(true);
      Self::deposit_event(Event::Paused);
      Ok(())
    }

    /// Resume normal operation (admin only)
    #[pallet::call_index(11)]
    #[pallet::weight(T::WeightInfo::unpause())]
    pub fn unpause(origin: OriginFor<T>) -> DispatchResult {
      Self::ensure_admin(origin)?;
      Paused::<T>::put(false);
      Self::deposit_event(Event::Unpaused);
      Ok(())
    }
  }

  #[pallet::hooks]
  impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
    fn integrity_test() {
      let valid = T::DefaultSignatureValidTime::get();
      let locking = T::DefaultLockingTime::get();
      assert!(valid > 0, "signature validity window must be non-zero");
      assert!(
        locking >= valid,
        "locking window must not be shorter than the signature validity window"
      );
    }

    #[cfg(feature = "try-runtime")]
    fn try_state(_n: BlockNumberFor<T>) -> Result<(), frame::deps::sp_runtime::TryRuntimeError> {
      Self::do_try_state()
    }
  }

  impl<T: Config> Pallet<T> {
    /// Get the custody account ID (derived from PalletId)
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    /// Withdrawal record of `who`; zero-valued if it never interacted.
    pub fn get_state(who: &T::AccountId) -> UserAsset {
      UserAssets::<T>::get(who)
    }

    pub fn get_admin() -> Option<T::AccountId> {
      Admin::<T>::get()
    }

    pub fn get_operator() -> Option<T::AccountId> {
      Operator::<T>::get()
    }

    pub fn get_signer() -> Option<H160> {
      WithdrawSigner::<T>::get()
    }

    /// Bond asset balance held in custody
    pub fn current_balance() -> Balance {
      T::Assets::balance(T::BondAsset::get(), &Self::account_id())
    }

    /// Digest the withdraw signer must sign to authorize `amount` for `who`.
    pub fn calculate_request_digest(
      who: &T::AccountId,
      amount: Balance,
      signing_time: Moment,
    ) -> [u8; 32] {
      signature::request_digest(
        T::AddressMapping::convert(who.clone()),
        amount,
        signing_time,
        T::SignatureSalt::get(),
      )
    }

    /// Single authorization gate: the origin must be signed by the account holding `role`.
    pub fn ensure_role(origin: OriginFor<T>, role: Role) -> Result<T::AccountId, DispatchError> {
      let who = ensure_signed(origin)?;
      let (holder, error) = match role {
        Role::Admin => (Admin::<T>::get(), Error::<T>::NotAdmin),
        Role::Operator => (Operator::<T>::get(), Error::<T>::NotOperator),
      };
      ensure!(holder.as_ref() == Some(&who), error);
      Ok(who)
    }

    /// `ForceOrigin` always passes, otherwise the stored admin must sign.
    fn ensure_admin(origin: OriginFor<T>) -> DispatchResult {
      match T::ForceOrigin::try_origin(origin) {
        Ok(_) => Ok(()),
        Err(origin) => Self::ensure_role(origin, Role::Admin).map(|_| ()),
      }
    }

    fn ensure_not_paused() -> DispatchResult {
      ensure!(!Paused::<T>::get(), Error::<T>::ContractPaused);
      Ok(())
    }

    fn ensure_windows(valid: Moment, locking: Moment) -> DispatchResult {
      ensure!(
        valid > 0 && locking >= valid,
        Error::<T>::InvalidParameter
      );
      Ok(())
    }

    fn now() -> Moment {
      T::TimeProvider::now().as_secs()
    }

    /// Check the per-user state machine invariant and the window ordering.
    #[cfg(any(feature = "try-runtime", test))]
    pub fn do_try_state() -> Result<(), frame::deps::sp_runtime::TryRuntimeError> {
      ensure!(
        LockingTime::<T>::get() >= SignatureValidTime::<T>::get(),
        "locking window shorter than signature window"
      );
      for (_, record) in UserAssets::<T>::iter() {
        ensure!(record.is_consistent(), "inconsistent withdrawal record");
      }
      Ok(())
    }
  }

  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    pub admin: Option<T::AccountId>,
    pub operator: Option<T::AccountId>,
    pub withdraw_signer: Option<H160>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      if let Some(admin) = &self.admin {
        Admin::<T>::put(admin);
      }
      if let Some(operator) = &self.operator {
        Operator::<T>::put(operator);
      }
      if let Some(signer) = self.withdraw_signer {
        WithdrawSigner::<T>::put(signer);
      }
      // Custody account survives a zero balance via provider reference
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
    }
  }
}
