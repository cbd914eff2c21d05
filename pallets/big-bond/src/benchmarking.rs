use crate::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_system::RawOrigin;
use primitives::{Balance, Moment, UserAsset};

const AMOUNT: Balance = 1_000_000_000;
const NOW: Moment = 1_700_000_000;

fn admin_account<T: Config>() -> T::AccountId {
  let admin: T::AccountId = account("admin", 0, 0);
  Admin::<T>::put(&admin);
  admin
}

fn operator_account<T: Config>() -> T::AccountId {
  let operator: T::AccountId = account("operator", 0, 0);
  Operator::<T>::put(&operator);
  operator
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn deposit() {
    let caller: T::AccountId = whitelisted_caller();
    T::BenchmarkHelper::ensure_funded(&caller, AMOUNT).expect("Failed to fund caller");

    #[extrinsic_call]
    deposit(RawOrigin::Signed(caller), AMOUNT);

    assert_eq!(Pallet::<T>::current_balance(), AMOUNT);
  }

  #[benchmark]
  fn request_withdraw() {
    let caller: T::AccountId = whitelisted_caller();
    WithdrawSigner::<T>::put(T::BenchmarkHelper::signer());
    T::BenchmarkHelper::set_time(NOW);
    let digest = Pallet::<T>::calculate_request_digest(&caller, AMOUNT, NOW);
    let signature = T::BenchmarkHelper::sign(&digest);

    #[extrinsic_call]
    request_withdraw(RawOrigin::Signed(caller.clone()), AMOUNT, NOW, signature);

    assert!(UserAssets::<T>::get(&caller).is_pending());
  }

  #[benchmark]
  fn claim() {
    let caller: T::AccountId = whitelisted_caller();
    T::BenchmarkHelper::ensure_funded(&Pallet::<T>::account_id(), AMOUNT)
      .expect("Failed to fund custody");
    UserAssets::<T>::insert(&caller, UserAsset::pending(AMOUNT, NOW));
    T::BenchmarkHelper::set_time(NOW + LockingTime::<T>::get());

    #[extrinsic_call]
    claim(RawOrigin::Signed(caller.clone()));

    assert_eq!(UserAssets::<T>::get(&caller), UserAsset::default());
  }

  #[benchmark]
  fn borrow() {
    let operator = operator_account::<T>();
    T::BenchmarkHelper::ensure_funded(&Pallet::<T>::account_id(), AMOUNT)
      .expect("Failed to fund custody");

    #[extrinsic_call]
    borrow(RawOrigin::Signed(operator), AMOUNT);

    assert_eq!(OperatorDebt::<T>::get(), AMOUNT);
  }

  #[benchmark]
  fn repay() {
    let operator = operator_account::<T>();
    T::BenchmarkHelper::ensure_funded(&operator, AMOUNT).expect("Failed to fund operator");
    OperatorDebt::<T>::put(AMOUNT);

    #[extrinsic_call]
    repay(RawOrigin::Signed(operator), AMOUNT);

    assert_eq!(OperatorDebt::<T>::get(), 0);
  }

  #[benchmark]
  fn set_admin() {
    let admin = admin_account::<T>();
    let new: T::AccountId = account("new", 0, 0);

    #[extrinsic_call]
    set_admin(RawOrigin::Signed(admin), new.clone());

    assert_eq!(Admin::<T>::get(), Some(new));
  }

  #[benchmark]
  fn set_operator() {
    let admin = admin_account::<T>();
    let new: T::AccountId = account("new", 0, 0);

    #[extrinsic_call]
    set_operator(RawOrigin::Signed(admin), new.clone());

    assert_eq!(Operator::<T>::get(), Some(new));
  }

  #[benchmark]
  fn set_signer() {
    let admin = admin_account::<T>();
    let new = T::BenchmarkHelper::signer();

    #[extrinsic_call]
    set_signer(RawOrigin::Signed(admin), new);

    assert_eq!(WithdrawSigner::<T>::get(), Some(new));
  }

  #[benchmark]
  fn set_signature_valid_time() {
    let admin = admin_account::<T>();
    let new = SignatureValidTime::<T>::get().saturating_add(1);
    LockingTime::<T>::put(new);

    #[extrinsic_call]
    set_signature_valid_time(RawOrigin::Signed(admin), new);

    assert_eq!(SignatureValidTime::<T>::get(), new);
  }

  #[benchmark]
  fn set_locking_time() {
    let admin = admin_account::<T>();
    let new = LockingTime::<T>::get().saturating_add(1);

    #[extrinsic_call]
    set_locking_time(RawOrigin::Signed(admin), new);

    assert_eq!(LockingTime::<T>::get(), new);
  }

  #[benchmark]
  fn pause() {
    let admin = admin_account::<T>();

    #[extrinsic_call]
    pause(RawOrigin::Signed(admin));

    assert!(Paused::<T>::get());
  }

  #[benchmark]
  fn unpause() {
    let admin = admin_account::<T>();
    Paused::<T>::put(true);

    #[extrinsic_call]
    unpause(RawOrigin::Signed(admin));

    assert!(!Paused::<T>::get());
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
