#![cfg_attr(not(feature = "std"), no_std)]

pub mod bond;
pub mod ecosystem;

pub use bond::*;
pub use ecosystem::*;
