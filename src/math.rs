//! Arithmetic policy for balance and credit counters.

use num_traits::{CheckedAdd, CheckedSub};
use solana_program::program_error::ProgramError;

use crate::error::VaultError;

/// How a configuration moves `balance` and `credits`.
///
/// `decrease` reports a shortfall with the error supplied by the caller so
/// the same policy serves both counters.
pub trait BalanceMath {
    fn increase(current: u64, amount: u64) -> Result<u64, ProgramError>;

    fn decrease(current: u64, amount: u64, shortfall: VaultError) -> Result<u64, ProgramError>;
}

/// Overflow-checked counters. A shortfall is an error result, never a wrap.
pub struct CheckedMath;

impl BalanceMath for CheckedMath {
    fn increase(current: u64, amount: u64) -> Result<u64, ProgramError> {
        checked_increase(&current, &amount).ok_or_else(|| VaultError::ArithmeticOverflow.into())
    }

    fn decrease(current: u64, amount: u64, shortfall: VaultError) -> Result<u64, ProgramError> {
        checked_decrease(&current, &amount).ok_or_else(|| shortfall.into())
    }
}

fn checked_increase<T: CheckedAdd>(current: &T, amount: &T) -> Option<T> {
    current.checked_add(amount)
}

fn checked_decrease<T: CheckedSub>(current: &T, amount: &T) -> Option<T> {
    current.checked_sub(amount)
}
