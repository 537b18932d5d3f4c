//! Negative-control configuration.
//!
//! Each guard here leaves out exactly the check its strict counterpart
//! performs, so tests can show the attack that check stops. It is only
//! reachable through the `*Vulnerable` instruction variants.

use num_traits::{WrappingAdd, WrappingSub};
use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, msg, program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::{
    error::VaultError,
    guard::AccessGuard,
    math::BalanceMath,
    payment::PaymentVerifier,
    policy::Configuration,
    state::Vault,
};

/// Guards with the signer fact, address re-derivation and recipient binding removed.
pub struct Vulnerable;

impl Configuration for Vulnerable {
    type Guard = OpenGuard;
    type Payment = UnpinnedPayment;
    type Math = WrappingMath;

    const LABEL: &'static str = "vulnerable";
}

/// Compares keys but never asks for a signature or re-derives an address.
pub struct OpenGuard;

impl AccessGuard for OpenGuard {
    // Missing: signer fact for the caller.
    fn require_caller(_caller: &AccountInfo) -> ProgramResult {
        Ok(())
    }

    // Missing: signer fact. A non-signing account holding the right key passes.
    fn authorize(authority: &AccountInfo, vault: &Vault) -> ProgramResult {
        if *authority.key != vault.authority {
            return Err(VaultError::AuthorityMismatch.into());
        }
        Ok(())
    }

    // Missing: re-derivation. Any record of the right shape is accepted.
    fn bind_vault(_program_id: &Pubkey, _vault: &AccountInfo) -> ProgramResult {
        Ok(())
    }

    fn bind_credit(
        _program_id: &Pubkey,
        _vault: &Pubkey,
        _user: &Pubkey,
        _credit: &AccountInfo,
    ) -> ProgramResult {
        Ok(())
    }

    // Missing: recipient binding. Value goes wherever the caller points it.
    fn bind_recipient(_recipient: &AccountInfo, _caller: &AccountInfo) -> ProgramResult {
        Ok(())
    }
}

/// Invokes whatever program the caller names and credits the claim as-is.
pub struct UnpinnedPayment;

impl PaymentVerifier for UnpinnedPayment {
    fn check_target(payment_program: &AccountInfo) -> ProgramResult {
        msg!("Payment program {} accepted unchecked", payment_program.key);
        Ok(())
    }

    fn entitlement(claimed: u64, _observed: u64) -> Result<u64, ProgramError> {
        Ok(claimed)
    }
}

/// Wrapping counters: a decrement below zero lands near `u64::MAX`.
pub struct WrappingMath;

impl BalanceMath for WrappingMath {
    fn increase(current: u64, amount: u64) -> Result<u64, ProgramError> {
        Ok(WrappingAdd::wrapping_add(&current, &amount))
    }

    // The shortfall error is never produced; an unsigned result is always >= 0.
    fn decrease(current: u64, amount: u64, _shortfall: VaultError) -> Result<u64, ProgramError> {
        Ok(WrappingSub::wrapping_sub(&current, &amount))
    }
}
