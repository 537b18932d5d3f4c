//! Access control checks run before any record is mutated.

use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, msg, pubkey::Pubkey,
};

use crate::{
    error::VaultError,
    state::Vault,
    utils::{derive_credit_address, derive_vault_address, verify_address, verify_signer},
};

/// Allow/deny decisions for the accounts supplied in each role.
pub trait AccessGuard {
    /// The caller acting on its own credit (depositor or withdrawer).
    fn require_caller(caller: &AccountInfo) -> ProgramResult;

    /// The account in the authority role may act for `vault`.
    fn authorize(authority: &AccountInfo, vault: &Vault) -> ProgramResult;

    /// The account in the vault role is the vault this program derives.
    fn bind_vault(program_id: &Pubkey, vault: &AccountInfo) -> ProgramResult;

    /// The account in the credit role is the one derived for `(vault, user)`.
    fn bind_credit(
        program_id: &Pubkey,
        vault: &Pubkey,
        user: &Pubkey,
        credit: &AccountInfo,
    ) -> ProgramResult;

    /// Value may only leave the vault towards `recipient`.
    fn bind_recipient(recipient: &AccountInfo, caller: &AccountInfo) -> ProgramResult;
}

/// Signer facts, authority equality and re-derived addresses, all enforced.
pub struct StrictGuard;

impl AccessGuard for StrictGuard {
    fn require_caller(caller: &AccountInfo) -> ProgramResult {
        verify_signer(caller)
    }

    fn authorize(authority: &AccountInfo, vault: &Vault) -> ProgramResult {
        verify_signer(authority)?;
        if *authority.key != vault.authority {
            msg!("Authorize: {} is not the vault authority", authority.key);
            return Err(VaultError::AuthorityMismatch.into());
        }
        Ok(())
    }

    fn bind_vault(program_id: &Pubkey, vault: &AccountInfo) -> ProgramResult {
        let (expected, _) = derive_vault_address(program_id)?;
        verify_address(vault, &expected)
    }

    fn bind_credit(
        program_id: &Pubkey,
        vault: &Pubkey,
        user: &Pubkey,
        credit: &AccountInfo,
    ) -> ProgramResult {
        let (expected, _) = derive_credit_address(program_id, vault, user)?;
        verify_address(credit, &expected)
    }

    fn bind_recipient(recipient: &AccountInfo, caller: &AccountInfo) -> ProgramResult {
        if recipient.key != caller.key {
            msg!("Recipient {} is not the caller {}", recipient.key, caller.key);
            return Err(VaultError::RecipientMismatch.into());
        }
        Ok(())
    }
}
