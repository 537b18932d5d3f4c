use solana_program::{
    account_info::AccountInfo,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::error::VaultError;

/// Seed for the vault PDA
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed prefix for user credit PDAs
pub const CREDIT_SEED: &[u8] = b"credit";

/// Derive an off-curve address for `seeds` under `program_id`.
///
/// Searches the bump space from 255 down and returns the first address that
/// is not a valid ed25519 point, so no keypair can ever sign for it. An
/// exhausted search is an error; there is no fallback address.
pub fn derive_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8), ProgramError> {
    Pubkey::try_find_program_address(seeds, program_id).ok_or_else(|| {
        msg!("Derive: no valid bump for program {}", program_id);
        VaultError::NoValidBumpFound.into()
    })
}

/// Derive the vault PDA
pub fn derive_vault_address(program_id: &Pubkey) -> Result<(Pubkey, u8), ProgramError> {
    derive_address(&[VAULT_SEED], program_id)
}

/// Derive the credit PDA for `user` within `vault`
pub fn derive_credit_address(
    program_id: &Pubkey,
    vault: &Pubkey,
    user: &Pubkey,
) -> Result<(Pubkey, u8), ProgramError> {
    derive_address(&[CREDIT_SEED, vault.as_ref(), user.as_ref()], program_id)
}

/// Check that `account` sits at `expected`
pub fn verify_address(account: &AccountInfo, expected: &Pubkey) -> Result<(), ProgramError> {
    if account.key != expected {
        msg!("Address mismatch. Expected: {}, Got: {}", expected, account.key);
        return Err(VaultError::InvalidAccountAddress.into());
    }
    Ok(())
}

/// Verify that an account is a signer
pub fn verify_signer(account: &AccountInfo) -> Result<(), ProgramError> {
    if !account.is_signer {
        msg!("Account {} must sign", account.key);
        return Err(VaultError::MissingSignature.into());
    }
    Ok(())
}

/// Verify that an account is writable
pub fn verify_writable(account: &AccountInfo) -> Result<(), ProgramError> {
    if !account.is_writable {
        msg!("Account {} must be writable", account.key);
        return Err(ProgramError::InvalidAccountData);
    }
    Ok(())
}

/// Verify that the supplied account is the real system program
pub fn verify_system_program(account: &AccountInfo) -> Result<(), ProgramError> {
    if account.key != &system_program::id() {
        msg!("Invalid system program: {}", account.key);
        return Err(VaultError::InvalidSystemProgram.into());
    }
    Ok(())
}

/// Verify that an account has not been created yet
pub fn verify_uninitialized_account(account: &AccountInfo) -> Result<(), ProgramError> {
    if account.owner != &system_program::id() || account.data_len() != 0 {
        msg!("Account {} already initialized", account.key);
        return Err(VaultError::AlreadyInitialized.into());
    }
    Ok(())
}
