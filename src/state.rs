use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{account_info::AccountInfo, msg, program_error::ProgramError, pubkey::Pubkey};

use crate::error::VaultError;

/// Record-kind discriminant stored in the first byte of every record
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKey {
    Uninitialized,
    Vault,
    UserCredit,
}

/// Vault record (PDA at `["vault"]`)
/// Holds the custodial balance and the identity allowed to manage it
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct Vault {
    pub key: AccountKey,
    /// The only identity allowed to perform authority-gated operations
    pub authority: Pubkey,
    /// Sum of confirmed deposits minus withdrawals routed through the vault
    pub balance: u64,
}

impl Vault {
    /// Size of Vault when serialized
    pub const SIZE: usize = 1 + 32 + 8; // 41 bytes

    pub fn new(authority: Pubkey) -> Self {
        Self {
            key: AccountKey::Vault,
            authority,
            balance: 0,
        }
    }

    /// Load a vault record, rejecting foreign, mis-sized or mis-typed accounts
    pub fn load(account: &AccountInfo, program_id: &Pubkey) -> Result<Self, ProgramError> {
        let data = load_record_data(account, program_id, Self::SIZE, "Vault")?;
        let vault = Self::try_from_slice(&data).map_err(|_| VaultError::InvalidAccountData)?;
        check_key(vault.key, AccountKey::Vault, "Vault")?;
        Ok(vault)
    }

    pub fn store(&self, account: &AccountInfo) -> Result<(), ProgramError> {
        store_record(self, account, Self::SIZE)
    }
}

/// Per-user withdrawal entitlement (PDA at `["credit", vault, owner]`)
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct UserCredit {
    pub key: AccountKey,
    /// The user this entitlement belongs to
    pub owner: Pubkey,
    /// Amount the owner may still withdraw
    pub credits: u64,
}

impl UserCredit {
    /// Size of UserCredit when serialized
    pub const SIZE: usize = 1 + 32 + 8; // 41 bytes

    pub fn new(owner: Pubkey) -> Self {
        Self {
            key: AccountKey::UserCredit,
            owner,
            credits: 0,
        }
    }

    /// Load a credit record, rejecting foreign, mis-sized or mis-typed accounts
    pub fn load(account: &AccountInfo, program_id: &Pubkey) -> Result<Self, ProgramError> {
        let data = load_record_data(account, program_id, Self::SIZE, "UserCredit")?;
        let credit = Self::try_from_slice(&data).map_err(|_| VaultError::InvalidAccountData)?;
        check_key(credit.key, AccountKey::UserCredit, "UserCredit")?;
        Ok(credit)
    }

    pub fn store(&self, account: &AccountInfo) -> Result<(), ProgramError> {
        store_record(self, account, Self::SIZE)
    }
}

fn load_record_data(
    account: &AccountInfo,
    program_id: &Pubkey,
    size: usize,
    kind: &str,
) -> Result<Vec<u8>, ProgramError> {
    if account.owner != program_id {
        msg!("{}: account {} is owned by {}", kind, account.key, account.owner);
        return Err(VaultError::IllegalOwner.into());
    }
    let data = account.try_borrow_data()?;
    if data.is_empty() {
        return Err(VaultError::AccountNotInitialized.into());
    }
    if data.len() != size {
        msg!("{}: size mismatch - expected: {}, actual: {}", kind, size, data.len());
        return Err(VaultError::InvalidAccountData.into());
    }
    Ok(data.to_vec())
}

fn check_key(actual: AccountKey, expected: AccountKey, kind: &str) -> Result<(), ProgramError> {
    match actual {
        key if key == expected => Ok(()),
        AccountKey::Uninitialized => Err(VaultError::AccountNotInitialized.into()),
        other => {
            msg!("{}: record kind mismatch, found {:?}", kind, other);
            Err(VaultError::InvalidAccountData.into())
        }
    }
}

fn store_record<T: BorshSerialize>(
    record: &T,
    account: &AccountInfo,
    size: usize,
) -> Result<(), ProgramError> {
    let serialized = record
        .try_to_vec()
        .map_err(|_| VaultError::InvalidAccountData)?;
    let mut data = account.try_borrow_mut_data()?;
    if serialized.len() != size || data.len() != size {
        msg!("Store: size mismatch - record: {}, account: {}", serialized.len(), data.len());
        return Err(VaultError::InvalidAccountData.into());
    }
    data.copy_from_slice(&serialized);
    Ok(())
}
