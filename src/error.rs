use num_traits::FromPrimitive;
use solana_program::{
    decode_error::DecodeError,
    msg,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

/// First custom code. Codes below it belong to the system program and
/// other invoked programs, so they never decode as a `VaultError`.
pub const ERROR_CODE_OFFSET: u32 = 6000;

/// Custom error types for the vault program
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// Instruction data could not be decoded
    #[error("Invalid instruction")]
    InvalidInstruction = 6000,

    /// Amount must be greater than zero
    #[error("Invalid amount")]
    InvalidAmount,

    /// Vault or credit record already exists
    #[error("Account already initialized")]
    AlreadyInitialized,

    /// Record has not been created yet
    #[error("Account not initialized")]
    AccountNotInitialized,

    /// Record bytes do not match the expected kind or size
    #[error("Invalid account data")]
    InvalidAccountData,

    /// Record is not owned by this program
    #[error("Illegal account owner")]
    IllegalOwner,

    /// Not the vault authority
    #[error("Authority mismatch")]
    AuthorityMismatch,

    /// Required signature is missing
    #[error("Missing signature")]
    MissingSignature,

    /// Supplied account is not the derived address for its role
    #[error("Invalid account address")]
    InvalidAccountAddress,

    /// Withdrawal recipient is not the caller
    #[error("Recipient mismatch")]
    RecipientMismatch,

    /// Supplied system program is not the system program
    #[error("Invalid system program")]
    InvalidSystemProgram,

    /// Payment program is not the trusted one
    #[error("Untrusted CPI target")]
    UntrustedCpiTarget,

    /// Payment program returned but value did not move
    #[error("Payment not confirmed")]
    PaymentNotConfirmed,

    /// Caller's credits are below the requested amount
    #[error("Insufficient credits")]
    InsufficientCredits,

    /// Vault balance is below the requested amount
    #[error("Insufficient balance")]
    InsufficientBalance,

    /// Arithmetic overflow
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    /// No tie-break value produced an off-curve address
    #[error("No valid bump found")]
    NoValidBumpFound,
}

impl VaultError {
    const ALL: [VaultError; 17] = [
        VaultError::InvalidInstruction,
        VaultError::InvalidAmount,
        VaultError::AlreadyInitialized,
        VaultError::AccountNotInitialized,
        VaultError::InvalidAccountData,
        VaultError::IllegalOwner,
        VaultError::AuthorityMismatch,
        VaultError::MissingSignature,
        VaultError::InvalidAccountAddress,
        VaultError::RecipientMismatch,
        VaultError::InvalidSystemProgram,
        VaultError::UntrustedCpiTarget,
        VaultError::PaymentNotConfirmed,
        VaultError::InsufficientCredits,
        VaultError::InsufficientBalance,
        VaultError::ArithmeticOverflow,
        VaultError::NoValidBumpFound,
    ];
}

impl From<VaultError> for ProgramError {
    fn from(e: VaultError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl FromPrimitive for VaultError {
    fn from_i64(n: i64) -> Option<Self> {
        u64::try_from(n).ok().and_then(Self::from_u64)
    }

    fn from_u64(n: u64) -> Option<Self> {
        n.checked_sub(u64::from(ERROR_CODE_OFFSET))
            .and_then(|index| usize::try_from(index).ok())
            .and_then(|index| Self::ALL.get(index).copied())
    }
}

impl<T> DecodeError<T> for VaultError {
    fn type_of() -> &'static str {
        "VaultError"
    }
}

impl PrintProgramError for VaultError {
    fn print<E>(&self)
    where
        E: 'static + std::error::Error + DecodeError<E> + PrintProgramError + FromPrimitive,
    {
        match self {
            VaultError::InvalidInstruction => msg!("Error: Instruction data could not be decoded"),
            VaultError::InvalidAmount => msg!("Error: Amount must be greater than zero"),
            VaultError::AlreadyInitialized => msg!("Error: Account is already initialized"),
            VaultError::AccountNotInitialized => msg!("Error: Account is not initialized"),
            VaultError::InvalidAccountData => msg!("Error: Wrong record kind or size"),
            VaultError::IllegalOwner => msg!("Error: Account is not owned by this program"),
            VaultError::AuthorityMismatch => msg!("Error: Not the vault authority"),
            VaultError::MissingSignature => msg!("Error: Required signature is missing"),
            VaultError::InvalidAccountAddress => msg!("Error: Not the expected derived address"),
            VaultError::RecipientMismatch => msg!("Error: Recipient must be the caller"),
            VaultError::InvalidSystemProgram => msg!("Error: Invalid system program"),
            VaultError::UntrustedCpiTarget => msg!("Error: Payment program is not trusted"),
            VaultError::PaymentNotConfirmed => msg!("Error: Claimed value did not arrive"),
            VaultError::InsufficientCredits => msg!("Error: Insufficient credits"),
            VaultError::InsufficientBalance => msg!("Error: Insufficient vault balance"),
            VaultError::ArithmeticOverflow => msg!("Error: Arithmetic overflow occurred"),
            VaultError::NoValidBumpFound => msg!("Error: No valid bump seed found"),
        }
    }
}
