//! The trusted payment program and the checks the vault runs around it.
//!
//! Deposits can be routed through a separate program that moves value from
//! the depositor into the vault. The vault only trusts one such program,
//! pinned below by id, and only credits what it actually observed arriving.
//!
//! Building with the `payment-program` feature makes this module's
//! `process_instruction` the shared object's entrypoint, which is how the
//! payment program is deployed at [`ID`].

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    instruction::{AccountMeta, Instruction},
    msg,
    program::invoke,
    program_error::ProgramError,
    pubkey::Pubkey,
    system_instruction, system_program,
};

use crate::{
    error::VaultError,
    utils::{verify_signer, verify_system_program},
};

solana_program::declare_id!("2S1KrvmHnCG2bDdYAihwjD9SxZUUuiwuY8stTnwPoPek");

#[cfg(all(feature = "payment-program", not(feature = "no-entrypoint")))]
solana_program::entrypoint!(process_instruction);

/// Instructions understood by a payment program
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub enum PaymentInstruction {
    /// Move `amount` lamports from the payer into the destination
    ///
    /// Accounts expected:
    /// 0. [signer, writable] Payer
    /// 1. [writable] Destination
    /// 2. [] System program
    MoveValue { amount: u64 },
}

/// Build a `MoveValue` instruction addressed to `payment_program`
pub fn move_value(
    payment_program: &Pubkey,
    payer: &Pubkey,
    destination: &Pubkey,
    amount: u64,
) -> Result<Instruction, ProgramError> {
    let data = PaymentInstruction::MoveValue { amount }
        .try_to_vec()
        .map_err(|_| VaultError::InvalidInstruction)?;

    Ok(Instruction {
        program_id: *payment_program,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    })
}

/// Entry point of the trusted payment program
pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    if program_id != &ID {
        return Err(ProgramError::IncorrectProgramId);
    }

    let PaymentInstruction::MoveValue { amount } =
        PaymentInstruction::try_from_slice(instruction_data)
            .map_err(|_| VaultError::InvalidInstruction)?;
    if amount == 0 {
        msg!("MoveValue: amount must be greater than zero");
        return Err(VaultError::InvalidAmount.into());
    }

    let account_info_iter = &mut accounts.iter();
    let payer_info = next_account_info(account_info_iter)?;
    let destination_info = next_account_info(account_info_iter)?;
    let system_program_info = next_account_info(account_info_iter)?;

    verify_signer(payer_info)?;
    verify_system_program(system_program_info)?;

    invoke(
        &system_instruction::transfer(payer_info.key, destination_info.key, amount),
        &[
            payer_info.clone(),
            destination_info.clone(),
            system_program_info.clone(),
        ],
    )?;

    msg!("MoveValue: {} lamports {} -> {}", amount, payer_info.key, destination_info.key);
    Ok(())
}

/// What a configuration requires from a caller-named payment program.
pub trait PaymentVerifier {
    /// Accept or reject the program before it is invoked.
    fn check_target(payment_program: &AccountInfo) -> ProgramResult;

    /// Credits to grant once the program returned, given the amount the
    /// caller claimed and the lamports the vault actually gained.
    fn entitlement(claimed: u64, observed: u64) -> Result<u64, ProgramError>;
}

/// Only the pinned payment program, and only for value that really arrived.
pub struct PinnedPayment;

impl PaymentVerifier for PinnedPayment {
    fn check_target(payment_program: &AccountInfo) -> ProgramResult {
        if payment_program.key != &ID {
            msg!("Payment program {} is not trusted", payment_program.key);
            return Err(VaultError::UntrustedCpiTarget.into());
        }
        Ok(())
    }

    fn entitlement(claimed: u64, observed: u64) -> Result<u64, ProgramError> {
        if observed != claimed {
            msg!("Payment: claimed {} but vault gained {}", claimed, observed);
            return Err(VaultError::PaymentNotConfirmed.into());
        }
        Ok(claimed)
    }
}
