use solana_program::{
    account_info::AccountInfo,
    entrypoint,
    entrypoint::ProgramResult,
    program_error::PrintProgramError,
    pubkey::Pubkey,
};

// Program modules
pub mod error;
pub mod guard;
pub mod instruction;
pub mod math;
pub mod payment;
pub mod policy;
pub mod processor;
pub mod state;
pub mod utils;
pub mod vulnerable;

pub use error::VaultError;
pub use instruction::VaultInstruction;
pub use policy::{Configuration, Secure};
pub use state::{AccountKey, UserCredit, Vault};
pub use vulnerable::Vulnerable;

// Program entrypoint
#[cfg(all(not(feature = "no-entrypoint"), not(feature = "payment-program")))]
entrypoint!(process_instruction);

/// Main program entry point
pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    if let Err(error) = processor::process_instruction(program_id, accounts, instruction_data) {
        error.print::<VaultError>();
        return Err(error);
    }
    Ok(())
}

solana_program::declare_id!("tJ3RVWjt66opLJdVJXBeEAQuKbwbDQq5fKg3cTxod1o");
