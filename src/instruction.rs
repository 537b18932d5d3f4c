use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::error::VaultError;

/// Instructions supported by the vault program
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub enum VaultInstruction {
    /// Create the vault and set its authority
    ///
    /// Accounts expected:
    /// 0. [signer, writable] Payer
    /// 1. [] Authority
    /// 2. [writable] Vault (PDA `["vault"]`)
    /// 3. [] System program
    Initialize,

    /// Create the caller's credit record at zero
    ///
    /// Accounts expected:
    /// 0. [signer, writable] User
    /// 1. [] Vault
    /// 2. [writable] User credit (PDA `["credit", vault, user]`)
    /// 3. [] System program
    InitUser,

    /// Deposit lamports directly through the system program
    ///
    /// Accounts expected:
    /// 0. [signer, writable] User
    /// 1. [writable] Vault
    /// 2. [writable] User credit
    /// 3. [] System program
    Deposit { amount: u64 },

    /// Deposit through the pinned payment program, crediting only confirmed value
    ///
    /// Accounts expected:
    /// 0. [signer, writable] User
    /// 1. [writable] Vault
    /// 2. [writable] User credit
    /// 3. [] Payment program
    /// 4. [] System program
    DepositSecure { amount: u64 },

    /// Negative control for `DepositSecure`: any payment program, unconditional credit
    ///
    /// Accounts expected: same as `DepositSecure`
    DepositVulnerable { amount: u64 },

    /// Withdraw against the caller's credits
    ///
    /// Accounts expected:
    /// 0. [signer, writable] User
    /// 1. [writable] Vault
    /// 2. [writable] User credit
    /// 3. [writable] Recipient (must be the user)
    Withdraw { amount: u64 },

    /// Same operation as `Withdraw`, paired with `WithdrawVulnerable`
    ///
    /// Accounts expected: same as `Withdraw`
    WithdrawSecure { amount: u64 },

    /// Negative control for `WithdrawSecure`: wrapping math, unbound accounts
    ///
    /// Accounts expected: same as `Withdraw`
    WithdrawVulnerable { amount: u64 },

    /// Replace the vault authority
    ///
    /// Accounts expected:
    /// 0. [signer] Current authority
    /// 1. [writable] Vault
    SetAuthoritySecure { new_authority: Pubkey },

    /// Negative control for `SetAuthoritySecure`: authority need not sign
    ///
    /// Accounts expected:
    /// 0. [] Current authority
    /// 1. [writable] Vault
    SetAuthorityVulnerable { new_authority: Pubkey },
}

impl VaultInstruction {
    fn pack(&self) -> Result<Vec<u8>, ProgramError> {
        self.try_to_vec()
            .map_err(|_| VaultError::InvalidInstruction.into())
    }

    /// Create an Initialize instruction
    pub fn initialize(
        program_id: &Pubkey,
        payer: &Pubkey,
        authority: &Pubkey,
        vault: &Pubkey,
    ) -> Result<Instruction, ProgramError> {
        let accounts = vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new_readonly(*authority, false),
            AccountMeta::new(*vault, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ];

        Ok(Instruction {
            program_id: *program_id,
            accounts,
            data: VaultInstruction::Initialize.pack()?,
        })
    }

    /// Create an InitUser instruction
    pub fn init_user(
        program_id: &Pubkey,
        user: &Pubkey,
        vault: &Pubkey,
        user_credit: &Pubkey,
    ) -> Result<Instruction, ProgramError> {
        let accounts = vec![
            AccountMeta::new(*user, true),
            AccountMeta::new_readonly(*vault, false),
            AccountMeta::new(*user_credit, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ];

        Ok(Instruction {
            program_id: *program_id,
            accounts,
            data: VaultInstruction::InitUser.pack()?,
        })
    }

    /// Create a direct Deposit instruction
    pub fn deposit(
        program_id: &Pubkey,
        user: &Pubkey,
        vault: &Pubkey,
        user_credit: &Pubkey,
        amount: u64,
    ) -> Result<Instruction, ProgramError> {
        let accounts = vec![
            AccountMeta::new(*user, true),
            AccountMeta::new(*vault, false),
            AccountMeta::new(*user_credit, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ];

        Ok(Instruction {
            program_id: *program_id,
            accounts,
            data: VaultInstruction::Deposit { amount }.pack()?,
        })
    }

    /// Create a DepositSecure instruction
    pub fn deposit_secure(
        program_id: &Pubkey,
        user: &Pubkey,
        vault: &Pubkey,
        user_credit: &Pubkey,
        payment_program: &Pubkey,
        amount: u64,
    ) -> Result<Instruction, ProgramError> {
        Self::deposit_via_payment(
            program_id,
            user,
            vault,
            user_credit,
            payment_program,
            VaultInstruction::DepositSecure { amount },
        )
    }

    /// Create a DepositVulnerable instruction
    pub fn deposit_vulnerable(
        program_id: &Pubkey,
        user: &Pubkey,
        vault: &Pubkey,
        user_credit: &Pubkey,
        payment_program: &Pubkey,
        amount: u64,
    ) -> Result<Instruction, ProgramError> {
        Self::deposit_via_payment(
            program_id,
            user,
            vault,
            user_credit,
            payment_program,
            VaultInstruction::DepositVulnerable { amount },
        )
    }

    fn deposit_via_payment(
        program_id: &Pubkey,
        user: &Pubkey,
        vault: &Pubkey,
        user_credit: &Pubkey,
        payment_program: &Pubkey,
        instruction: VaultInstruction,
    ) -> Result<Instruction, ProgramError> {
        let accounts = vec![
            AccountMeta::new(*user, true),
            AccountMeta::new(*vault, false),
            AccountMeta::new(*user_credit, false),
            AccountMeta::new_readonly(*payment_program, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ];

        Ok(Instruction {
            program_id: *program_id,
            accounts,
            data: instruction.pack()?,
        })
    }

    /// Create a Withdraw instruction paying out to the user
    pub fn withdraw(
        program_id: &Pubkey,
        user: &Pubkey,
        vault: &Pubkey,
        user_credit: &Pubkey,
        amount: u64,
    ) -> Result<Instruction, ProgramError> {
        Self::withdraw_to(
            program_id,
            user,
            vault,
            user_credit,
            user,
            VaultInstruction::Withdraw { amount },
        )
    }

    /// Create a WithdrawSecure instruction
    pub fn withdraw_secure(
        program_id: &Pubkey,
        user: &Pubkey,
        vault: &Pubkey,
        user_credit: &Pubkey,
        recipient: &Pubkey,
        amount: u64,
    ) -> Result<Instruction, ProgramError> {
        Self::withdraw_to(
            program_id,
            user,
            vault,
            user_credit,
            recipient,
            VaultInstruction::WithdrawSecure { amount },
        )
    }

    /// Create a WithdrawVulnerable instruction
    ///
    /// `user_is_signer` sets whether the user account is marked as a signer.
    pub fn withdraw_vulnerable(
        program_id: &Pubkey,
        user: &Pubkey,
        user_is_signer: bool,
        vault: &Pubkey,
        user_credit: &Pubkey,
        recipient: &Pubkey,
        amount: u64,
    ) -> Result<Instruction, ProgramError> {
        let mut instruction = Self::withdraw_to(
            program_id,
            user,
            vault,
            user_credit,
            recipient,
            VaultInstruction::WithdrawVulnerable { amount },
        )?;
        instruction.accounts[0] = if user_is_signer {
            AccountMeta::new(*user, true)
        } else {
            AccountMeta::new_readonly(*user, false)
        };
        Ok(instruction)
    }

    fn withdraw_to(
        program_id: &Pubkey,
        user: &Pubkey,
        vault: &Pubkey,
        user_credit: &Pubkey,
        recipient: &Pubkey,
        instruction: VaultInstruction,
    ) -> Result<Instruction, ProgramError> {
        let accounts = vec![
            AccountMeta::new(*user, true),
            AccountMeta::new(*vault, false),
            AccountMeta::new(*user_credit, false),
            AccountMeta::new(*recipient, false),
        ];

        Ok(Instruction {
            program_id: *program_id,
            accounts,
            data: instruction.pack()?,
        })
    }

    /// Create a SetAuthoritySecure instruction
    pub fn set_authority_secure(
        program_id: &Pubkey,
        authority: &Pubkey,
        vault: &Pubkey,
        new_authority: &Pubkey,
    ) -> Result<Instruction, ProgramError> {
        let accounts = vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(*vault, false),
        ];

        Ok(Instruction {
            program_id: *program_id,
            accounts,
            data: VaultInstruction::SetAuthoritySecure {
                new_authority: *new_authority,
            }
            .pack()?,
        })
    }

    /// Create a SetAuthorityVulnerable instruction (authority passed unsigned)
    pub fn set_authority_vulnerable(
        program_id: &Pubkey,
        authority: &Pubkey,
        vault: &Pubkey,
        new_authority: &Pubkey,
    ) -> Result<Instruction, ProgramError> {
        let accounts = vec![
            AccountMeta::new_readonly(*authority, false),
            AccountMeta::new(*vault, false),
        ];

        Ok(Instruction {
            program_id: *program_id,
            accounts,
            data: VaultInstruction::SetAuthorityVulnerable {
                new_authority: *new_authority,
            }
            .pack()?,
        })
    }
}

/// Parse instruction data into VaultInstruction
pub fn unpack(input: &[u8]) -> Result<VaultInstruction, ProgramError> {
    if input.is_empty() {
        return Err(VaultError::InvalidInstruction.into());
    }

    VaultInstruction::try_from_slice(input).map_err(|_| VaultError::InvalidInstruction.into())
}

/// Validate instruction data format and amount
pub fn validate_instruction_data(data: &[u8]) -> Result<(), ProgramError> {
    match unpack(data)? {
        VaultInstruction::Deposit { amount }
        | VaultInstruction::DepositSecure { amount }
        | VaultInstruction::DepositVulnerable { amount }
        | VaultInstruction::Withdraw { amount }
        | VaultInstruction::WithdrawSecure { amount }
        | VaultInstruction::WithdrawVulnerable { amount } => {
            if amount == 0 {
                return Err(VaultError::InvalidAmount.into());
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
