use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
    sysvar::Sysvar,
};

use crate::{
    error::VaultError,
    guard::{AccessGuard, StrictGuard},
    instruction::{unpack, validate_instruction_data, VaultInstruction},
    math::BalanceMath,
    payment::{self, PaymentVerifier},
    policy::{Configuration, Secure},
    state::{UserCredit, Vault},
    utils::{
        derive_credit_address, derive_vault_address, verify_address, verify_signer,
        verify_system_program, verify_uninitialized_account, verify_writable, CREDIT_SEED,
        VAULT_SEED,
    },
    vulnerable::Vulnerable,
};

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    validate_instruction_data(instruction_data)?;
    let instruction = unpack(instruction_data)?;

    match instruction {
        VaultInstruction::Initialize => process_initialize(program_id, accounts),
        VaultInstruction::InitUser => process_init_user(program_id, accounts),
        VaultInstruction::Deposit { amount } => process_deposit(program_id, accounts, amount),
        VaultInstruction::DepositSecure { amount } => {
            process_deposit_via_payment::<Secure>(program_id, accounts, amount)
        }
        VaultInstruction::DepositVulnerable { amount } => {
            process_deposit_via_payment::<Vulnerable>(program_id, accounts, amount)
        }
        VaultInstruction::Withdraw { amount } | VaultInstruction::WithdrawSecure { amount } => {
            process_withdraw::<Secure>(program_id, accounts, amount)
        }
        VaultInstruction::WithdrawVulnerable { amount } => {
            process_withdraw::<Vulnerable>(program_id, accounts, amount)
        }
        VaultInstruction::SetAuthoritySecure { new_authority } => {
            process_set_authority::<Secure>(program_id, accounts, new_authority)
        }
        VaultInstruction::SetAuthorityVulnerable { new_authority } => {
            process_set_authority::<Vulnerable>(program_id, accounts, new_authority)
        }
    }
}

/// Process Initialize instruction
/// Creates the vault PDA with the given authority and a zero balance
pub fn process_initialize(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let payer_info = next_account_info(account_info_iter)?;
    let authority_info = next_account_info(account_info_iter)?;
    let vault_info = next_account_info(account_info_iter)?;
    let system_program_info = next_account_info(account_info_iter)?;

    verify_signer(payer_info)?;
    verify_writable(vault_info)?;
    verify_system_program(system_program_info)?;

    let (vault_pda, vault_bump) = derive_vault_address(program_id)?;
    verify_address(vault_info, &vault_pda)?;
    verify_uninitialized_account(vault_info)?;

    let bump_seed = [vault_bump];
    create_pda_account(
        payer_info,
        vault_info,
        system_program_info,
        program_id,
        Vault::SIZE,
        &[VAULT_SEED, &bump_seed],
    )?;

    Vault::new(*authority_info.key).store(vault_info)?;

    msg!(
        "Vault initialized. Vault: {}, Authority: {}, Bump: {}",
        vault_info.key,
        authority_info.key,
        vault_bump
    );
    Ok(())
}

/// Process InitUser instruction
/// Creates the caller's credit record; a second call fails with AlreadyInitialized
pub fn process_init_user(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let user_info = next_account_info(account_info_iter)?;
    let vault_info = next_account_info(account_info_iter)?;
    let credit_info = next_account_info(account_info_iter)?;
    let system_program_info = next_account_info(account_info_iter)?;

    verify_signer(user_info)?;
    verify_writable(credit_info)?;
    verify_system_program(system_program_info)?;

    StrictGuard::bind_vault(program_id, vault_info)?;
    Vault::load(vault_info, program_id)?;

    let (credit_pda, credit_bump) =
        derive_credit_address(program_id, vault_info.key, user_info.key)?;
    verify_address(credit_info, &credit_pda)?;
    verify_uninitialized_account(credit_info)?;

    let bump_seed = [credit_bump];
    create_pda_account(
        user_info,
        credit_info,
        system_program_info,
        program_id,
        UserCredit::SIZE,
        &[
            CREDIT_SEED,
            vault_info.key.as_ref(),
            user_info.key.as_ref(),
            &bump_seed,
        ],
    )?;

    UserCredit::new(*user_info.key).store(credit_info)?;

    msg!("Credit record created for {} in vault {}", user_info.key, vault_info.key);
    Ok(())
}

/// Process Deposit instruction
/// Moves lamports from the user with a system transfer and credits the same amount
pub fn process_deposit(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    amount: u64,
) -> ProgramResult {
    type Guard = <Secure as Configuration>::Guard;
    type Math = <Secure as Configuration>::Math;

    let account_info_iter = &mut accounts.iter();
    let user_info = next_account_info(account_info_iter)?;
    let vault_info = next_account_info(account_info_iter)?;
    let credit_info = next_account_info(account_info_iter)?;
    let system_program_info = next_account_info(account_info_iter)?;

    Guard::require_caller(user_info)?;
    verify_writable(vault_info)?;
    verify_writable(credit_info)?;
    verify_system_program(system_program_info)?;

    let (mut vault, mut credit) =
        load_position::<Secure>(program_id, user_info, vault_info, credit_info)?;

    let balance = Math::increase(vault.balance, amount)?;
    let credits = Math::increase(credit.credits, amount)?;

    invoke(
        &system_instruction::transfer(user_info.key, vault_info.key, amount),
        &[
            user_info.clone(),
            vault_info.clone(),
            system_program_info.clone(),
        ],
    )?;

    vault.balance = balance;
    credit.credits = credits;
    vault.store(vault_info)?;
    credit.store(credit_info)?;

    msg!("Deposit: {} lamports from {}, credits now {}", amount, user_info.key, credits);
    Ok(())
}

/// Process DepositSecure / DepositVulnerable
///
/// Invokes the caller-named payment program and measures what reached the
/// vault. The balance follows the measured lamports; credits follow what the
/// configuration's verifier grants.
pub fn process_deposit_via_payment<C: Configuration>(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    amount: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let user_info = next_account_info(account_info_iter)?;
    let vault_info = next_account_info(account_info_iter)?;
    let credit_info = next_account_info(account_info_iter)?;
    let payment_program_info = next_account_info(account_info_iter)?;
    let system_program_info = next_account_info(account_info_iter)?;

    C::Guard::require_caller(user_info)?;
    verify_writable(vault_info)?;
    verify_writable(credit_info)?;
    verify_system_program(system_program_info)?;

    let (mut vault, mut credit) =
        load_position::<C>(program_id, user_info, vault_info, credit_info)?;

    C::Payment::check_target(payment_program_info)?;

    let lamports_before = vault_info.lamports();
    invoke(
        &payment::move_value(payment_program_info.key, user_info.key, vault_info.key, amount)?,
        &[
            user_info.clone(),
            vault_info.clone(),
            system_program_info.clone(),
            payment_program_info.clone(),
        ],
    )?;
    let observed = vault_info.lamports().saturating_sub(lamports_before);

    let granted = C::Payment::entitlement(amount, observed)?;
    vault.balance = C::Math::increase(vault.balance, observed)?;
    credit.credits = C::Math::increase(credit.credits, granted)?;
    vault.store(vault_info)?;
    credit.store(credit_info)?;

    msg!(
        "Deposit ({}): claimed {}, received {}, credited {} to {}",
        C::LABEL,
        amount,
        observed,
        granted,
        user_info.key
    );
    Ok(())
}

/// Process Withdraw / WithdrawSecure / WithdrawVulnerable
/// Debits the caller's credits and the vault balance, then pays the recipient
pub fn process_withdraw<C: Configuration>(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    amount: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let user_info = next_account_info(account_info_iter)?;
    let vault_info = next_account_info(account_info_iter)?;
    let credit_info = next_account_info(account_info_iter)?;
    let recipient_info = next_account_info(account_info_iter)?;

    C::Guard::require_caller(user_info)?;
    verify_writable(vault_info)?;
    verify_writable(credit_info)?;
    verify_writable(recipient_info)?;

    let (mut vault, mut credit) =
        load_position::<C>(program_id, user_info, vault_info, credit_info)?;
    C::Guard::bind_recipient(recipient_info, user_info)?;

    let credits = C::Math::decrease(credit.credits, amount, VaultError::InsufficientCredits)?;
    let balance = C::Math::decrease(vault.balance, amount, VaultError::InsufficientBalance)?;

    // The runtime rejects a program-owned account that drops below rent exemption.
    let rent_floor = Rent::get()?.minimum_balance(vault_info.data_len());
    let remaining_lamports = vault_info
        .lamports()
        .checked_sub(amount)
        .filter(|remaining| *remaining >= rent_floor)
        .ok_or_else(|| {
            msg!(
                "Withdraw: vault holds {} lamports, cannot release {}",
                vault_info.lamports(),
                amount
            );
            ProgramError::from(VaultError::InsufficientBalance)
        })?;

    credit.credits = credits;
    vault.balance = balance;
    vault.store(vault_info)?;
    credit.store(credit_info)?;

    **vault_info.try_borrow_mut_lamports()? = remaining_lamports;
    let recipient_lamports = recipient_info
        .lamports()
        .checked_add(amount)
        .ok_or(VaultError::ArithmeticOverflow)?;
    **recipient_info.try_borrow_mut_lamports()? = recipient_lamports;

    msg!(
        "Withdraw ({}): {} lamports to {}, credits now {}",
        C::LABEL,
        amount,
        recipient_info.key,
        credits
    );
    Ok(())
}

/// Process SetAuthoritySecure / SetAuthorityVulnerable
/// Replaces the vault authority; balance and credits are untouched
pub fn process_set_authority<C: Configuration>(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    new_authority: Pubkey,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let authority_info = next_account_info(account_info_iter)?;
    let vault_info = next_account_info(account_info_iter)?;

    verify_writable(vault_info)?;
    C::Guard::bind_vault(program_id, vault_info)?;
    let mut vault = Vault::load(vault_info, program_id)?;

    C::Guard::authorize(authority_info, &vault)?;

    let previous = vault.authority;
    vault.authority = new_authority;
    vault.store(vault_info)?;

    msg!("SetAuthority ({}): {} -> {}", C::LABEL, previous, new_authority);
    Ok(())
}

/// Bind and load the vault and the user's credit record under `C`'s guard
fn load_position<C: Configuration>(
    program_id: &Pubkey,
    user_info: &AccountInfo,
    vault_info: &AccountInfo,
    credit_info: &AccountInfo,
) -> Result<(Vault, UserCredit), ProgramError> {
    C::Guard::bind_vault(program_id, vault_info)?;
    let vault = Vault::load(vault_info, program_id)?;

    C::Guard::bind_credit(program_id, vault_info.key, user_info.key, credit_info)?;
    let credit = UserCredit::load(credit_info, program_id)?;

    Ok((vault, credit))
}

/// Create a program-owned PDA funded to rent exemption by `payer`
///
/// The address is public, so lamports may already sit there. `create_account`
/// refuses such an account; it is topped up to the rent minimum instead, then
/// allocated and assigned under the PDA's own signature.
fn create_pda_account<'a>(
    payer: &AccountInfo<'a>,
    new_account: &AccountInfo<'a>,
    system_program_info: &AccountInfo<'a>,
    program_id: &Pubkey,
    space: usize,
    signer_seeds: &[&[u8]],
) -> ProgramResult {
    let rent_minimum = Rent::get()?.minimum_balance(space);
    let current_lamports = new_account.lamports();

    if current_lamports == 0 {
        check_payer_funds(payer, rent_minimum)?;
        return invoke_signed(
            &system_instruction::create_account(
                payer.key,
                new_account.key,
                rent_minimum,
                space as u64,
                program_id,
            ),
            &[payer.clone(), new_account.clone(), system_program_info.clone()],
            &[signer_seeds],
        )
        .map_err(|e| {
            msg!("Failed to create account {}: {}", new_account.key, e);
            e
        });
    }

    msg!(
        "Account {} already holds {} lamports, taking it over",
        new_account.key,
        current_lamports
    );

    let top_up = rent_minimum.saturating_sub(current_lamports);
    if top_up > 0 {
        check_payer_funds(payer, top_up)?;
        invoke(
            &system_instruction::transfer(payer.key, new_account.key, top_up),
            &[payer.clone(), new_account.clone(), system_program_info.clone()],
        )?;
    }

    invoke_signed(
        &system_instruction::allocate(new_account.key, space as u64),
        &[new_account.clone(), system_program_info.clone()],
        &[signer_seeds],
    )?;
    invoke_signed(
        &system_instruction::assign(new_account.key, program_id),
        &[new_account.clone(), system_program_info.clone()],
        &[signer_seeds],
    )
}

fn check_payer_funds(payer: &AccountInfo, required: u64) -> ProgramResult {
    if payer.lamports() < required {
        msg!(
            "Insufficient lamports for rent exemption. Required: {}, Available: {}",
            required,
            payer.lamports()
        );
        return Err(ProgramError::InsufficientFunds);
    }
    Ok(())
}
