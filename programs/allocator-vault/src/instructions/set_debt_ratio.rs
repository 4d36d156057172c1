use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::VaultError;
use crate::events::DebtRatioUpdated;
use crate::state::{StrategyState, Vault};

#[derive(Accounts)]
pub struct SetDebtRatio<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.underlying_mint.as_ref()],
        bump = vault.bump,
        constraint = vault.governance == governance.key() @ VaultError::Unauthorized,
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        constraint = strategy.vault == vault.key() @ VaultError::WrongVault,
    )]
    pub strategy: Account<'info, StrategyState>,

    pub governance: Signer<'info>,
}

pub fn handle_set_debt_ratio(ctx: Context<SetDebtRatio>, new_ratio: u16) -> Result<()> {
    let vault = &mut ctx.accounts.vault;
    let strategy = &mut ctx.accounts.strategy;

    vault.update_strategy_debt_ratio(strategy, new_ratio)?;

    emit!(DebtRatioUpdated {
        vault: vault.key(),
        strategy: strategy.key(),
        debt_ratio: new_ratio,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct SetDebtRatios<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.underlying_mint.as_ref()],
        bump = vault.bump,
        constraint = vault.governance == governance.key() @ VaultError::Unauthorized,
    )]
    pub vault: Account<'info, Vault>,

    pub governance: Signer<'info>,
}

/// Batch ratio update across the whole queue. `ratios` and
/// `remaining_accounts` both follow occupied-queue-slot order.
pub fn handle_set_debt_ratios<'info>(
    ctx: Context<'_, '_, 'info, 'info, SetDebtRatios<'info>>,
    ratios: Vec<u16>,
) -> Result<()> {
    let vault = &mut ctx.accounts.vault;

    let queued: Vec<Pubkey> = vault
        .withdrawal_queue
        .iter()
        .copied()
        .filter(|k| *k != Pubkey::default())
        .collect();
    require!(ratios.len() == queued.len(), VaultError::InvalidQueue);
    require!(
        ctx.remaining_accounts.len() == queued.len(),
        VaultError::InvalidQueue
    );

    let mut total: u64 = 0;
    let mut accounts: Vec<Account<'info, StrategyState>> = Vec::new();
    for ((key, info), ratio) in queued
        .iter()
        .zip(ctx.remaining_accounts.iter())
        .zip(ratios.iter())
    {
        require_keys_eq!(info.key(), *key, VaultError::InvalidQueue);
        let mut strategy: Account<'info, StrategyState> = Account::try_from(info)?;
        require_keys_eq!(strategy.vault, vault.key(), VaultError::WrongVault);
        require!(strategy.activated, VaultError::NotActivated);

        strategy.debt_ratio = *ratio;
        total = total
            .checked_add(*ratio as u64)
            .ok_or(VaultError::MathOverflow)?;
        accounts.push(strategy);
    }
    require!(total <= MAX_BPS, VaultError::DebtRatioExceeded);

    vault.debt_ratio = total as u16;
    for strategy in accounts.iter_mut() {
        strategy.exit(&crate::ID)?;
        emit!(DebtRatioUpdated {
            vault: vault.key(),
            strategy: strategy.key(),
            debt_ratio: strategy.debt_ratio,
        });
    }

    Ok(())
}
