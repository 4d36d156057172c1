use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::VaultError;
use crate::events::StrategyRevoked;
use crate::state::{StrategyState, Vault};

#[derive(Accounts)]
pub struct RevokeStrategy<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.underlying_mint.as_ref()],
        bump = vault.bump,
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        constraint = strategy.vault == vault.key() @ VaultError::WrongVault,
    )]
    pub strategy: Account<'info, StrategyState>,

    /// Governance, or the strategy itself (self-service emergency exit)
    #[account(
        constraint = authority.key() == vault.governance
            || authority.key() == strategy.authority
            @ VaultError::Unauthorized,
    )]
    pub authority: Signer<'info>,
}

pub fn handle_revoke_strategy(ctx: Context<RevokeStrategy>) -> Result<()> {
    let vault = &mut ctx.accounts.vault;
    let strategy = &mut ctx.accounts.strategy;

    let released = vault.revoke_strategy(strategy)?;

    emit!(StrategyRevoked {
        vault: vault.key(),
        strategy: strategy.key(),
        released_debt_ratio: released,
    });

    Ok(())
}
