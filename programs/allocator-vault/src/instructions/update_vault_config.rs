use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::VaultError;
use crate::events::VaultConfigUpdated;
use crate::state::Vault;

#[derive(Accounts)]
pub struct UpdateVaultConfig<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.underlying_mint.as_ref()],
        bump = vault.bump,
        constraint = vault.governance == governance.key() @ VaultError::Unauthorized,
    )]
    pub vault: Account<'info, Vault>,

    pub governance: Signer<'info>,
}

pub fn handle_update_vault_config(
    ctx: Context<UpdateVaultConfig>,
    deposit_limit: Option<u64>,
    vault_fee_bps: Option<u16>,
    rewards: Option<Pubkey>,
    keeper: Option<Pubkey>,
) -> Result<()> {
    let vault = &mut ctx.accounts.vault;

    if let Some(limit) = deposit_limit {
        vault.deposit_limit = limit;
    }

    if let Some(fee) = vault_fee_bps {
        require!(fee as u64 <= MAX_BPS, VaultError::InvalidFee);
        vault.vault_fee_bps = fee;
    }

    if let Some(rewards) = rewards {
        vault.rewards = rewards;
    }

    if let Some(keeper) = keeper {
        vault.keeper = keeper;
    }

    emit!(VaultConfigUpdated {
        vault: vault.key(),
        deposit_limit: vault.deposit_limit,
        vault_fee_bps: vault.vault_fee_bps,
        rewards: vault.rewards,
        keeper: vault.keeper,
    });

    Ok(())
}
