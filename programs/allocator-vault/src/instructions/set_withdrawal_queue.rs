use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::VaultError;
use crate::events::WithdrawalQueueUpdated;
use crate::state::{StrategyState, Vault};

#[derive(Accounts)]
pub struct SetWithdrawalQueue<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.underlying_mint.as_ref()],
        bump = vault.bump,
        constraint = vault.governance == governance.key() @ VaultError::Unauthorized,
    )]
    pub vault: Account<'info, Vault>,

    pub governance: Signer<'info>,
}

/// Replaces the full withdrawal ordering. Every occupied slot must name an
/// activated strategy of this vault, passed in order via remaining accounts.
pub fn handle_set_withdrawal_queue<'info>(
    ctx: Context<'_, '_, 'info, 'info, SetWithdrawalQueue<'info>>,
    queue: [Pubkey; MAX_STRATEGIES],
) -> Result<()> {
    let vault = &mut ctx.accounts.vault;

    let occupied: Vec<Pubkey> = queue
        .iter()
        .copied()
        .filter(|k| *k != Pubkey::default())
        .collect();
    require!(
        ctx.remaining_accounts.len() == occupied.len(),
        VaultError::InvalidQueue
    );

    for (i, (key, info)) in occupied
        .iter()
        .zip(ctx.remaining_accounts.iter())
        .enumerate()
    {
        // no duplicate entries
        require!(
            !occupied[..i].contains(key),
            VaultError::InvalidQueue
        );
        require_keys_eq!(info.key(), *key, VaultError::InvalidQueue);
        let strategy: Account<'info, StrategyState> = Account::try_from(info)?;
        require_keys_eq!(strategy.vault, vault.key(), VaultError::WrongVault);
        require!(strategy.activated, VaultError::NotActivated);
    }

    vault.withdrawal_queue = queue;

    emit!(WithdrawalQueueUpdated {
        vault: vault.key(),
        queue,
    });

    Ok(())
}
