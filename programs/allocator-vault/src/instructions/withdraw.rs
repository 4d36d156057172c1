use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::errors::VaultError;
use crate::events::Withdrawn;
use crate::state::{DepositReceipt, StrategyLiquidity, StrategyState, Vault};

#[derive(Accounts)]
pub struct Withdraw<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.underlying_mint.as_ref()],
        bump = vault.bump,
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        seeds = [DEPOSIT_RECEIPT_SEED, vault.key().as_ref(), depositor.key().as_ref()],
        bump = receipt.bump,
        constraint = receipt.depositor == depositor.key() @ VaultError::Unauthorized,
    )]
    pub receipt: Account<'info, DepositReceipt>,

    #[account(
        mut,
        constraint = underlying_vault.key() == vault.underlying_vault @ VaultError::InvalidVaultAccount,
    )]
    pub underlying_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = depositor_token_account.mint == vault.underlying_mint @ VaultError::MintMismatch,
    )]
    pub depositor_token_account: Account<'info, TokenAccount>,

    #[account(mut)]
    pub depositor: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

/// Redeems `shares` against the vault, draining loose balance first and then
/// the withdrawal queue. `remaining_accounts` must carry, for every occupied
/// queue slot in order, the strategy state followed by its liquid buffer.
pub fn handle_withdraw<'info>(
    ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
    shares: u64,
    max_loss_bps: u16,
) -> Result<()> {
    require!(shares > 0, VaultError::ZeroWithdraw);
    require!(
        ctx.accounts.receipt.shares >= shares,
        VaultError::InsufficientShares
    );

    let loose = ctx.accounts.underlying_vault.amount;

    // Pair every occupied queue slot with the caller-supplied accounts
    let mut strategy_accounts: Vec<(Account<'info, StrategyState>, AccountInfo<'info>)> =
        Vec::new();
    let mut liquidity: Vec<StrategyLiquidity> = Vec::new();
    let mut remaining = ctx.remaining_accounts.iter();
    for key in ctx
        .accounts
        .vault
        .withdrawal_queue
        .iter()
        .filter(|k| **k != Pubkey::default())
    {
        let state_info = remaining.next().ok_or(VaultError::InvalidQueue)?;
        require_keys_eq!(state_info.key(), *key, VaultError::InvalidQueue);
        let token_info = remaining.next().ok_or(VaultError::InvalidQueue)?;

        let state: Account<'info, StrategyState> = Account::try_from(state_info)?;
        require_keys_eq!(
            state.vault,
            ctx.accounts.vault.key(),
            VaultError::WrongVault
        );
        require_keys_eq!(
            state.token_account,
            token_info.key(),
            VaultError::InvalidVaultAccount
        );
        let buffer: Account<'info, TokenAccount> = Account::try_from(token_info)?;

        liquidity.push(StrategyLiquidity {
            total_debt: state.total_debt,
            liquid: buffer.amount,
        });
        strategy_accounts.push((state, token_info.clone()));
    }

    let vault = &mut ctx.accounts.vault;
    let plan = vault.plan_withdrawal(shares, max_loss_bps, loose, &liquidity)?;

    // Commit all ledger mutations before any token movement
    let mut states: Vec<StrategyState> = strategy_accounts
        .iter()
        .map(|(account, _)| (**account).clone())
        .collect();
    vault.apply_withdrawal(&plan, &mut states)?;

    let receipt = &mut ctx.accounts.receipt;
    receipt.shares = receipt
        .shares
        .checked_sub(plan.shares_burned)
        .ok_or(VaultError::MathOverflow)?;

    let vault_key = ctx.accounts.vault.key();
    let mint_key = ctx.accounts.vault.underlying_mint;
    let vault_bump = ctx.accounts.vault.bump;
    let signer_seeds = &[VAULT_SEED, mint_key.as_ref(), &[vault_bump]];
    let signer = &[&signer_seeds[..]];

    for (i, (account, token_info)) in strategy_accounts.iter_mut().enumerate() {
        **account = states[i].clone();
        account.exit(&crate::ID)?;

        if let Some(pull) = plan.pulls.iter().find(|p| p.index == i) {
            if pull.withdrawn > 0 {
                token::transfer(
                    CpiContext::new_with_signer(
                        ctx.accounts.token_program.to_account_info(),
                        Transfer {
                            from: token_info.clone(),
                            to: ctx.accounts.underlying_vault.to_account_info(),
                            authority: ctx.accounts.vault.to_account_info(),
                        },
                        signer,
                    ),
                    pull.withdrawn,
                )?;
            }
        }
    }

    if plan.amount > 0 {
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.underlying_vault.to_account_info(),
                    to: ctx.accounts.depositor_token_account.to_account_info(),
                    authority: ctx.accounts.vault.to_account_info(),
                },
                signer,
            ),
            plan.amount,
        )?;
    }

    emit!(Withdrawn {
        vault: vault_key,
        depositor: ctx.accounts.depositor.key(),
        amount: plan.amount,
        shares_burned: plan.shares_burned,
        total_loss: plan.total_loss,
    });

    Ok(())
}
