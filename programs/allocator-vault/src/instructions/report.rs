use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::errors::VaultError;
use crate::events::StrategyReported;
use crate::state::{DepositReceipt, NetTransfer, StrategyState, Vault};

#[derive(Accounts)]
pub struct Report<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.underlying_mint.as_ref()],
        bump = vault.bump,
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        seeds = [STRATEGY_SEED, vault.key().as_ref(), strategy_authority.key().as_ref()],
        bump = strategy.bump,
        constraint = strategy.vault == vault.key() @ VaultError::WrongVault,
    )]
    pub strategy: Account<'info, StrategyState>,

    #[account(
        mut,
        constraint = strategy_token_account.key() == strategy.token_account @ VaultError::InvalidVaultAccount,
    )]
    pub strategy_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = underlying_vault.key() == vault.underlying_vault @ VaultError::InvalidVaultAccount,
    )]
    pub underlying_vault: Account<'info, TokenAccount>,

    /// Fee shares land in the rewards account's receipt
    #[account(
        init_if_needed,
        seeds = [DEPOSIT_RECEIPT_SEED, vault.key().as_ref(), vault.rewards.as_ref()],
        bump,
        payer = keeper,
        space = DepositReceipt::SIZE,
    )]
    pub rewards_receipt: Account<'info, DepositReceipt>,

    /// The self-report is attested by the strategy's own identity
    pub strategy_authority: Signer<'info>,

    #[account(
        mut,
        constraint = keeper.key() == vault.keeper || keeper.key() == vault.governance
            @ VaultError::Unauthorized,
    )]
    pub keeper: Signer<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// Harvest reconciliation: validates the strategy's self-reported
/// (gain, loss, debt_payment) against its liquid buffer, applies it to the
/// ledger, then settles with a single net transfer.
pub fn handle_report(
    ctx: Context<Report>,
    gain: u64,
    loss: u64,
    debt_payment: u64,
) -> Result<()> {
    let loose = ctx.accounts.underlying_vault.amount;
    let strategy_liquid = ctx.accounts.strategy_token_account.amount;

    let vault = &mut ctx.accounts.vault;
    let strategy = &mut ctx.accounts.strategy;

    let outcome = vault.apply_report(strategy, gain, loss, debt_payment, strategy_liquid, loose)?;

    if outcome.fee_shares > 0 {
        let receipt = &mut ctx.accounts.rewards_receipt;
        if receipt.vault == Pubkey::default() {
            receipt.vault = vault.key();
            receipt.depositor = vault.rewards;
            receipt.bump = ctx.bumps.rewards_receipt;
        }
        receipt.shares = receipt
            .shares
            .checked_add(outcome.fee_shares)
            .ok_or(VaultError::MathOverflow)?;
    }

    let vault_key = ctx.accounts.vault.key();
    let mint_key = ctx.accounts.vault.underlying_mint;
    let vault_bump = ctx.accounts.vault.bump;
    let signer_seeds = &[VAULT_SEED, mint_key.as_ref(), &[vault_bump]];
    let signer = &[&signer_seeds[..]];

    match outcome.transfer {
        NetTransfer::ToVault(amount) => {
            token::transfer(
                CpiContext::new_with_signer(
                    ctx.accounts.token_program.to_account_info(),
                    Transfer {
                        from: ctx.accounts.strategy_token_account.to_account_info(),
                        to: ctx.accounts.underlying_vault.to_account_info(),
                        authority: ctx.accounts.vault.to_account_info(),
                    },
                    signer,
                ),
                amount,
            )?;
        }
        NetTransfer::ToStrategy(amount) => {
            token::transfer(
                CpiContext::new_with_signer(
                    ctx.accounts.token_program.to_account_info(),
                    Transfer {
                        from: ctx.accounts.underlying_vault.to_account_info(),
                        to: ctx.accounts.strategy_token_account.to_account_info(),
                        authority: ctx.accounts.vault.to_account_info(),
                    },
                    signer,
                ),
                amount,
            )?;
        }
        NetTransfer::None => {}
    }

    let strategy = &ctx.accounts.strategy;
    emit!(StrategyReported {
        vault: vault_key,
        strategy: strategy.key(),
        gain,
        loss,
        debt_paid: outcome.debt_paid,
        credit: outcome.credit,
        fee_shares: outcome.fee_shares,
        total_gain: strategy.total_gain,
        total_loss: strategy.total_loss,
        total_debt: strategy.total_debt,
    });

    Ok(())
}
