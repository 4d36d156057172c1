use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;

use constants::MAX_STRATEGIES;
use instructions::*;

declare_id!("79T5qF6LsYDtMFfvWK5CgYAXBvNQPynJi6fbegUDVKDy");

#[program]
pub mod allocator_vault {
    use super::*;

    pub fn initialize_vault(
        ctx: Context<InitializeVault>,
        deposit_limit: u64,
        vault_fee_bps: u16,
        keeper: Pubkey,
        rewards: Pubkey,
    ) -> Result<()> {
        instructions::initialize_vault::handle_initialize_vault(
            ctx,
            deposit_limit,
            vault_fee_bps,
            keeper,
            rewards,
        )
    }

    pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
        instructions::deposit::handle_deposit(ctx, amount)
    }

    pub fn withdraw<'info>(
        ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
        shares: u64,
        max_loss_bps: u16,
    ) -> Result<()> {
        instructions::withdraw::handle_withdraw(ctx, shares, max_loss_bps)
    }

    pub fn add_strategy(
        ctx: Context<AddStrategy>,
        debt_ratio: u16,
        min_debt_per_harvest: u64,
        max_debt_per_harvest: u64,
    ) -> Result<()> {
        instructions::add_strategy::handle_add_strategy(
            ctx,
            debt_ratio,
            min_debt_per_harvest,
            max_debt_per_harvest,
        )
    }

    pub fn report(ctx: Context<Report>, gain: u64, loss: u64, debt_payment: u64) -> Result<()> {
        instructions::report::handle_report(ctx, gain, loss, debt_payment)
    }

    pub fn set_debt_ratio(ctx: Context<SetDebtRatio>, new_ratio: u16) -> Result<()> {
        instructions::set_debt_ratio::handle_set_debt_ratio(ctx, new_ratio)
    }

    pub fn set_debt_ratios<'info>(
        ctx: Context<'_, '_, 'info, 'info, SetDebtRatios<'info>>,
        ratios: Vec<u16>,
    ) -> Result<()> {
        instructions::set_debt_ratio::handle_set_debt_ratios(ctx, ratios)
    }

    pub fn set_withdrawal_queue<'info>(
        ctx: Context<'_, '_, 'info, 'info, SetWithdrawalQueue<'info>>,
        queue: [Pubkey; MAX_STRATEGIES],
    ) -> Result<()> {
        instructions::set_withdrawal_queue::handle_set_withdrawal_queue(ctx, queue)
    }

    pub fn revoke_strategy(ctx: Context<RevokeStrategy>) -> Result<()> {
        instructions::revoke_strategy::handle_revoke_strategy(ctx)
    }

    pub fn migrate_strategy(ctx: Context<MigrateStrategy>) -> Result<()> {
        instructions::migrate_strategy::handle_migrate_strategy(ctx)
    }

    pub fn update_vault_config(
        ctx: Context<UpdateVaultConfig>,
        deposit_limit: Option<u64>,
        vault_fee_bps: Option<u16>,
        rewards: Option<Pubkey>,
        keeper: Option<Pubkey>,
    ) -> Result<()> {
        instructions::update_vault_config::handle_update_vault_config(
            ctx,
            deposit_limit,
            vault_fee_bps,
            rewards,
            keeper,
        )
    }

    pub fn sweep(ctx: Context<Sweep>) -> Result<()> {
        instructions::sweep::handle_sweep(ctx)
    }
}
