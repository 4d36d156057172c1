use anchor_lang::prelude::*;

#[error_code]
pub enum VaultError {
    #[msg("Unauthorized: signer does not match expected authority")]
    Unauthorized,

    #[msg("Math overflow")]
    MathOverflow,

    #[msg("Deposit amount must be greater than zero")]
    ZeroDeposit,

    #[msg("Withdraw shares must be greater than zero")]
    ZeroWithdraw,

    #[msg("Deposit would exceed the vault deposit limit")]
    DepositLimitExceeded,

    #[msg("Deposit too small to mint any shares")]
    NoSharesMinted,

    #[msg("Insufficient shares for withdrawal")]
    InsufficientShares,

    #[msg("Token mint does not match the vault's underlying mint")]
    MintMismatch,

    #[msg("Token account does not match the expected vault account")]
    InvalidVaultAccount,

    #[msg("Invalid fee: must be between 0 and 10000 basis points")]
    InvalidFee,

    #[msg("Max loss tolerance exceeds 10000 basis points")]
    InvalidMaxLoss,

    #[msg("Strategy is already activated")]
    AlreadyActive,

    #[msg("Strategy is not activated")]
    NotActivated,

    #[msg("Aggregate debt ratio would exceed 10000 basis points")]
    DebtRatioExceeded,

    #[msg("minDebtPerHarvest must not exceed maxDebtPerHarvest")]
    BadBounds,

    #[msg("Withdrawal queue is full")]
    QueueFull,

    #[msg("Strategy does not belong to this vault")]
    WrongVault,

    #[msg("Strategy not found in the withdrawal queue")]
    StrategyNotInQueue,

    #[msg("Accounts do not match the withdrawal queue")]
    InvalidQueue,

    #[msg("Strategy reported more gain than it made transferable")]
    OverReportedGain,

    #[msg("Strategy reported a loss larger than its outstanding debt")]
    OverReportedLoss,

    #[msg("Realized withdrawal loss exceeds the caller's max loss")]
    LossExceedsMaxLoss,

    #[msg("Cannot sweep the vault's managed underlying token")]
    CannotSweepUnderlying,
}
