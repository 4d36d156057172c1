pub mod initialize_vault;
pub mod deposit;
pub mod withdraw;
pub mod add_strategy;
pub mod set_debt_ratio;
pub mod set_withdrawal_queue;
pub mod revoke_strategy;
pub mod migrate_strategy;
pub mod report;
pub mod update_vault_config;
pub mod sweep;

pub use initialize_vault::*;
pub use deposit::*;
pub use withdraw::*;
pub use add_strategy::*;
pub use set_debt_ratio::*;
pub use set_withdrawal_queue::*;
pub use revoke_strategy::*;
pub use migrate_strategy::*;
pub use report::*;
pub use update_vault_config::*;
pub use sweep::*;
