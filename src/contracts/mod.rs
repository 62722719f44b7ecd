pub mod cron;
pub mod tick;

pub use cron::CronContract;
pub use tick::{ContractInfo, TickContract};
