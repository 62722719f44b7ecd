pub mod create_cron;
pub mod deploy_contract;

pub use create_cron::CreateCronJob;
pub use deploy_contract::{ArtifactSource, DeployContractJob, DeploymentSummary};
