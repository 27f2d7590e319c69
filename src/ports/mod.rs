pub mod config;
pub mod task_id;
pub mod transfer;

pub use config::ConfigStore;
pub use task_id::TaskIdGenerator;
pub use transfer::{ProgressCallback, TransferClient};
