pub mod config_store;
pub mod http_transfer;
pub mod task_id;

pub use config_store::TomlConfigStore;
pub use http_transfer::HttpTransferClient;
pub use task_id::{generate_task_id, UuidTaskIdGenerator};
