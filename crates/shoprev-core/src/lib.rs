pub mod app_config;
pub mod config;
pub mod error;
pub mod rows;
pub mod views;

pub use app_config::{AppConfig, NullCustomerPolicy};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use rows::CanonicalRow;
pub use views::{DailyBucket, ProductBucket, SummaryView};
