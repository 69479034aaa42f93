pub mod health;
pub mod import;
pub mod metrics;

pub use health::health_check;
pub use import::import_assets;
pub use metrics::metrics_endpoint;
