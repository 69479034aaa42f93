pub mod audit;
pub mod drive;
pub mod metrics;
pub mod storage;
pub mod store;
pub mod token;
