pub mod authz;
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod import;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;
