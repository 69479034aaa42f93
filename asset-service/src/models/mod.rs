pub mod asset;
pub mod connection;
pub mod membership;
pub mod role;

pub use asset::{Asset, AssetSource, Visibility};
pub use connection::ExternalConnection;
pub use membership::TenantMembership;
pub use role::Role;
