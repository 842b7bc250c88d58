pub mod config;
pub mod context;
pub mod error;
pub mod lifecycle;
pub mod provider;
pub mod proxy;
