pub mod analysis;
pub mod config;
pub mod error;
pub mod play;
pub mod rules;
pub mod services;
pub mod store;
