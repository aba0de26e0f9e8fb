pub mod env_keys;
pub mod config;
pub mod error;
pub mod homework;
pub mod relay;
pub mod service;
pub mod utilities;
