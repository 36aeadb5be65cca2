pub mod errors;
pub mod db;
pub mod account;
pub mod service;
pub mod service_settings;
pub mod settings;
