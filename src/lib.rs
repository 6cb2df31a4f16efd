pub mod app_error;
pub mod config;
pub mod constants;
pub mod db;
pub mod delivery;
pub mod model;
pub mod password;
pub mod token;
