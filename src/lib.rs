pub mod auth;
pub mod charts;
pub mod config;
pub mod history;
pub mod output;
pub mod readings;
pub mod store;
