pub mod app;
pub mod auth;
pub mod catalogue;
pub mod client;
pub mod config;
pub mod db;
pub mod guard;
pub mod order;
pub mod rpc;
pub mod state;
pub mod store;
pub mod telemetry;
