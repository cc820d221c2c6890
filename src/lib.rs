pub mod classify;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod extract;
pub mod filter;
pub mod render;
pub mod services;
pub mod sources;
