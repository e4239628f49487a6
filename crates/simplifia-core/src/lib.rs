//! Core of SimplifIA: configuration, the level → prompt table, and the
//! wire types shared by the provider adapters and the HTTP server.

pub mod config;
pub mod prompts;
pub mod types;
pub mod utils;

pub use prompts::PromptTable;
