pub mod cli;
pub mod config;
pub mod output;
pub mod state;
