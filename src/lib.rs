pub mod cli;
pub mod collector;
pub mod config;
pub mod executor;
pub mod journal;
