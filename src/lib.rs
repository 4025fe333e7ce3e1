pub mod agg;
pub mod cli;
pub mod config;
pub mod generate;
pub mod output;
pub mod query;
pub mod source;
