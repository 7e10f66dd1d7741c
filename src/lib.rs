pub mod analyzers;
pub mod config;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod output;
pub mod parser;
pub mod period;
pub mod report;
