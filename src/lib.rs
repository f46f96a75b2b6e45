pub mod config;
pub mod error;
pub mod fetch;
pub mod merge;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod states;
pub mod stats;
