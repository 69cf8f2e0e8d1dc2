pub mod cli;
pub mod downloader;
pub mod error;
pub mod fetcher;
pub mod parser;
pub mod reporter;
pub mod types;
