//! Pipeline stages and the download engine

pub mod collector;
pub mod downloader;
pub mod filter;
pub mod pipeline;
pub mod reader;
pub mod viewer;
