pub mod catalog;
pub mod common;
pub mod downloader;
pub mod pipeline;
pub mod report;
