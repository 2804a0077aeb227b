pub mod config;
pub mod logging;

pub mod archive_url;
pub mod catalog;
pub mod checksum;
pub mod dispatcher;
pub mod download;
pub mod extract;
pub mod fetcher;
pub mod replace;
pub mod report;
