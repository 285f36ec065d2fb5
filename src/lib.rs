pub mod config;
pub mod srs;
pub mod storage;
