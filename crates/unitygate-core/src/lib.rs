pub mod assets;
pub mod config;
pub mod error;
pub mod homebrew;
pub mod mirror;
pub mod resolver;
pub mod sanitize;
pub mod storage;
pub mod strip;
pub mod xml;
