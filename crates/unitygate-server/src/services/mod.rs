pub mod dataset;
pub mod mirror;
pub mod upstream;
