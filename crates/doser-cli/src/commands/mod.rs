pub mod batch;
pub mod condition;
pub mod config;
pub mod extract;
pub mod info;
