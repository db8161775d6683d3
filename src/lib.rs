pub mod channels;
pub mod classifier;
pub mod config;
pub mod payload;
pub mod runtime;
pub mod shared;
pub mod webhook;
