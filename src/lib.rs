pub mod buffer;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod landmarks;
pub mod logging;
pub mod matcher;
pub mod motion;
pub mod orientation;
pub mod session;

#[cfg(test)]
mod fixtures;
