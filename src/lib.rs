#![allow(clippy::uninlined_format_args)]

pub mod app;
pub mod config;
pub mod content;
pub mod controller;
pub mod data;
pub mod echo;
pub mod history;
pub mod keys;
pub mod markdown;
pub mod mode;
pub mod scroll_sync;
pub mod selection;
pub mod services;
pub mod storage;
pub mod timer;
pub mod ui;
pub mod window;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::{run, RunOptions};
