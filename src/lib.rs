//! slowandarain - content core for the Slowandarain travel blog.
//!
//! Admin editing of carousel destinations and travel stories against a
//! content store, with image upload, an auto-advancing carousel and a
//! session gate that decides who may mutate anything.

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod feedback;
pub mod site;
pub mod storage;

pub use app::App;
pub use config::Config;
pub use error::{Error, Result};
