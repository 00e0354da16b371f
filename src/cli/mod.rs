//! CLI command implementations.

pub mod content;
pub mod destinations;
pub mod feedback;
pub mod hash;
pub mod login;
pub mod logout;
pub mod page;
pub mod status;
pub mod stories;

use crate::app::App;
use crate::config::load_config;
use crate::core::{ContentBoard, Entity};
use crate::error::Result;

/// Load the configuration and open the configured backend.
///
/// # Errors
///
/// Returns an error if the config cannot be parsed or the backend opened.
pub fn open_app() -> Result<App> {
    App::open(load_config()?)
}

/// Print success notices. Failures reach the user through the returned error.
pub fn print_notices<E: Entity>(board: &mut ContentBoard<E>) {
    for notice in board.drain_notices() {
        if !notice.is_failure() {
            println!("{}: {}", notice.title, notice.description);
        }
    }
}
