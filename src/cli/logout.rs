//! `slowandarain logout` command implementation.

use crate::cli::open_app;
use crate::error::Result;

/// Run the logout command.
///
/// # Errors
///
/// Returns an error if the backend cannot be opened.
pub fn run() -> Result<()> {
    let app = open_app()?;
    if !app.gate().is_admin() {
        println!("Not signed in.");
        return Ok(());
    }
    app.gate().logout();
    println!("Signed out.");
    Ok(())
}
