//! `slowandarain status` command implementation.

use crate::cli::open_app;
use crate::config::BackendKind;
use crate::error::Result;
use chrono::{DateTime, Local};

/// Show backend and session state.
///
/// # Errors
///
/// Returns an error if the backend cannot be opened.
pub fn run() -> Result<()> {
    let app = open_app()?;
    let config = app.config();

    let backend = match config.backend.kind {
        BackendKind::File => format!("file ({})", config.storage.path.display()),
        BackendKind::Remote => format!("remote ({})", config.remote.base_url()),
    };
    println!("Backend:   {backend}");

    match app.gate().session() {
        Some(session) => {
            println!("Session:   admin ({})", session.email);
            if let Some(expires) = session.expires_at {
                let local: DateTime<Local> = expires.into();
                println!("Expires:   {}", local.format("%Y-%m-%d %H:%M"));
            }
        }
        None => println!("Session:   guest"),
    }

    println!("Carousel:  every {} ms", config.carousel.interval_ms);
    let feedback = if config.feedback.endpoint.is_empty() {
        "disabled"
    } else {
        config.feedback.endpoint.as_str()
    };
    println!("Feedback:  {feedback}");
    Ok(())
}
