//! `slowandarain page` command implementation.

use crate::cli::open_app;
use crate::core::{Destination, Story};
use crate::error::Result;
use crate::site::Page;
use std::time::Instant;

/// Render the landing page as text.
///
/// A list that fails to load is shown empty with a warning, as the page
/// itself does.
///
/// # Errors
///
/// Returns an error if the backend cannot be opened.
pub fn run(slide: Option<usize>) -> Result<()> {
    let app = open_app()?;

    let mut destinations = app.board::<Destination>();
    let mut stories = app.board::<Story>();
    for result in [
        destinations.load(app.content(), app.objects()),
        stories.load(app.content(), app.objects()),
    ] {
        if let Err(e) = result {
            eprintln!("slowandarain: warning: {e}");
        }
    }

    let mut carousel = app.carousel();
    carousel.sync_len(destinations.items().len(), Instant::now());
    if let Some(slide) = slide {
        carousel.go_to(slide);
    }

    let page = Page {
        destinations: destinations.items(),
        carousel: &carousel,
        stories: stories.items(),
        is_admin: app.gate().is_admin(),
    };
    print!("{}", page.render());
    carousel.teardown();
    Ok(())
}
