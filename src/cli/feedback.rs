//! `slowandarain feedback` command implementation.

use crate::config::load_config;
use crate::error::Result;
use crate::feedback::{FeedbackForm, HttpFeedbackSender, submit};

/// Send a feedback message to the configured relay.
///
/// # Errors
///
/// Returns an error if no relay is configured or the relay rejects the form.
pub fn run(name: &str, email: &str, message: &str) -> Result<()> {
    let config = load_config()?;
    let sender = HttpFeedbackSender::new(&config.feedback)?;
    let mut form = FeedbackForm {
        name: name.to_string(),
        email: email.to_string(),
        message: message.to_string(),
    };
    submit(&sender, &mut form)?;
    println!("Thanks for your feedback!");
    Ok(())
}
