//! Feedback form and its relay.
//!
//! Submissions are posted as multipart form data (`name`, `email`,
//! `message`). Any 2xx status counts as delivered; the body is ignored.

use crate::config::FeedbackConfig;
use crate::error::{Error, Result};
use reqwest::StatusCode;
use reqwest::blocking::{Client, multipart};
use std::time::Duration;

/// The feedback form's fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackForm {
    /// Sender name.
    pub name: String,

    /// Sender email.
    pub email: String,

    /// Message body.
    pub message: String,
}

impl FeedbackForm {
    /// Reset every field.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Delivers feedback somewhere.
pub trait FeedbackSender: Send + Sync {
    /// Deliver `form`.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay cannot be reached or rejects the form.
    fn send(&self, form: &FeedbackForm) -> Result<()>;
}

/// Send `form` and clear it once delivered. A failed send keeps the fields.
///
/// # Errors
///
/// Returns the sender's error.
pub fn submit(sender: &dyn FeedbackSender, form: &mut FeedbackForm) -> Result<()> {
    sender.send(form)?;
    tracing::info!("feedback delivered");
    form.clear();
    Ok(())
}

/// Posts feedback to the configured relay endpoint.
#[derive(Debug)]
pub struct HttpFeedbackSender {
    client: Client,
    endpoint: String,
}

impl HttpFeedbackSender {
    /// Create a sender for `config.endpoint`.
    ///
    /// # Errors
    ///
    /// Returns a config error if no endpoint is set, or an error if the HTTP
    /// client cannot be built.
    pub fn new(config: &FeedbackConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(Error::Config("feedback.endpoint is not set".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

impl FeedbackSender for HttpFeedbackSender {
    fn send(&self, form: &FeedbackForm) -> Result<()> {
        tracing::debug!(endpoint = %self.endpoint, "posting feedback");
        let body = multipart::Form::new()
            .text("name", form.name.clone())
            .text("email", form.email.clone())
            .text("message", form.message.clone());
        let response = self
            .client
            .post(&self.endpoint)
            .header("accept", "application/json")
            .multipart(body)
            .send()?;
        check_status(response.status())
    }
}

fn check_status(status: StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::Feedback(format!("relay answered {status}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingSender {
        fail: bool,
        sent: Mutex<Vec<FeedbackForm>>,
    }

    impl FeedbackSender for RecordingSender {
        fn send(&self, form: &FeedbackForm) -> Result<()> {
            if self.fail {
                return Err(Error::Feedback("relay answered 500".to_string()));
            }
            self.sent.lock().unwrap().push(form.clone());
            Ok(())
        }
    }

    fn form() -> FeedbackForm {
        FeedbackForm {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            message: "Loved the Lisbon story".to_string(),
        }
    }

    #[test]
    fn submit_clears_form_on_success() {
        let sender = RecordingSender {
            fail: false,
            sent: Mutex::new(Vec::new()),
        };
        let mut form = form();
        submit(&sender, &mut form).unwrap();
        assert_eq!(form, FeedbackForm::default());
        assert_eq!(sender.sent.lock().unwrap()[0].name, "Ana");
    }

    #[test]
    fn submit_keeps_form_on_failure() {
        let sender = RecordingSender {
            fail: true,
            sent: Mutex::new(Vec::new()),
        };
        let mut form = form();
        assert!(submit(&sender, &mut form).is_err());
        assert_eq!(form, self::form());
    }

    #[test]
    fn only_2xx_is_success() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(check_status(StatusCode::ACCEPTED).is_ok());
        assert!(matches!(
            check_status(StatusCode::UNPROCESSABLE_ENTITY),
            Err(Error::Feedback(_))
        ));
        assert!(check_status(StatusCode::FOUND).is_err());
    }

    #[test]
    fn sender_requires_endpoint() {
        assert!(matches!(
            HttpFeedbackSender::new(&FeedbackConfig::default()),
            Err(Error::Config(_))
        ));
        let config = FeedbackConfig {
            endpoint: "https://forms.example.com/f/abc".to_string(),
            ..FeedbackConfig::default()
        };
        assert!(HttpFeedbackSender::new(&config).is_ok());
    }
}
