//! `slowandarain login` command implementation.

use crate::cli::open_app;
use crate::core::LOGIN_FAILED_MESSAGE;
use crate::error::{Error, Result};
use dialoguer::{Input, Password};

/// Run the login command. Missing credentials are prompted for.
///
/// # Errors
///
/// Returns an auth error with a generic message if sign-in fails.
pub fn run(email: Option<String>, password: Option<String>) -> Result<()> {
    let app = open_app()?;

    let email = match email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("Email").interact_text()?,
    };
    let password = match password {
        Some(password) => password,
        None => Password::new().with_prompt("Password").interact()?,
    };

    if !app.gate().login(&email, &password) {
        return Err(Error::Auth(LOGIN_FAILED_MESSAGE.to_string()));
    }

    println!("Signed in as {email}");
    Ok(())
}
