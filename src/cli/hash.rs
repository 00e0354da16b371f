//! `slowandarain hash-password` command implementation.

use crate::auth::hash_password;
use crate::error::Result;
use dialoguer::Password;

/// Prompt for a password and print the digest for `admin.password_sha256`.
///
/// # Errors
///
/// Returns an error if the prompt fails.
pub fn run() -> Result<()> {
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;
    println!("{}", hash_password(&password));
    Ok(())
}
