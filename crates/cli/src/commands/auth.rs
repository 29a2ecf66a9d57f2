//! Credential commands.
//!
//! # Usage
//!
//! ```bash
//! bf login -u asha -p hunter2
//! bf whoami
//! bf logout
//! ```

use std::io::Write;

use blockflow_storefront::session::Session;

use crate::CliError;

/// Exchange credentials for a token and store it.
pub async fn login(
    session: &Session,
    username: &str,
    password: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let username = session.login(username, password).await?;
    writeln!(out, "Logged in as {username}")?;
    Ok(())
}

/// Forget the stored token. The cart is kept.
pub fn logout(session: Session, out: &mut impl Write) -> Result<(), CliError> {
    session.logout()?;
    writeln!(out, "Logged out")?;
    Ok(())
}

/// Report who the stored token belongs to.
pub fn whoami(session: &Session, out: &mut impl Write) -> Result<(), CliError> {
    let credentials = session.credentials();
    match (credentials.token(), credentials.username()) {
        (Some(_), Some(username)) => writeln!(out, "{username}")?,
        (Some(_), None) => writeln!(out, "Logged in")?,
        (None, _) => writeln!(out, "Not logged in")?,
    }
    Ok(())
}
