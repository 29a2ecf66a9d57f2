//! Checkout command.
//!
//! # Usage
//!
//! ```bash
//! bf checkout --full-name "Asha Rao" --email asha@example.com --phone 5550100 \
//!     --address "1 Main St" --city Pune --postal-code 411001 --payment-method upi
//! ```

use std::io::Write;

use blockflow_storefront::services::checkout::{CheckoutForm, CheckoutOutcome};
use blockflow_storefront::session::Session;

use crate::{CliError, render};

/// Submit the cart as orders.
///
/// Anything but a completed checkout ends in [`CliError::Rejected`] so the
/// process exits non-zero.
pub async fn submit(
    session: &mut Session,
    form: &CheckoutForm,
    out: &mut impl Write,
) -> Result<(), CliError> {
    session.proceed_to_checkout()?;
    let outcome = session.submit_checkout(form).await?;

    match &outcome {
        CheckoutOutcome::Completed(receipt) => {
            render::receipt(out, receipt)?;
            writeln!(out, "{}", outcome.message())?;
            Ok(())
        }
        CheckoutOutcome::Invalid(e) => {
            writeln!(out, "Missing: {}", e.missing.join(", "))?;
            Err(CliError::Rejected(outcome.message()))
        }
        CheckoutOutcome::LoginRequired => {
            writeln!(out, "Run `bf login` first.")?;
            Err(CliError::Rejected(outcome.message()))
        }
        CheckoutOutcome::Failed(failure) => {
            if failure.created > 0 {
                writeln!(
                    out,
                    "{} of {} orders were created; {} rolled back.",
                    failure.created,
                    failure.created + failure.failed,
                    failure.rolled_back
                )?;
            }
            Err(CliError::Rejected(outcome.message()))
        }
    }
}
