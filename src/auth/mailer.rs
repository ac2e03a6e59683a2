//! Delivery of one-time log-in codes.

use std::fmt::Debug;

use crate::Error;

/// Something that can get a one-time code to the owner of an email address.
pub trait Mailer: Send + Sync + Debug {
    /// Deliver `code` to `email`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::EmailDeliveryError] if the code could not be sent.
    fn send_one_time_code(&self, email: &str, code: &str) -> Result<(), Error>;
}

/// Writes one-time codes to the application log instead of sending an email.
///
/// Intended for local development and single-user deployments where the
/// operator can read the server log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send_one_time_code(&self, email: &str, code: &str) -> Result<(), Error> {
        tracing::info!("One-time log-in code for {email}: {code}");
        Ok(())
    }
}

#[cfg(test)]
pub use recording::RecordingMailer;


#[cfg(test)]
mod tests {
    use super::{LogMailer, Mailer, RecordingMailer};

    #[test]
    fn log_mailer_always_succeeds() {
        assert_eq!(
            LogMailer.send_one_time_code("budi@example.com", "123456"),
            Ok(())
        );
    }

    #[test]
    fn recording_mailer_returns_latest_code() {
        let mailer = RecordingMailer::default();
        mailer
            .send_one_time_code("budi@example.com", "111111")
            .unwrap();
        mailer
            .send_one_time_code("sari@example.com", "222222")
            .unwrap();
        mailer
            .send_one_time_code("budi@example.com", "333333")
            .unwrap();

        assert_eq!(
            mailer.last_code_for("budi@example.com"),
            Some("333333".to_owned())
        );
        assert_eq!(mailer.sent_count(), 3);
    }
}
