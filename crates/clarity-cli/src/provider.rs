// SPDX-License-Identifier: Apache-2.0

//! CLI-specific `CredentialProvider` implementation.
//!
//! Resolves the CodeClarity account from the `EMAIL` and `PASSWORD`
//! environment variables, the way the action receives its secrets.

use clarity_core::CredentialProvider;
use secrecy::SecretString;
use tracing::debug;

/// Environment variable holding the account email.
pub const EMAIL_ENV: &str = "EMAIL";

/// Environment variable holding the account password.
pub const PASSWORD_ENV: &str = "PASSWORD";

/// CLI implementation of `CredentialProvider`.
pub struct EnvCredentialProvider;

impl CredentialProvider for EnvCredentialProvider {
    fn email(&self) -> Option<String> {
        match std::env::var(EMAIL_ENV) {
            Ok(email) if !email.is_empty() => {
                debug!("Resolved account email from environment variable");
                Some(email)
            }
            _ => {
                debug!("No account email found in environment");
                None
            }
        }
    }

    fn password(&self) -> Option<SecretString> {
        match std::env::var(PASSWORD_ENV) {
            Ok(password) if !password.is_empty() => {
                debug!("Resolved account password from environment variable");
                Some(SecretString::from(password))
            }
            _ => {
                debug!("No account password found in environment");
                None
            }
        }
    }
}
