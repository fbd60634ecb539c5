// SPDX-License-Identifier: Apache-2.0

//! Credential provider abstraction.
//!
//! The pipeline never reads the process environment directly. Each host
//! (CLI, GitHub Actions runner, tests) implements `CredentialProvider` to hand
//! over the account email and password.

use secrecy::{ExposeSecret, SecretString};

use crate::error::ClarityError;

/// Provides the CodeClarity account credentials.
///
/// Implementations should return `None` if a value is not available.
pub trait CredentialProvider: Send + Sync {
    /// Retrieves the account email.
    fn email(&self) -> Option<String>;

    /// Retrieves the account password.
    fn password(&self) -> Option<SecretString>;
}

/// Resolved account credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: SecretString,
}

impl Credentials {
    /// Resolves credentials from a provider.
    ///
    /// # Errors
    ///
    /// Returns `ClarityError::MissingCredentials` if either value is missing or empty.
    pub fn resolve(provider: &dyn CredentialProvider) -> crate::Result<Self> {
        let email = provider
            .email()
            .filter(|e| !e.is_empty())
            .ok_or(ClarityError::MissingCredentials)?;
        let password = provider
            .password()
            .filter(|p| !p.expose_secret().is_empty())
            .ok_or(ClarityError::MissingCredentials)?;
        Ok(Self { email, password })
    }
}

/// Shortens a secret for log output, keeping only its first characters.
#[must_use]
pub fn redact(secret: &SecretString) -> String {
    let head: String = secret.expose_secret().chars().take(4).collect();
    format!("{head}***")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mock implementation for testing.
    struct MockCredentialProvider {
        email: Option<String>,
        password: Option<SecretString>,
    }

    impl CredentialProvider for MockCredentialProvider {
        fn email(&self) -> Option<String> {
            self.email.clone()
        }

        fn password(&self) -> Option<SecretString> {
            self.password.clone()
        }
    }

    #[test]
    fn test_resolve_with_both_values() {
        let provider = MockCredentialProvider {
            email: Some("john.doe@codeclarity.io".to_string()),
            password: Some(SecretString::from("s3cret")),
        };

        let creds = Credentials::resolve(&provider).unwrap();
        assert_eq!(creds.email, "john.doe@codeclarity.io");
        assert_eq!(creds.password.expose_secret(), "s3cret");
    }

    #[test]
    fn test_resolve_missing_password() {
        let provider = MockCredentialProvider {
            email: Some("john.doe@codeclarity.io".to_string()),
            password: None,
        };

        let err = Credentials::resolve(&provider).unwrap_err();
        assert!(matches!(err, ClarityError::MissingCredentials));
    }

    #[test]
    fn test_resolve_empty_email() {
        let provider = MockCredentialProvider {
            email: Some(String::new()),
            password: Some(SecretString::from("s3cret")),
        };

        assert!(Credentials::resolve(&provider).is_err());
    }

    #[test]
    fn test_redact_hides_tail() {
        let token = SecretString::from("abcdefghijkl");
        assert_eq!(redact(&token), "abcd***");
    }
}
