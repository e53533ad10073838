//! API credential handling.
//!
//! Keys are wrapped in [`secrecy::SecretString`] the moment they are read.
//! `Debug` and `Display` never print the value; `.expose()` is the only way
//! to get at it.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use super::BackendError;

/// Where a credential was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Read from an environment variable
    Environment,
    /// Passed in by the caller
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// A securely-stored API key.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Load from an environment variable. Unset or blank is `NotConfigured`.
    pub fn from_env(env_var: &str, name: &'static str) -> Result<Self, BackendError> {
        match std::env::var(env_var) {
            Ok(v) if !v.trim().is_empty() => {
                Ok(Self::new(v.trim(), CredentialSource::Environment, name))
            }
            _ => Err(BackendError::NotConfigured(format!(
                "{} not set: configure '{}' environment variable",
                name, env_var
            ))),
        }
    }

    /// The raw key. Call only where the header is set.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} [REDACTED]", self.name, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_redact() {
        let cred = ApiCredential::new("gsk-super-secret", CredentialSource::Programmatic, "Groq API key");

        let debug = format!("{:?}", cred);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("gsk-super-secret"));

        let display = cred.to_string();
        assert_eq!(display, "Groq API key from programmatic [REDACTED]");
        assert_eq!(cred.expose(), "gsk-super-secret");
    }

    #[test]
    fn test_missing_env_is_not_configured() {
        let result = ApiCredential::from_env("FINBOT_TEST_KEY_THAT_IS_NEVER_SET", "Test key");
        match result {
            Err(BackendError::NotConfigured(msg)) => {
                assert!(msg.contains("FINBOT_TEST_KEY_THAT_IS_NEVER_SET"))
            }
            other => panic!("expected NotConfigured, got {:?}", other),
        }
    }
}
