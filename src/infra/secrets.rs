use crate::app::ports::{Secret, SecretProvider};
use std::collections::HashMap;

/// Reads secrets from process environment variables.
#[derive(Debug, Default)]
pub struct EnvSecretProvider;

impl SecretProvider for EnvSecretProvider {
    fn get(&self, name: &str) -> Result<Secret, String> {
        match std::env::var(name) {
            Ok(v) if !v.trim().is_empty() => Ok(Secret::new(v)),
            Ok(_) => Err(format!("environment variable {name} is empty")),
            Err(_) => Err(format!("environment variable {name} is not set")),
        }
    }
}

/// Fixed secrets, for tests and embedding.
#[derive(Debug, Default)]
pub struct StaticSecretProvider {
    values: HashMap<String, Secret>,
}

impl StaticSecretProvider {
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), Secret::new(value));
        self
    }
}

impl SecretProvider for StaticSecretProvider {
    fn get(&self, name: &str) -> Result<Secret, String> {
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| format!("secret {name} is not configured"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_env_var_is_an_error() {
        let err = EnvSecretProvider.get("STADIUM_ETL_TEST_SURELY_UNSET").unwrap_err();
        assert!(err.contains("not set"));
    }

    #[test]
    fn debug_output_is_redacted() {
        let provider = StaticSecretProvider::default().with("conn", "AccountKey=supersecret");
        let secret = provider.get("conn").unwrap();
        assert_eq!(secret.expose(), "AccountKey=supersecret");
        assert!(!format!("{:?} {}", secret, secret).contains("supersecret"));
    }
}
