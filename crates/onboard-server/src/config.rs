use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Server settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    /// Argon2 memory (KiB) and iteration cost; library defaults when unset.
    pub argon2_cost: Option<(u32, u32)>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path: PathBuf = var("ONBOARD_DB_PATH")
            .unwrap_or_else(|| "onboard.db".into())
            .into();
        let host = var("ONBOARD_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("ONBOARD_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("ONBOARD_PORT must be a port number")?;

        let memory = optional_u32(&var, "ONBOARD_ARGON2_MEMORY_KIB")?;
        let iterations = optional_u32(&var, "ONBOARD_ARGON2_ITERATIONS")?;
        let argon2_cost = match (memory, iterations) {
            (None, None) => None,
            (Some(m), Some(t)) => Some((m, t)),
            _ => anyhow::bail!(
                "ONBOARD_ARGON2_MEMORY_KIB and ONBOARD_ARGON2_ITERATIONS must be set together"
            ),
        };

        Ok(Self {
            db_path,
            host,
            port,
            argon2_cost,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn optional_u32(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u32>> {
    match var(key) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .with_context(|| format!("{} must be a positive integer", key)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.db_path, PathBuf::from("onboard.db"));
        assert_eq!(config.addr().unwrap().to_string(), "0.0.0.0:3000");
        assert_eq!(config.argon2_cost, None);
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("ONBOARD_HOST", "127.0.0.1"),
            ("ONBOARD_PORT", "8080"),
            ("ONBOARD_ARGON2_MEMORY_KIB", "8"),
            ("ONBOARD_ARGON2_ITERATIONS", "1"),
        ])
        .unwrap();
        assert_eq!(config.addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(config.argon2_cost, Some((8, 1)));
    }

    #[test]
    fn argon2_cost_needs_both_values() {
        assert!(config(&[("ONBOARD_ARGON2_MEMORY_KIB", "8")]).is_err());
        assert!(config(&[("ONBOARD_PORT", "not-a-port")]).is_err());
    }
}
