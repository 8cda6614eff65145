//! Common test utilities for AgentOS CLI integration tests
#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

/// Endpoint nothing listens on
pub const DEAD_ENDPOINT: &str = "http://127.0.0.1:1";

/// Isolated home directory for one test
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = tempdir()?;
        let config_dir = temp_dir.path().join(".agentos");

        Ok(Self {
            temp_dir,
            config_dir,
        })
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    /// Command with HOME pointed at the test directory and no env token
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_agentos"));
        cmd.env("HOME", self.temp_dir.path());
        cmd.env_remove("OS_SECURITY_KEY");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Write a config pointing at `url`
    pub fn create_config(&self, url: &str, token: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        let config = serde_json::json!({
            "endpoint": { "url": url, "auth_token": token }
        });
        std::fs::write(self.config_file(), serde_json::to_string_pretty(&config)?)?;
        Ok(())
    }

    /// Write a file into the test directory and return its path
    pub fn write_file(&self, name: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }

    pub fn read_config(&self) -> anyhow::Result<serde_json::Value> {
        let content = std::fs::read_to_string(self.config_file())?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new().expect("Failed to create test environment")
    }
}
