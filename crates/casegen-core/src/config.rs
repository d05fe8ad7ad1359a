//! Run settings for bound tests
//!
//! # Hierarchy
//!
//! Settings are resolved in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. A TOML settings file ([`RunSettings::load`])
//! 3. Environment variables: `CASEGEN_*` ([`RunSettings::with_env_overrides`])
//! 4. Explicit builder calls in test code
//!
//! # Example Settings
//!
//! ```toml
//! max_examples = 200
//! deadline_ms = 500
//! suppress_flaky_retries = false
//! max_shrink_iters = 512
//! seed = 1234
//! ```

use std::{path::Path, str::FromStr, time::Duration};

use proptest::test_runner::{Config as ProptestConfig, RngAlgorithm, TestRng, TestRunner};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of random cases drawn when nothing else is configured.
pub const DEFAULT_MAX_EXAMPLES: u32 = 100;

/// Execution configuration applied by [`crate::bind`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSettings {
    /// Number of random cases to draw; example cases are not counted
    pub max_examples: u32,
    /// Per-execution time budget in milliseconds
    pub deadline_ms: Option<u64>,
    /// Report the first failure without re-executing the failing case
    pub suppress_flaky_retries: bool,
    /// Cap on shrinking steps after a failure
    pub max_shrink_iters: Option<u32>,
    /// Fixed seed for the random stream
    pub seed: Option<u64>,
    /// Use a fixed, seedless random stream
    pub derandomize: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_examples: DEFAULT_MAX_EXAMPLES,
            deadline_ms: None,
            suppress_flaky_retries: false,
            max_shrink_iters: None,
            seed: None,
            derandomize: false,
        }
    }
}

impl RunSettings {
    /// Parse settings from TOML.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let settings: Self = toml::from_str(input)
            .map_err(|e| Error::InvalidConfig(format!("Failed to parse settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!("Loaded run settings from {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }

    /// Apply `CASEGEN_*` environment variable overrides.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = lookup("CASEGEN_MAX_EXAMPLES") {
            self.max_examples = parse_var("CASEGEN_MAX_EXAMPLES", &value)?;
        }
        if let Some(value) = lookup("CASEGEN_DEADLINE_MS") {
            self.deadline_ms = Some(parse_var("CASEGEN_DEADLINE_MS", &value)?);
        }
        if let Some(value) = lookup("CASEGEN_SUPPRESS_FLAKY_RETRIES") {
            self.suppress_flaky_retries = parse_var("CASEGEN_SUPPRESS_FLAKY_RETRIES", &value)?;
        }
        if let Some(value) = lookup("CASEGEN_SEED") {
            self.seed = Some(parse_var("CASEGEN_SEED", &value)?);
        }
        if let Some(value) = lookup("CASEGEN_DERANDOMIZE") {
            self.derandomize = parse_var("CASEGEN_DERANDOMIZE", &value)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check settings invariants.
    pub fn validate(&self) -> Result<()> {
        if self.max_examples == 0 {
            return Err(Error::InvalidConfig(
                "max_examples must be at least 1".to_string(),
            ));
        }
        if self.deadline_ms == Some(0) {
            return Err(Error::InvalidConfig(
                "deadline_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub const fn max_examples(mut self, max_examples: u32) -> Self {
        self.max_examples = max_examples;
        self
    }

    #[must_use]
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline_ms = Some(u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX));
        self
    }

    #[must_use]
    pub const fn suppress_flaky_retries(mut self, suppress: bool) -> Self {
        self.suppress_flaky_retries = suppress;
        self
    }

    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub const fn derandomize(mut self, derandomize: bool) -> Self {
        self.derandomize = derandomize;
        self
    }

    /// Per-execution time budget.
    #[must_use]
    pub fn deadline_duration(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    /// The `proptest` runner configuration these settings describe.
    #[must_use]
    pub fn proptest_config(&self) -> ProptestConfig {
        let defaults = ProptestConfig::default();
        ProptestConfig {
            cases: self.max_examples,
            max_shrink_iters: self.max_shrink_iters.unwrap_or(defaults.max_shrink_iters),
            failure_persistence: None,
            ..defaults
        }
    }

    /// A runner seeded according to `seed` / `derandomize`.
    #[must_use]
    pub fn runner(&self) -> TestRunner {
        let config = self.proptest_config();
        match (self.seed, self.derandomize) {
            (Some(seed), _) => {
                let rng = TestRng::from_seed(RngAlgorithm::ChaCha, &seed_bytes(seed));
                TestRunner::new_with_rng(config, rng)
            }
            (None, true) => {
                let rng = TestRng::deterministic_rng(RngAlgorithm::ChaCha);
                TestRunner::new_with_rng(config, rng)
            }
            (None, false) => TestRunner::new(config),
        }
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("Invalid value for {key}: {value}")))
}

/// Expand a `u64` seed into the 32 bytes ChaCha expects.
fn seed_bytes(seed: u64) -> [u8; 32] {
    let mut bytes = [0_u8; 32];
    for chunk in bytes.chunks_exact_mut(8) {
        chunk.copy_from_slice(&seed.to_le_bytes());
    }
    bytes
}
