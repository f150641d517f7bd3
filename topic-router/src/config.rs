/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Router tuning knobs.
///
/// Loadable from JSON5, e.g. `{ close_timeout_ms: 5000 }`. Missing fields take
/// their defaults; unknown fields are rejected.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Upper bound on how long `run` waits for handler loops to stop.
    #[serde(
        rename = "close_timeout_ms",
        with = "duration_millis",
        default = "default_close_timeout"
    )]
    pub close_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        }
    }
}

impl RouterConfig {
    pub fn from_json5_str(contents: &str) -> Result<Self, ConfigError> {
        let config: RouterConfig = json5::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json5_str(&contents)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.close_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "close_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_close_timeout() -> Duration {
    DEFAULT_CLOSE_TIMEOUT
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::RouterConfig;
    use crate::error::ConfigError;
    use std::time::Duration;

    #[test]
    fn empty_object_uses_defaults() {
        let config = RouterConfig::from_json5_str("{}").expect("empty config parses");

        assert_eq!(config, RouterConfig::default());
        assert_eq!(config.close_timeout, Duration::from_secs(30));
    }

    #[test]
    fn close_timeout_is_read_in_milliseconds() {
        let config = RouterConfig::from_json5_str("{ close_timeout_ms: 1500, // comment\n }")
            .expect("json5 config parses");

        assert_eq!(config.close_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = RouterConfig::from_json5_str("{ close_timeout: 10 }");

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn zero_close_timeout_is_invalid() {
        let result = RouterConfig::from_json5_str("{ close_timeout_ms: 0 }");

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_reports_path() {
        let result = RouterConfig::from_file("/definitely/not/here.json5");

        match result {
            Err(ConfigError::Io { path, .. }) => {
                assert!(path.ends_with("here.json5"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
