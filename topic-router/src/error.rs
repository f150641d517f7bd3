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

//! Error taxonomy surfaced by the router and its collaborators.

use std::path::PathBuf;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Configuration, lifecycle and startup failures returned to router callers.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("handler `{0}` is already registered")]
    DuplicateHandlerName(String),
    #[error("handler `{handler}` has an empty topic")]
    InvalidTopic { handler: String },
    #[error("router has already started; handlers must be configured before run")]
    AlreadyStarted,
    #[error("router is already running")]
    AlreadyRunning,
    #[error("router is closed and cannot run again")]
    AlreadyClosed,
    #[error("handler `{handler}` failed to subscribe to topic `{topic}`")]
    Subscribe {
        handler: String,
        topic: String,
        #[source]
        source: PubSubError,
    },
    #[error("router plugin failed")]
    Plugin(#[source] BoxError),
}

/// Failures reported by publisher/subscriber implementations.
#[derive(Debug, Error)]
pub enum PubSubError {
    #[error("pub/sub is closed")]
    Closed,
    #[error("pub/sub backend failure")]
    Backend(#[source] BoxError),
}

/// Failure returned by a processing function for one message.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HandlerError(BoxError);

impl HandlerError {
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(Box::new(err))
    }

    pub fn msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self(message.into())
    }

    pub fn into_inner(self) -> BoxError {
        self.0
    }
}

impl From<BoxError> for HandlerError {
    fn from(err: BoxError) -> Self {
        Self(err)
    }
}

impl From<PubSubError> for HandlerError {
    fn from(err: PubSubError) -> Self {
        Self::new(err)
    }
}

/// Failures loading a [`RouterConfig`][crate::RouterConfig].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse config")]
    Parse(#[from] json5::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::{HandlerError, PubSubError, RouterError};
    use std::error::Error;

    #[test]
    fn subscribe_error_exposes_display_and_source() {
        let error = RouterError::Subscribe {
            handler: "echo".to_string(),
            topic: "in".to_string(),
            source: PubSubError::Closed,
        };

        assert_eq!(
            error.to_string(),
            "handler `echo` failed to subscribe to topic `in`"
        );
        assert!(error.source().is_some());
    }

    #[test]
    fn lifecycle_error_display_is_stable() {
        assert_eq!(
            RouterError::AlreadyClosed.to_string(),
            "router is closed and cannot run again"
        );
        assert!(RouterError::AlreadyClosed.source().is_none());
    }

    #[test]
    fn handler_error_displays_wrapped_message() {
        let from_message = HandlerError::msg("boom");
        let from_pubsub = HandlerError::from(PubSubError::Closed);

        assert_eq!(from_message.to_string(), "boom");
        assert_eq!(from_pubsub.to_string(), "pub/sub is closed");
    }
}
