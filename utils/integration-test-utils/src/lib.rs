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


//! Shared helpers for `topic-router` integration tests.

use futures::StreamExt;
use std::time::Duration;
use topic_router::{Message, Subscription};
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly `tracing` subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `info`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Collects `count` messages from `subscription`, acking each one.
///
/// Panics if they do not all arrive within `timeout`.
pub async fn collect_messages(
    subscription: &mut Subscription,
    count: usize,
    timeout: Duration,
) -> Vec<Message> {
    let collect = async move {
        let mut messages = Vec::with_capacity(count);
        while messages.len() < count {
            let Some(delivery) = subscription.next().await else {
                break;
            };
            messages.push(delivery.message().clone());
            delivery.ack();
        }
        messages
    };

    let messages = tokio::time::timeout(timeout, collect)
        .await
        .unwrap_or_else(|_| panic!("expected {count} messages within {timeout:?}"));
    assert_eq!(
        messages.len(),
        count,
        "subscription ended after {} of {count} messages",
        messages.len()
    );
    messages
}

/// Asserts that nothing arrives on `subscription` during `window`.
pub async fn assert_no_message(subscription: &mut Subscription, window: Duration) {
    if let Ok(Some(delivery)) = tokio::time::timeout(window, subscription.next()).await {
        panic!(
            "unexpected message {} with payload {:?}",
            delivery.message().uuid(),
            delivery.message().payload()
        );
    }
}
