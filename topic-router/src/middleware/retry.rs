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


//! Re-invocation with exponential backoff.

use crate::middleware::{handler_fn, middleware_fn, HandlerFunc, Middleware};
use crate::observability::events;
use std::time::Duration;
use tracing::{error, warn};

const COMPONENT: &str = "retry";

/// Retries a failing processing function before giving up on the message.
///
/// The first retry waits `initial_interval`; each following wait is multiplied by
/// `multiplier` and capped at `max_interval`. When all attempts fail, the last
/// error is returned and the message is nacked.
#[derive(Clone, Debug, PartialEq)]
pub struct Retry {
    pub max_retries: u32,
    pub initial_interval: Duration,
    pub multiplier: f64,
    pub max_interval: Duration,
}

impl Default for Retry {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_interval: Duration::from_millis(100),
            multiplier: 2.0,
            max_interval: Duration::from_secs(10),
        }
    }
}

impl Retry {
    pub fn middleware(self) -> Middleware {
        middleware_fn(move |next: HandlerFunc| {
            let policy = self.clone();
            handler_fn(move |message| {
                let next = next.clone();
                let policy = policy.clone();
                async move {
                    let mut interval = policy.initial_interval;
                    let mut attempt = 0;
                    loop {
                        let err = match next(message.clone()).await {
                            Ok(outputs) => return Ok(outputs),
                            Err(err) => err,
                        };

                        if attempt >= policy.max_retries {
                            error!(
                                event = events::HANDLER_RETRIES_EXHAUSTED,
                                component = COMPONENT,
                                msg_id = %message.uuid(),
                                attempts = attempt + 1,
                                err = %err,
                                "giving up after retries"
                            );
                            return Err(err);
                        }

                        attempt += 1;
                        warn!(
                            event = events::HANDLER_RETRY_SCHEDULED,
                            component = COMPONENT,
                            msg_id = %message.uuid(),
                            attempt,
                            delay_ms = interval.as_millis() as u64,
                            err = %err,
                            "retrying failed handler"
                        );
                        tokio::time::sleep(interval).await;
                        interval = policy.next_interval(interval);
                    }
                }
            })
        })
    }

    /// Products too large for a [`Duration`] saturate at `max_interval`.
    fn next_interval(&self, current: Duration) -> Duration {
        let scaled = current.as_secs_f64() * self.multiplier.max(1.0);
        Duration::try_from_secs_f64(scaled)
            .unwrap_or(self.max_interval)
            .min(self.max_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::Retry;
    use crate::error::HandlerError;
    use crate::middleware::handler_fn;
    use crate::Message;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn flaky(failures: u32, calls: Arc<AtomicU32>) -> crate::middleware::HandlerFunc {
        handler_fn(move |message: Message| {
            let calls = calls.clone();
            async move {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                if call < failures {
                    Err(HandlerError::msg(format!("failure {call}")))
                } else {
                    Ok(vec![message])
                }
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_once_handler_recovers() {
        let calls = Arc::new(AtomicU32::new(0));
        let wrapped = Retry::default().middleware()(flaky(2, calls.clone()));

        let outputs = wrapped(Message::new("payload"))
            .await
            .expect("third attempt succeeds");

        assert_eq!(outputs.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_last_error_when_retries_exhausted() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = Retry {
            max_retries: 2,
            ..Retry::default()
        };
        let wrapped = policy.middleware()(flaky(u32::MAX, calls.clone()));

        let error = wrapped(Message::new("payload"))
            .await
            .expect_err("all attempts fail");

        assert_eq!(error.to_string(), "failure 2");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn backoff_grows_and_is_capped() {
        let policy = Retry {
            initial_interval: Duration::from_millis(100),
            multiplier: 3.0,
            max_interval: Duration::from_millis(500),
            ..Retry::default()
        };

        assert_eq!(
            policy.next_interval(Duration::from_millis(100)),
            Duration::from_millis(300)
        );
        assert_eq!(
            policy.next_interval(Duration::from_millis(300)),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn oversized_multiplier_saturates_at_max_interval() {
        let cap = Duration::from_secs(10);
        for multiplier in [1e30, f64::MAX, f64::INFINITY] {
            let policy = Retry {
                multiplier,
                max_interval: cap,
                ..Retry::default()
            };

            assert_eq!(policy.next_interval(Duration::from_secs(1)), cap);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_multiplier_still_returns_handler_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = Retry {
            max_retries: 3,
            initial_interval: Duration::from_secs(1),
            multiplier: 1e30,
            max_interval: Duration::from_secs(10),
        };
        let wrapped = policy.middleware()(flaky(u32::MAX, calls.clone()));

        let error = wrapped(Message::new("payload"))
            .await
            .expect_err("all attempts fail");

        assert_eq!(error.to_string(), "failure 3");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
