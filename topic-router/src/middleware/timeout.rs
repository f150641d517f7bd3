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

//! Deadline middleware.

use crate::error::HandlerError;
use crate::middleware::{handler_fn, middleware_fn, HandlerFunc, Middleware};
use crate::observability::events;
use std::time::Duration;
use tracing::warn;

const COMPONENT: &str = "timeout";

/// Fails an invocation that does not finish within `limit`.
///
/// The wrapped future is dropped on expiry; any messages it would have produced
/// are lost and the input is nacked.
pub fn timeout(limit: Duration) -> Middleware {
    middleware_fn(move |next: HandlerFunc| {
        handler_fn(move |message| {
            let next = next.clone();
            async move {
                let msg_id = message.uuid();
                match tokio::time::timeout(limit, next(message)).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(
                            event = events::HANDLER_TIMED_OUT,
                            component = COMPONENT,
                            msg_id = %msg_id,
                            limit_ms = limit.as_millis() as u64,
                            "handler exceeded its deadline"
                        );
                        Err(HandlerError::msg(format!(
                            "handler timed out after {}ms",
                            limit.as_millis()
                        )))
                    }
                }
            }
        })
    })
}
