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

//! Panic-to-error middleware.

use crate::error::HandlerError;
use crate::middleware::{handler_fn, middleware_fn, HandlerFunc, Middleware};
use crate::observability::events;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::error;

const COMPONENT: &str = "recoverer";

/// Converts a panic inside the wrapped function into a [`HandlerError`], so the
/// message is nacked instead of tearing down the handler loop.
pub fn recoverer() -> Middleware {
    middleware_fn(|next: HandlerFunc| {
        handler_fn(move |message| {
            let next = next.clone();
            async move {
                let msg_id = message.uuid();
                match AssertUnwindSafe(async move { next(message).await })
                    .catch_unwind()
                    .await
                {
                    Ok(result) => result,
                    Err(panic) => {
                        let reason = panic_reason(panic.as_ref());
                        error!(
                            event = events::HANDLER_PANIC_RECOVERED,
                            component = COMPONENT,
                            msg_id = %msg_id,
                            reason = reason.as_str(),
                            "recovered from handler panic"
                        );
                        Err(HandlerError::msg(format!("handler panicked: {reason}")))
                    }
                }
            }
        })
    })
}

pub(crate) fn panic_reason(panic: &(dyn Any + Send)) -> String {
    if let Some(reason) = panic.downcast_ref::<&str>() {
        (*reason).to_string()
    } else if let Some(reason) = panic.downcast_ref::<String>() {
        reason.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
