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

//! Handler function shape and onion-ordered middleware composition.
//!
//! A middleware turns the "next" [`HandlerFunc`] into a new one. Router-global
//! middleware wraps binding-local middleware, which wraps the processing function.
//! Inside one scope, the most recently added middleware is the outermost layer.
//!
//! ```
//! use topic_router::middleware::{handler_fn, middleware_fn, HandlerFunc};
//! use topic_router::Message;
//!
//! let log_entry = middleware_fn(|next: HandlerFunc| {
//!     handler_fn(move |message: Message| {
//!         let next = next.clone();
//!         async move {
//!             println!("entering for {}", message.uuid());
//!             next(message).await
//!         }
//!     })
//! });
//! # let _ = log_entry;
//! ```

mod correlation;
mod recoverer;
mod retry;
mod timeout;

pub use correlation::{correlation_id, CORRELATION_ID_KEY};
pub use recoverer::recoverer;
pub(crate) use recoverer::panic_reason;
pub use retry::Retry;
pub use timeout::timeout;

use crate::error::HandlerError;
use crate::message::Message;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;

/// Result of processing one message: the messages to publish, or a failure.
pub type HandlerResult = Result<Vec<Message>, HandlerError>;

/// Type-erased processing function shared by handlers and middleware.
pub type HandlerFunc = Arc<dyn Fn(Message) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Wrapper from "next" handler function to handler function.
pub type Middleware = Arc<dyn Fn(HandlerFunc) -> HandlerFunc + Send + Sync>;

/// Erases an async closure into a [`HandlerFunc`].
pub fn handler_fn<F, Fut>(handler: F) -> HandlerFunc
where
    F: Fn(Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |message| handler(message).boxed())
}

/// Erases a wrapping closure into a [`Middleware`].
pub fn middleware_fn<F>(middleware: F) -> Middleware
where
    F: Fn(HandlerFunc) -> HandlerFunc + Send + Sync + 'static,
{
    Arc::new(middleware)
}

/// Builds the fully wrapped function for one binding.
pub(crate) fn compose(
    handler: HandlerFunc,
    local: &[Middleware],
    global: &[Middleware],
) -> HandlerFunc {
    let wrapped = local.iter().fold(handler, |next, middleware| middleware(next));
    global
        .iter()
        .fold(wrapped, |next, middleware| middleware(next))
}
