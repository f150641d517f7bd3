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


//! # topic-router
//!
//! `topic-router` binds named handlers to pub/sub topics inside one process. Each
//! handler consumes messages from an input topic, runs a processing function wrapped
//! in middleware, and publishes what it returns to an output topic (or, for sink
//! handlers, publishes nothing).
//!
//! The router never implements a broker. It drives any [`Publisher`]/[`Subscriber`]
//! pair; `channel-pubsub` in this workspace is the in-memory one.
//!
//! ## Quick start
//!
//! ```
//! use std::sync::Arc;
//! use channel_pubsub::ChannelPubSub;
//! use futures::StreamExt;
//! use tokio_util::sync::CancellationToken;
//! use topic_router::{Message, Publisher, Router, RouterConfig, Subscriber};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let pubsub = Arc::new(ChannelPubSub::default());
//! let router = Arc::new(Router::new(RouterConfig::default()));
//!
//! router
//!     .add_handler("echo", "in", pubsub.clone(), "out", pubsub.clone(), |message: Message| async move {
//!         let text = format!("processed:{}", message.payload_str().unwrap_or_default());
//!         Ok(vec![Message::new(text)])
//!     })
//!     .unwrap();
//!
//! let mut out = pubsub.subscribe("out").await.unwrap();
//! let running = tokio::spawn({
//!     let router = router.clone();
//!     async move { router.run(CancellationToken::new()).await }
//! });
//! router.running().wait().await;
//!
//! pubsub.publish("in", vec![Message::new("hello")]).await.unwrap();
//! let delivery = out.next().await.unwrap();
//! assert_eq!(delivery.message().payload_str(), Some("processed:hello"));
//! delivery.ack();
//!
//! router.close().await;
//! running.await.unwrap().unwrap();
//! # });
//! ```
//!
//! ## Lifecycle contract
//!
//! A router is configured while `Created`, runs once, and ends `Closed`. Closed
//! routers never restart; `close()` is idempotent and a no-op unless running.
//!
//! ## Internal architecture map
//!
//! - API facade: [`Router`], [`HandlerHandle`], [`Message`] and the broker traits
//! - Control plane: lifecycle state machine and the ordered handler registry
//! - Data plane: one receive/process/settle loop per handler
//! - Runtime: handler task types, spawning and loop-level panic containment
//! - Middleware: the shared function shape, composition and bundled layers
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events.
//! Library code emits events and does not initialize a global subscriber.
//! Binaries and tests are responsible for one-time `tracing_subscriber`
//! initialization at process boundaries.

mod config;
pub use config::RouterConfig;

mod control_plane;
pub use control_plane::lifecycle::RouterState;

mod data_plane;

mod error;
pub use error::{BoxError, ConfigError, HandlerError, PubSubError, RouterError};

mod handler;
pub use handler::HandlerHandle;

mod message;
pub use message::{Message, Metadata};

pub mod middleware;
pub use middleware::{HandlerFunc, HandlerResult, Middleware};

#[doc(hidden)]
pub mod observability;
pub mod plugins;

mod pubsub;
pub use pubsub::{Acknowledgement, Delivery, Publisher, Subscriber, Subscription};

mod router;
pub use router::{CloseHandle, Router, RouterPlugin};

mod runtime;

mod signal;
pub use signal::ReadySignal;

#[cfg(test)]
mod test_support;
