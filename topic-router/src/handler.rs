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


//! Handler bindings and the public handle used to configure them.

use crate::middleware::{compose, HandlerFunc, Middleware};
use crate::observability::events;
use crate::pubsub::{Publisher, Subscriber};
use crate::signal::{ReadySignal, ReadyTrigger};
use parking_lot::Mutex;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const COMPONENT: &str = "handler";

/// Output side of a transforming binding.
pub(crate) struct PublishTarget {
    pub(crate) topic: String,
    pub(crate) publisher: Arc<dyn Publisher>,
}

/// One named subscription, its processing function and its optional output.
pub(crate) struct HandlerBinding {
    pub(crate) name: String,
    pub(crate) subscribe_topic: String,
    pub(crate) subscriber: Arc<dyn Subscriber>,
    pub(crate) publish: Option<PublishTarget>,
    handler: HandlerFunc,
    // `None` once the binding has been sealed for running.
    middleware: Mutex<Option<Vec<Middleware>>>,
    pub(crate) stop: CancellationToken,
    pub(crate) started: ReadyTrigger,
}

impl HandlerBinding {
    pub(crate) fn new(
        name: String,
        subscribe_topic: String,
        subscriber: Arc<dyn Subscriber>,
        publish: Option<PublishTarget>,
        handler: HandlerFunc,
        stop: CancellationToken,
    ) -> Self {
        Self {
            name,
            subscribe_topic,
            subscriber,
            publish,
            handler,
            middleware: Mutex::new(Some(Vec::new())),
            stop,
            started: ReadyTrigger::new(),
        }
    }

    pub(crate) fn publish_topic(&self) -> Option<&str> {
        self.publish.as_ref().map(|target| target.topic.as_str())
    }

    /// Returns `false` when the binding is already sealed.
    fn push_middleware(&self, middleware: Middleware) -> bool {
        match self.middleware.lock().as_mut() {
            Some(layers) => {
                layers.push(middleware);
                true
            }
            None => false,
        }
    }

    /// Freezes local middleware and builds the function the loop will invoke.
    pub(crate) fn seal(&self, global: &[Middleware]) -> HandlerFunc {
        let local = self.middleware.lock().take().unwrap_or_default();
        compose(self.handler.clone(), &local, global)
    }
}

/// Handle to a registered handler, returned by
/// [`Router::add_handler`][crate::Router::add_handler].
#[derive(Clone)]
pub struct HandlerHandle {
    binding: Arc<HandlerBinding>,
}

impl HandlerHandle {
    pub(crate) fn new(binding: Arc<HandlerBinding>) -> Self {
        Self { binding }
    }

    pub fn name(&self) -> &str {
        &self.binding.name
    }

    pub fn subscribe_topic(&self) -> &str {
        &self.binding.subscribe_topic
    }

    /// `None` for handlers added with
    /// [`Router::add_no_publisher_handler`][crate::Router::add_no_publisher_handler].
    pub fn publish_topic(&self) -> Option<&str> {
        self.binding.publish_topic()
    }

    /// Adds middleware applied to this handler only, inside any router-level middleware.
    ///
    /// Middleware added after the router started is ignored.
    pub fn add_middleware(&self, middleware: Middleware) -> &Self {
        if self.binding.push_middleware(middleware) {
            debug!(
                event = events::MIDDLEWARE_ADD_OK,
                component = COMPONENT,
                handler_name = self.name(),
                "handler middleware added"
            );
        } else {
            warn!(
                event = events::MIDDLEWARE_ADD_IGNORED,
                component = COMPONENT,
                handler_name = self.name(),
                reason = "handler_already_started",
                "handler middleware ignored"
            );
        }
        self
    }

    /// Stops this handler's loop after the message in flight, if any.
    ///
    /// The router keeps running; it closes only once every handler has stopped.
    pub fn stop(&self) {
        if self.binding.stop.is_cancelled() {
            return;
        }
        info!(
            event = events::HANDLER_STOP_REQUESTED,
            component = COMPONENT,
            handler_name = self.name(),
            "handler stop requested"
        );
        self.binding.stop.cancel();
    }

    /// Fires once the handler is subscribed and its loop is spawned.
    pub fn started(&self) -> ReadySignal {
        self.binding.started.signal()
    }
}

impl Debug for HandlerHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerHandle")
            .field("name", &self.binding.name)
            .field("subscribe_topic", &self.binding.subscribe_topic)
            .field("publish_topic", &self.binding.publish_topic())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{HandlerBinding, HandlerHandle};
    use crate::middleware::{handler_fn, middleware_fn, HandlerFunc};
    use crate::test_support::FeedSubscriber;
    use crate::Message;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    fn sink_binding() -> Arc<HandlerBinding> {
        Arc::new(HandlerBinding::new(
            "sink".to_string(),
            "in".to_string(),
            Arc::new(FeedSubscriber::default()),
            None,
            handler_fn(|_message: Message| async move { Ok(Vec::new()) }),
            CancellationToken::new(),
        ))
    }

    fn duplicating() -> crate::middleware::Middleware {
        middleware_fn(|next: HandlerFunc| {
            handler_fn(move |message: Message| {
                let next = next.clone();
                async move {
                    let mut outputs = next(message.clone()).await?;
                    outputs.push(message);
                    Ok(outputs)
                }
            })
        })
    }

    #[tokio::test]
    async fn middleware_added_after_seal_is_ignored() {
        let binding = sink_binding();
        let handle = HandlerHandle::new(binding.clone());
        handle.add_middleware(duplicating());

        let sealed = binding.seal(&[]);
        handle.add_middleware(duplicating());

        let outputs = sealed(Message::new("payload"))
            .await
            .expect("handler succeeds");
        assert_eq!(outputs.len(), 1);
        assert!(binding.middleware.lock().is_none());
    }

    #[test]
    fn stop_cancels_only_this_binding() {
        let parent = CancellationToken::new();
        let binding = Arc::new(HandlerBinding::new(
            "sink".to_string(),
            "in".to_string(),
            Arc::new(FeedSubscriber::default()),
            None,
            handler_fn(|_message: Message| async move { Ok(Vec::new()) }),
            parent.child_token(),
        ));

        HandlerHandle::new(binding.clone()).stop();

        assert!(binding.stop.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[test]
    fn handle_reports_binding_identity() {
        let handle = HandlerHandle::new(sink_binding());

        assert_eq!(handle.name(), "sink");
        assert_eq!(handle.subscribe_topic(), "in");
        assert_eq!(handle.publish_topic(), None);
        assert!(!handle.started().is_ready());
    }
}
