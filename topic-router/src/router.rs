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


//! The [`Router`]: handler registration, run loop and shutdown.

use crate::config::RouterConfig;
use crate::control_plane::handler_registry::HandlerRegistry;
use crate::control_plane::lifecycle::{Lifecycle, RouterState};
use crate::data_plane::handler_loop::HandlerLoop;
use crate::error::{BoxError, RouterError};
use crate::handler::{HandlerBinding, HandlerHandle, PublishTarget};
use crate::message::Message;
use crate::middleware::{handler_fn, HandlerFunc, HandlerResult, Middleware};
use crate::observability::{events, fields};
use crate::pubsub::{Publisher, Subscriber};
use crate::runtime::worker_runtime::{spawn_handler_loop, HandlerJoin, HandlerTasks};
use crate::signal::ReadySignal;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const COMPONENT: &str = "router";
const CLOSE_WAIT_GRACE: Duration = Duration::from_secs(1);

/// Startup hook run at the beginning of [`Router::run`].
pub type RouterPlugin = Box<dyn FnOnce(&Router) -> Result<(), BoxError> + Send>;

/// Binds named handlers to topics and drives one processing loop per handler.
///
/// A router runs at most once: `Created -> Running -> Closed`.
pub struct Router {
    config: RouterConfig,
    handlers: HandlerRegistry,
    middleware: Mutex<Vec<Middleware>>,
    plugins: Mutex<Vec<RouterPlugin>>,
    lifecycle: Arc<Lifecycle>,
    close_token: CancellationToken,
}

impl Router {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            handlers: HandlerRegistry::new(),
            middleware: Mutex::new(Vec::new()),
            plugins: Mutex::new(Vec::new()),
            lifecycle: Arc::new(Lifecycle::new()),
            close_token: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Registers a transforming handler: every message from `subscribe_topic` is
    /// processed by `handler` and its outputs are published to `publish_topic`.
    pub fn add_handler<F, Fut>(
        &self,
        name: impl Into<String>,
        subscribe_topic: impl Into<String>,
        subscriber: Arc<dyn Subscriber>,
        publish_topic: impl Into<String>,
        publisher: Arc<dyn Publisher>,
        handler: F,
    ) -> Result<HandlerHandle, RouterError>
    where
        F: Fn(Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let target = PublishTarget {
            topic: publish_topic.into(),
            publisher,
        };
        self.add_binding(
            name.into(),
            subscribe_topic.into(),
            subscriber,
            Some(target),
            handler_fn(handler),
        )
    }

    /// Registers a sink handler. Messages it returns are discarded.
    pub fn add_no_publisher_handler<F, Fut>(
        &self,
        name: impl Into<String>,
        subscribe_topic: impl Into<String>,
        subscriber: Arc<dyn Subscriber>,
        handler: F,
    ) -> Result<HandlerHandle, RouterError>
    where
        F: Fn(Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.add_binding(
            name.into(),
            subscribe_topic.into(),
            subscriber,
            None,
            handler_fn(handler),
        )
    }

    fn add_binding(
        &self,
        name: String,
        subscribe_topic: String,
        subscriber: Arc<dyn Subscriber>,
        publish: Option<PublishTarget>,
        handler: HandlerFunc,
    ) -> Result<HandlerHandle, RouterError> {
        let empty_publish_topic = publish
            .as_ref()
            .is_some_and(|target| target.topic.is_empty());
        let result = if subscribe_topic.is_empty() || empty_publish_topic {
            Err(RouterError::InvalidTopic {
                handler: name.clone(),
            })
        } else {
            let binding = Arc::new(HandlerBinding::new(
                name.clone(),
                subscribe_topic,
                subscriber,
                publish,
                handler,
                self.close_token.child_token(),
            ));
            self.handlers
                .insert(binding.clone(), &self.lifecycle)
                .map(|()| HandlerHandle::new(binding))
        };

        match &result {
            Ok(handle) => info!(
                event = events::HANDLER_ADD_OK,
                component = COMPONENT,
                handler_name = handle.name(),
                subscribe_topic = handle.subscribe_topic(),
                publish_topic = fields::topic_or_none(handle.publish_topic()).as_str(),
                "handler added"
            ),
            Err(err) => warn!(
                event = events::HANDLER_ADD_FAILED,
                component = COMPONENT,
                handler_name = name.as_str(),
                err = %err,
                "handler rejected"
            ),
        }
        result
    }

    /// Adds middleware applied to every handler, outside any handler-level middleware.
    ///
    /// Middleware added after `run` began is ignored.
    pub fn add_middleware(&self, middleware: Middleware) {
        let mut layers = self.middleware.lock();
        if self.lifecycle.ensure_configurable().is_err() {
            warn!(
                event = events::MIDDLEWARE_ADD_IGNORED,
                component = COMPONENT,
                reason = "router_already_started",
                "router middleware ignored"
            );
            return;
        }
        layers.push(middleware);
        debug!(
            event = events::MIDDLEWARE_ADD_OK,
            component = COMPONENT,
            layer_count = layers.len(),
            "router middleware added"
        );
    }

    /// Registers a startup hook. Plugins run in registration order when `run` begins;
    /// the first failure aborts startup.
    pub fn add_plugin<P>(&self, plugin: P) -> Result<(), RouterError>
    where
        P: FnOnce(&Router) -> Result<(), BoxError> + Send + 'static,
    {
        let mut plugins = self.plugins.lock();
        self.lifecycle.ensure_configurable()?;
        plugins.push(Box::new(plugin));
        Ok(())
    }

    /// Names of registered handlers, in registration order.
    pub fn handlers(&self) -> Vec<String> {
        self.handlers.names()
    }

    pub fn state(&self) -> RouterState {
        self.lifecycle.state()
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    pub fn is_closed(&self) -> bool {
        self.lifecycle.is_closed()
    }

    /// Fires once every handler is subscribed and the router is running.
    pub fn running(&self) -> ReadySignal {
        self.lifecycle.running_signal()
    }

    /// Detached handle able to close this router from another task.
    pub fn closer(&self) -> CloseHandle {
        CloseHandle {
            lifecycle: self.lifecycle.clone(),
            close_token: self.close_token.clone(),
            wait_limit: self.config.close_timeout + CLOSE_WAIT_GRACE,
        }
    }

    /// Runs every handler until `shutdown` fires, [`Router::close`] is called, or all
    /// handlers stopped on their own. Returns after the router reached `Closed`.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), RouterError> {
        if let Err(err) = self.lifecycle.begin_run() {
            warn!(
                event = events::ROUTER_RUN_REJECTED,
                component = COMPONENT,
                err = %err,
                "run rejected"
            );
            return Err(err);
        }

        let bindings = self.handlers.snapshot();
        info!(
            event = events::ROUTER_RUN_START,
            component = COMPONENT,
            handler_count = bindings.len(),
            "router starting"
        );

        let plugins = std::mem::take(&mut *self.plugins.lock());
        for plugin in plugins {
            if let Err(err) = plugin(self) {
                error!(
                    event = events::PLUGIN_RUN_FAILED,
                    component = COMPONENT,
                    err = %err,
                    "plugin failed; aborting startup"
                );
                self.abort_startup(HandlerTasks::new()).await;
                return Err(RouterError::Plugin(err));
            }
        }

        let global = self.middleware.lock().clone();
        let mut tasks = HandlerTasks::new();
        for binding in bindings {
            let handler = binding.seal(&global);
            debug!(
                event = events::HANDLER_SUBSCRIBE_START,
                component = COMPONENT,
                handler_name = binding.name.as_str(),
                subscribe_topic = binding.subscribe_topic.as_str(),
                "subscribing handler"
            );

            let subscription = match binding.subscriber.subscribe(&binding.subscribe_topic).await {
                Ok(subscription) => subscription,
                Err(source) => {
                    error!(
                        event = events::HANDLER_SUBSCRIBE_FAILED,
                        component = COMPONENT,
                        handler_name = binding.name.as_str(),
                        subscribe_topic = binding.subscribe_topic.as_str(),
                        err = %source,
                        "subscribe failed; aborting startup"
                    );
                    self.abort_startup(tasks).await;
                    return Err(RouterError::Subscribe {
                        handler: binding.name.clone(),
                        topic: binding.subscribe_topic.clone(),
                        source,
                    });
                }
            };
            debug!(
                event = events::HANDLER_SUBSCRIBE_OK,
                component = COMPONENT,
                handler_name = binding.name.as_str(),
                subscribe_topic = binding.subscribe_topic.as_str(),
                "handler subscribed"
            );

            let handler_loop = HandlerLoop::new(binding.clone(), handler);
            spawn_handler_loop(
                &mut tasks,
                binding.name.clone(),
                handler_loop.run(subscription),
            );
            binding.started.fire();
        }

        self.lifecycle.mark_running();
        info!(
            event = events::ROUTER_RUNNING,
            component = COMPONENT,
            handler_count = tasks.len(),
            "router running"
        );

        let reason = self.wait_for_shutdown(&shutdown, &mut tasks).await;
        info!(
            event = events::ROUTER_SHUTDOWN_SIGNAL,
            component = COMPONENT,
            reason,
            "router shutting down"
        );

        self.stop_handlers(&mut tasks).await;
        self.lifecycle.mark_closed();
        info!(
            event = events::ROUTER_CLOSED,
            component = COMPONENT,
            "router closed"
        );
        Ok(())
    }

    /// Requests shutdown and waits until the router is closed. No-op unless running.
    pub async fn close(&self) {
        self.closer().close().await;
    }

    async fn wait_for_shutdown(
        &self,
        shutdown: &CancellationToken,
        tasks: &mut HandlerTasks,
    ) -> &'static str {
        if tasks.is_empty() {
            return tokio::select! {
                _ = shutdown.cancelled() => fields::REASON_SHUTDOWN_TOKEN,
                _ = self.close_token.cancelled() => fields::REASON_CLOSE_REQUESTED,
            };
        }

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return fields::REASON_SHUTDOWN_TOKEN,
                _ = self.close_token.cancelled() => return fields::REASON_CLOSE_REQUESTED,
                exit = tasks.join_next() => match exit {
                    Some(exit) => log_handler_exit(exit),
                    None => {
                        info!(
                            event = events::ROUTER_ALL_HANDLERS_STOPPED,
                            component = COMPONENT,
                            "every handler stopped on its own"
                        );
                        return fields::REASON_ALL_HANDLERS_STOPPED;
                    }
                },
            }
        }
    }

    /// Cancels every loop and waits for them up to `close_timeout`.
    async fn stop_handlers(&self, tasks: &mut HandlerTasks) {
        self.close_token.cancel();

        let drained =
            tokio::time::timeout(self.config.close_timeout, drain_handlers(tasks)).await;

        if drained.is_err() {
            warn!(
                event = events::ROUTER_SHUTDOWN_TIMEOUT,
                component = COMPONENT,
                remaining = tasks.len(),
                close_timeout_ms = self.config.close_timeout.as_millis() as u64,
                "handlers did not stop in time; aborting"
            );
            tasks.abort_all();
        }
    }

    async fn abort_startup(&self, mut tasks: HandlerTasks) {
        self.stop_handlers(&mut tasks).await;
        self.lifecycle.mark_closed();
        warn!(
            event = events::ROUTER_STARTUP_FAILED,
            component = COMPONENT,
            "startup failed; router closed"
        );
    }
}

async fn drain_handlers(tasks: &mut HandlerTasks) {
    while let Some(exit) = tasks.join_next().await {
        log_handler_exit(exit);
    }
}

fn log_handler_exit(exit: HandlerJoin) {
    match exit {
        Ok(exit) => debug!(
            event = events::HANDLER_LOOP_STOPPED,
            component = COMPONENT,
            handler_name = exit.handler_name.as_str(),
            panicked = exit.panicked,
            "handler task finished"
        ),
        Err(err) => warn!(
            event = events::HANDLER_LOOP_STOPPED,
            component = COMPONENT,
            err = %err,
            "handler task did not finish cleanly"
        ),
    }
}

/// Closes a [`Router`] without borrowing it; obtained from [`Router::closer`].
#[derive(Clone)]
pub struct CloseHandle {
    lifecycle: Arc<Lifecycle>,
    close_token: CancellationToken,
    wait_limit: Duration,
}

impl CloseHandle {
    /// Signals every handler loop to stop and waits for the router to close.
    ///
    /// Idempotent. Does nothing when the router never ran or is already closed.
    pub async fn close(&self) {
        let state = self.lifecycle.state();
        if state != RouterState::Running {
            debug!(
                event = events::ROUTER_CLOSE_NOOP,
                component = COMPONENT,
                state = ?state,
                "close ignored"
            );
            return;
        }

        info!(
            event = events::ROUTER_CLOSE_REQUESTED,
            component = COMPONENT,
            "router close requested"
        );
        self.close_token.cancel();

        let mut closed = self.lifecycle.closed_signal();
        if tokio::time::timeout(self.wait_limit, closed.wait())
            .await
            .is_err()
        {
            warn!(
                event = events::ROUTER_CLOSE_WAIT_TIMEOUT,
                component = COMPONENT,
                wait_limit_ms = self.wait_limit.as_millis() as u64,
                "router did not report closed in time"
            );
        }
    }

    /// Waits until the router is closed, whoever closed it.
    pub async fn closed(&self) {
        self.lifecycle.closed_signal().wait().await;
    }
}

impl std::fmt::Debug for CloseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloseHandle")
            .field("state", &self.lifecycle.state())
            .finish()
    }
}
