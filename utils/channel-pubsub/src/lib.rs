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


//! In-memory topic fan-out broker implementing the `topic-router` pub/sub contract.
//!
//! Every subscriber of a topic receives every message published after it subscribed,
//! in publish order. A subscription hands out one delivery at a time: the next
//! delivery is produced only once the previous one was acked or nacked.

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use topic_router::{
    Acknowledgement, Delivery, Message, PubSubError, Publisher, Subscriber, Subscription,
};
use tracing::{debug, warn};

const COMPONENT: &str = "channel_pubsub";

const PUBLISH_NO_SUBSCRIBERS: &str = "pubsub_publish_no_subscribers";
const SUBSCRIBER_PRUNED: &str = "pubsub_subscriber_pruned";
const SUBSCRIBE_OK: &str = "pubsub_subscribe_ok";
const DELIVERY_REDELIVER: &str = "pubsub_delivery_redeliver";
const DELIVERY_DROPPED: &str = "pubsub_delivery_dropped";
const PUBSUB_CLOSED: &str = "pubsub_closed";

/// Tuning for [`ChannelPubSub`].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct ChannelPubSubConfig {
    /// Messages buffered per subscriber before `publish` waits.
    pub output_buffer: usize,
    /// Redeliver nacked messages instead of dropping them.
    pub redeliver_on_nack: bool,
    /// Redelivery attempts per message when `redeliver_on_nack` is set.
    pub max_redeliveries: u32,
}

impl Default for ChannelPubSubConfig {
    fn default() -> Self {
        Self {
            output_buffer: 64,
            redeliver_on_nack: false,
            max_redeliveries: 3,
        }
    }
}

struct SubscriberQueue {
    id: u64,
    sender: mpsc::Sender<Message>,
}

#[derive(Default)]
struct Topics {
    next_id: u64,
    queues: HashMap<String, Vec<SubscriberQueue>>,
}

/// Broker backed by one bounded channel per subscriber.
pub struct ChannelPubSub {
    config: ChannelPubSubConfig,
    topics: Mutex<Topics>,
    closed: CancellationToken,
}

impl Default for ChannelPubSub {
    fn default() -> Self {
        Self::new(ChannelPubSubConfig::default())
    }
}

impl ChannelPubSub {
    pub fn new(config: ChannelPubSubConfig) -> Self {
        Self {
            config,
            topics: Mutex::new(Topics::default()),
            closed: CancellationToken::new(),
        }
    }

    /// Ends every subscription stream and rejects further publish/subscribe calls.
    pub fn close(&self) {
        if self.closed.is_cancelled() {
            return;
        }
        self.closed.cancel();
        self.topics.lock().queues.clear();
        debug!(event = PUBSUB_CLOSED, component = COMPONENT, "pubsub closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Number of live subscriptions for `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .lock()
            .queues
            .get(topic)
            .map_or(0, |queues| {
                queues.iter().filter(|queue| !queue.sender.is_closed()).count()
            })
    }

    fn senders(&self, topic: &str) -> Vec<(u64, mpsc::Sender<Message>)> {
        self.topics
            .lock()
            .queues
            .get(topic)
            .map(|queues| {
                queues
                    .iter()
                    .map(|queue| (queue.id, queue.sender.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn prune(&self, topic: &str, dead: &[u64]) {
        let mut topics = self.topics.lock();
        if let Some(queues) = topics.queues.get_mut(topic) {
            queues.retain(|queue| !dead.contains(&queue.id));
            if queues.is_empty() {
                topics.queues.remove(topic);
            }
        }
        debug!(
            event = SUBSCRIBER_PRUNED,
            component = COMPONENT,
            topic,
            pruned = dead.len(),
            "dropped subscriptions removed"
        );
    }
}

#[async_trait]
impl Publisher for ChannelPubSub {
    async fn publish(&self, topic: &str, messages: Vec<Message>) -> Result<(), PubSubError> {
        if self.is_closed() {
            return Err(PubSubError::Closed);
        }

        let senders = self.senders(topic);
        if senders.is_empty() {
            debug!(
                event = PUBLISH_NO_SUBSCRIBERS,
                component = COMPONENT,
                topic,
                message_count = messages.len(),
                "no subscribers; messages dropped"
            );
            return Ok(());
        }

        let mut dead = Vec::new();
        for message in messages {
            for (id, sender) in &senders {
                if dead.contains(id) {
                    continue;
                }
                tokio::select! {
                    _ = self.closed.cancelled() => return Err(PubSubError::Closed),
                    sent = sender.send(message.clone()) => {
                        if sent.is_err() {
                            dead.push(*id);
                        }
                    }
                }
            }
        }

        if !dead.is_empty() {
            self.prune(topic, &dead);
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), PubSubError> {
        ChannelPubSub::close(self);
        Ok(())
    }
}

#[async_trait]
impl Subscriber for ChannelPubSub {
    async fn subscribe(&self, topic: &str) -> Result<Subscription, PubSubError> {
        let receiver = {
            let mut topics = self.topics.lock();
            if self.closed.is_cancelled() {
                return Err(PubSubError::Closed);
            }
            let (sender, receiver) = mpsc::channel(self.config.output_buffer.max(1));
            let id = topics.next_id;
            topics.next_id += 1;
            topics
                .queues
                .entry(topic.to_string())
                .or_default()
                .push(SubscriberQueue { id, sender });
            receiver
        };
        debug!(
            event = SUBSCRIBE_OK,
            component = COMPONENT,
            topic,
            "subscription opened"
        );

        let state = DeliveryState {
            topic: topic.to_string(),
            receiver,
            pending: None,
            closed: self.closed.clone(),
            config: self.config.clone(),
        };
        Ok(futures::stream::unfold(state, |mut state| async move {
            state.next_delivery().await.map(|delivery| (delivery, state))
        })
        .boxed())
    }

    async fn close(&self) -> Result<(), PubSubError> {
        ChannelPubSub::close(self);
        Ok(())
    }
}

struct PendingAck {
    message: Message,
    redeliveries: u32,
    outcome: oneshot::Receiver<Acknowledgement>,
}

struct DeliveryState {
    topic: String,
    receiver: mpsc::Receiver<Message>,
    pending: Option<PendingAck>,
    closed: CancellationToken,
    config: ChannelPubSubConfig,
}

impl DeliveryState {
    async fn next_delivery(&mut self) -> Option<Delivery> {
        if let Some(pending) = self.pending.take() {
            let outcome = tokio::select! {
                _ = self.closed.cancelled() => return None,
                outcome = pending.outcome => outcome.unwrap_or(Acknowledgement::Nack),
            };

            if outcome == Acknowledgement::Nack {
                if self.config.redeliver_on_nack
                    && pending.redeliveries < self.config.max_redeliveries
                {
                    debug!(
                        event = DELIVERY_REDELIVER,
                        component = COMPONENT,
                        topic = self.topic.as_str(),
                        msg_id = %pending.message.uuid(),
                        attempt = pending.redeliveries + 1,
                        "redelivering nacked message"
                    );
                    return Some(self.deliver(pending.message, pending.redeliveries + 1));
                }
                warn!(
                    event = DELIVERY_DROPPED,
                    component = COMPONENT,
                    topic = self.topic.as_str(),
                    msg_id = %pending.message.uuid(),
                    redeliveries = pending.redeliveries,
                    "nacked message dropped"
                );
            }
        }

        let message = tokio::select! {
            _ = self.closed.cancelled() => return None,
            message = self.receiver.recv() => message?,
        };
        Some(self.deliver(message, 0))
    }

    fn deliver(&mut self, message: Message, redeliveries: u32) -> Delivery {
        let (acker, outcome) = oneshot::channel();
        self.pending = Some(PendingAck {
            message: message.clone(),
            redeliveries,
            outcome,
        });
        Delivery::new(message, acker)
    }
}
