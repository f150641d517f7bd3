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

//! Publish/subscribe contract consumed by the router.
//!
//! The router never implements a broker itself. Any type implementing [`Publisher`]
//! and/or [`Subscriber`] can back a handler binding; one instance is usually shared
//! by many bindings behind an `Arc`.

use crate::error::PubSubError;
use crate::message::Message;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt::{Debug, Formatter};
use tokio::sync::oneshot;

/// Outcome reported back to the broker for one delivery.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Acknowledgement {
    Ack,
    Nack,
}

/// One message handed to a subscriber, together with its acknowledgment channel.
///
/// Dropping a delivery without calling [`Delivery::ack`] or [`Delivery::nack`]
/// reports [`Acknowledgement::Nack`].
pub struct Delivery {
    message: Message,
    acker: Option<oneshot::Sender<Acknowledgement>>,
}

impl Delivery {
    /// Creates a delivery whose outcome is reported on `acker`.
    pub fn new(message: Message, acker: oneshot::Sender<Acknowledgement>) -> Self {
        Self {
            message,
            acker: Some(acker),
        }
    }

    /// Creates a delivery for brokers without acknowledgment support.
    pub fn unacknowledged(message: Message) -> Self {
        Self {
            message,
            acker: None,
        }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Whether the broker is waiting for an outcome on this delivery.
    pub fn is_acknowledgeable(&self) -> bool {
        self.acker.is_some()
    }

    /// Acknowledges the delivery. Returns `false` when the broker no longer listens.
    pub fn ack(mut self) -> bool {
        self.settle(Acknowledgement::Ack)
    }

    /// Negatively acknowledges the delivery. Returns `false` when the broker no longer listens.
    pub fn nack(mut self) -> bool {
        self.settle(Acknowledgement::Nack)
    }

    fn settle(&mut self, outcome: Acknowledgement) -> bool {
        match self.acker.take() {
            Some(acker) => acker.send(outcome).is_ok(),
            None => false,
        }
    }
}

impl Drop for Delivery {
    fn drop(&mut self) {
        self.settle(Acknowledgement::Nack);
    }
}

impl Debug for Delivery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delivery")
            .field("message", &self.message.uuid())
            .field("acknowledgeable", &self.acker.is_some())
            .finish()
    }
}

/// Stream of deliveries for one topic, yielding messages published after subscribing.
pub type Subscription = BoxStream<'static, Delivery>;

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Hands `messages` to every current subscriber of `topic`, preserving their order.
    async fn publish(&self, topic: &str, messages: Vec<Message>) -> Result<(), PubSubError>;

    async fn close(&self) -> Result<(), PubSubError>;
}

#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Starts a new, independent stream of messages published to `topic`.
    async fn subscribe(&self, topic: &str) -> Result<Subscription, PubSubError>;

    async fn close(&self) -> Result<(), PubSubError>;
}

#[cfg(test)]
mod tests {
    use super::{Acknowledgement, Delivery};
    use crate::Message;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn ack_reports_outcome_to_broker() {
        let (acker, outcome) = oneshot::channel();
        let delivery = Delivery::new(Message::new("payload"), acker);

        assert!(delivery.ack());
        assert_eq!(outcome.await, Ok(Acknowledgement::Ack));
    }

    #[tokio::test]
    async fn dropped_delivery_reports_nack() {
        let (acker, outcome) = oneshot::channel();
        drop(Delivery::new(Message::new("payload"), acker));

        assert_eq!(outcome.await, Ok(Acknowledgement::Nack));
    }

    #[test]
    fn unacknowledged_delivery_settles_to_false() {
        let delivery = Delivery::unacknowledged(Message::new("payload"));

        assert!(!delivery.is_acknowledgeable());
        assert!(!delivery.nack());
    }

    #[test]
    fn acknowledgeable_until_settled_by_broker_channel() {
        let (acker, _outcome) = oneshot::channel();
        let delivery = Delivery::new(Message::new("payload"), acker);

        assert!(delivery.is_acknowledgeable());
        assert!(delivery.ack());
    }

    #[test]
    fn settle_returns_false_when_broker_stopped_listening() {
        let (acker, outcome) = oneshot::channel();
        drop(outcome);

        assert!(!Delivery::new(Message::new("payload"), acker).ack());
    }
}
