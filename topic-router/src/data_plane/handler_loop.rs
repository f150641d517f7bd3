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


//! Sequential receive/process/settle loop for one handler binding.

use crate::handler::HandlerBinding;
use crate::message::Message;
use crate::middleware::{panic_reason, HandlerFunc};
use crate::observability::events;
use crate::observability::fields::{self, LoopContext};
use crate::pubsub::{Delivery, Subscription};
use futures::{FutureExt, StreamExt};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, Level};
use uuid::Uuid;

const COMPONENT: &str = "handler_loop";

struct FormattedMessageFields {
    msg_id: String,
    payload_len: usize,
    metadata: String,
}

impl FormattedMessageFields {
    fn from_message(message: &Message) -> Self {
        Self {
            msg_id: fields::format_message_id(message),
            payload_len: message.payload().len(),
            metadata: fields::format_metadata(message.metadata()),
        }
    }
}

pub(crate) struct HandlerLoop {
    context: LoopContext,
    binding: Arc<HandlerBinding>,
    handler: HandlerFunc,
}

impl HandlerLoop {
    pub(crate) fn new(binding: Arc<HandlerBinding>, handler: HandlerFunc) -> Self {
        let context = LoopContext::new(
            binding.name.as_str(),
            Uuid::new_v4().hyphenated().to_string(),
            binding.subscribe_topic.as_str(),
            binding.publish_topic(),
        );
        Self {
            context,
            binding,
            handler,
        }
    }

    /// Processes deliveries until the stream ends or the binding's stop token fires.
    ///
    /// Stop is observed between messages only; a delivery already pulled is
    /// processed and settled first.
    pub(crate) async fn run(self, mut subscription: Subscription) {
        info!(
            event = events::HANDLER_LOOP_START,
            component = COMPONENT,
            handler_name = self.context.handler_name.as_str(),
            loop_id = self.context.loop_id.as_str(),
            subscribe_topic = self.context.subscribe_topic.as_str(),
            publish_topic = self.context.publish_topic.as_str(),
            "handler loop started"
        );

        let reason = loop {
            let delivery = tokio::select! {
                biased;
                _ = self.binding.stop.cancelled() => {
                    debug!(
                        event = events::HANDLER_LOOP_STOP_REQUESTED,
                        component = COMPONENT,
                        handler_name = self.context.handler_name.as_str(),
                        loop_id = self.context.loop_id.as_str(),
                        "stop observed between messages"
                    );
                    break fields::REASON_STOP_SIGNAL;
                }
                next = subscription.next() => match next {
                    Some(delivery) => delivery,
                    None => {
                        debug!(
                            event = events::HANDLER_LOOP_STREAM_CLOSED,
                            component = COMPONENT,
                            handler_name = self.context.handler_name.as_str(),
                            loop_id = self.context.loop_id.as_str(),
                            "subscription stream ended"
                        );
                        break fields::REASON_STREAM_CLOSED;
                    }
                },
            };

            self.process(delivery).await;
        };

        info!(
            event = events::HANDLER_LOOP_STOPPED,
            component = COMPONENT,
            handler_name = self.context.handler_name.as_str(),
            loop_id = self.context.loop_id.as_str(),
            reason,
            "handler loop stopped"
        );
    }

    async fn process(&self, delivery: Delivery) {
        let message = delivery.message().clone();
        let mut message_fields =
            tracing::enabled!(Level::DEBUG).then(|| FormattedMessageFields::from_message(&message));

        if let Some(fields) = message_fields.as_ref() {
            debug!(
                event = events::MESSAGE_RECEIVED,
                component = COMPONENT,
                handler_name = self.context.handler_name.as_str(),
                loop_id = self.context.loop_id.as_str(),
                subscribe_topic = self.context.subscribe_topic.as_str(),
                msg_id = fields.msg_id.as_str(),
                payload_len = fields.payload_len,
                metadata = fields.metadata.as_str(),
                "message received"
            );
        }

        // A panic is settled like a processing error so the loop keeps its subscription.
        let outcome = AssertUnwindSafe((self.handler)(message.clone()))
            .catch_unwind()
            .await;
        let outputs = match outcome {
            Ok(Ok(outputs)) => outputs,
            Ok(Err(err)) => {
                let fields = message_fields
                    .get_or_insert_with(|| FormattedMessageFields::from_message(&message));
                error!(
                    event = events::MESSAGE_PROCESSING_FAILED,
                    component = COMPONENT,
                    handler_name = self.context.handler_name.as_str(),
                    loop_id = self.context.loop_id.as_str(),
                    subscribe_topic = self.context.subscribe_topic.as_str(),
                    msg_id = fields.msg_id.as_str(),
                    err = %err,
                    "processing failed; nacking message"
                );
                self.settle(delivery, false);
                return;
            }
            Err(panic) => {
                let fields = message_fields
                    .get_or_insert_with(|| FormattedMessageFields::from_message(&message));
                error!(
                    event = events::MESSAGE_HANDLER_PANICKED,
                    component = COMPONENT,
                    handler_name = self.context.handler_name.as_str(),
                    loop_id = self.context.loop_id.as_str(),
                    subscribe_topic = self.context.subscribe_topic.as_str(),
                    msg_id = fields.msg_id.as_str(),
                    reason = panic_reason(panic.as_ref()).as_str(),
                    "handler panicked; nacking message"
                );
                self.settle(delivery, false);
                return;
            }
        };

        let output_count = outputs.len();
        match self.binding.publish.as_ref() {
            Some(target) if !outputs.is_empty() => {
                if let Err(err) = target.publisher.publish(&target.topic, outputs).await {
                    let fields = message_fields
                        .get_or_insert_with(|| FormattedMessageFields::from_message(&message));
                    error!(
                        event = events::MESSAGE_PUBLISH_FAILED,
                        component = COMPONENT,
                        handler_name = self.context.handler_name.as_str(),
                        loop_id = self.context.loop_id.as_str(),
                        publish_topic = target.topic.as_str(),
                        msg_id = fields.msg_id.as_str(),
                        output_count,
                        err = %err,
                        "publishing outputs failed; nacking message"
                    );
                    self.settle(delivery, false);
                    return;
                }
            }
            Some(_) => {}
            None if output_count > 0 => {
                debug!(
                    event = events::SINK_OUTPUT_DISCARDED,
                    component = COMPONENT,
                    handler_name = self.context.handler_name.as_str(),
                    loop_id = self.context.loop_id.as_str(),
                    output_count,
                    "sink handler returned messages; discarding"
                );
            }
            None => {}
        }

        if let Some(fields) = message_fields.as_ref() {
            debug!(
                event = events::MESSAGE_PROCESSED,
                component = COMPONENT,
                handler_name = self.context.handler_name.as_str(),
                loop_id = self.context.loop_id.as_str(),
                publish_topic = self.context.publish_topic.as_str(),
                msg_id = fields.msg_id.as_str(),
                output_count,
                "message processed"
            );
        }
        self.settle(delivery, true);
    }

    fn settle(&self, delivery: Delivery, ack: bool) {
        let msg_id = delivery.message().uuid();
        let acknowledgeable = delivery.is_acknowledgeable();
        let delivered = if ack { delivery.ack() } else { delivery.nack() };
        if ack_lost(acknowledgeable, delivered) {
            debug!(
                event = events::ACK_NOT_DELIVERED,
                component = COMPONENT,
                handler_name = self.context.handler_name.as_str(),
                msg_id = %msg_id,
                ack,
                "broker did not receive acknowledgment"
            );
        }
    }
}

/// Brokers without acknowledgment support never expect an outcome.
fn ack_lost(acknowledgeable: bool, delivered: bool) -> bool {
    acknowledgeable && !delivered
}
