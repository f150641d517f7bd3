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

//! Canonical structured field keys and value-format helpers.

use crate::message::{Message, Metadata};

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const HANDLER_NAME: &str = "handler_name";
pub const LOOP_ID: &str = "loop_id";
pub const SUBSCRIBE_TOPIC: &str = "subscribe_topic";
pub const PUBLISH_TOPIC: &str = "publish_topic";

pub const MSG_ID: &str = "msg_id";
pub const PAYLOAD_LEN: &str = "payload_len";
pub const METADATA: &str = "metadata";
pub const OUTPUT_COUNT: &str = "output_count";

pub const REASON: &str = "reason";
pub const ERR: &str = "err";

pub const NONE: &str = "none";
pub const REASON_STOP_SIGNAL: &str = "stop_signal";
pub const REASON_STREAM_CLOSED: &str = "stream_closed";
pub const REASON_SHUTDOWN_TOKEN: &str = "shutdown_token";
pub const REASON_CLOSE_REQUESTED: &str = "close_requested";
pub const REASON_ALL_HANDLERS_STOPPED: &str = "all_handlers_stopped";

/// Identity of one running handler loop, attached to every loop event.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoopContext {
    pub handler_name: String,
    pub loop_id: String,
    pub subscribe_topic: String,
    pub publish_topic: String,
}

impl LoopContext {
    pub fn new(
        handler_name: impl Into<String>,
        loop_id: impl Into<String>,
        subscribe_topic: impl Into<String>,
        publish_topic: Option<&str>,
    ) -> Self {
        Self {
            handler_name: handler_name.into(),
            loop_id: loop_id.into(),
            subscribe_topic: subscribe_topic.into(),
            publish_topic: topic_or_none(publish_topic),
        }
    }
}

pub fn topic_or_none(topic: Option<&str>) -> String {
    topic.unwrap_or(NONE).to_string()
}

pub fn format_message_id(message: &Message) -> String {
    message.uuid().hyphenated().to_string()
}

/// Renders metadata as `key=value` pairs sorted by key so log lines are stable.
pub fn format_metadata(metadata: &Metadata) -> String {
    if metadata.is_empty() {
        return NONE.to_string();
    }

    let mut pairs: Vec<String> = metadata
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    pairs.sort();
    pairs.join(",")
}
