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

//! Correlation-id propagation middleware.

use crate::message::{Message, Metadata};
use crate::middleware::{handler_fn, middleware_fn, HandlerFunc, Middleware};
use std::collections::HashMap;

/// Metadata key carrying the correlation identifier.
pub const CORRELATION_ID_KEY: &str = "correlation_id";

/// Copies the input's correlation id onto every produced message that lacks one.
///
/// Messages are immutable, so outputs that need the key are rebuilt (and therefore
/// receive new identifiers). Outputs already carrying a correlation id are kept as-is.
pub fn correlation_id() -> Middleware {
    middleware_fn(|next: HandlerFunc| {
        handler_fn(move |message: Message| {
            let next = next.clone();
            async move {
                let correlation = message
                    .metadata()
                    .get(CORRELATION_ID_KEY)
                    .map(str::to_string);
                let outputs = next(message).await?;

                let Some(correlation) = correlation else {
                    return Ok(outputs);
                };

                Ok(outputs
                    .into_iter()
                    .map(|output| with_correlation(output, &correlation))
                    .collect())
            }
        })
    })
}

fn with_correlation(output: Message, correlation: &str) -> Message {
    if output.metadata().contains_key(CORRELATION_ID_KEY) {
        return output;
    }

    let mut entries: HashMap<String, String> = output
        .metadata()
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    entries.insert(CORRELATION_ID_KEY.to_string(), correlation.to_string());
    Message::with_metadata(output.payload().clone(), Metadata::from(entries))
}

#[cfg(test)]
mod tests {
    use super::{correlation_id, CORRELATION_ID_KEY};
    use crate::middleware::handler_fn;
    use crate::{Message, Metadata};

    #[tokio::test]
    async fn outputs_inherit_input_correlation_id() {
        let wrapped = correlation_id()(handler_fn(|_message: Message| async move {
            Ok(vec![
                Message::with_metadata("a", Metadata::from_iter([("kind", "first")])),
                Message::new("b"),
            ])
        }));

        let input = Message::with_metadata("in", Metadata::from_iter([(CORRELATION_ID_KEY, "c-1")]));
        let outputs = wrapped(input).await.expect("handler succeeds");

        assert_eq!(outputs.len(), 2);
        for output in &outputs {
            assert_eq!(output.metadata().get(CORRELATION_ID_KEY), Some("c-1"));
        }
        assert_eq!(outputs[0].metadata().get("kind"), Some("first"));
        assert_eq!(outputs[0].payload().as_ref(), b"a");
    }

    #[tokio::test]
    async fn existing_correlation_id_is_preserved() {
        let produced = Message::with_metadata("a", Metadata::from_iter([(CORRELATION_ID_KEY, "own")]));
        let produced_id = produced.uuid();
        let wrapped = correlation_id()(handler_fn(move |_message: Message| {
            let produced = produced.clone();
            async move { Ok(vec![produced]) }
        }));

        let input = Message::with_metadata("in", Metadata::from_iter([(CORRELATION_ID_KEY, "c-1")]));
        let outputs = wrapped(input).await.expect("handler succeeds");

        assert_eq!(outputs[0].uuid(), produced_id);
        assert_eq!(outputs[0].metadata().get(CORRELATION_ID_KEY), Some("own"));
    }

    #[tokio::test]
    async fn input_without_correlation_leaves_outputs_untouched() {
        let wrapped = correlation_id()(handler_fn(|_message: Message| async move {
            Ok(vec![Message::new("a")])
        }));

        let outputs = wrapped(Message::new("in")).await.expect("handler succeeds");

        assert!(outputs[0].metadata().is_empty());
    }
}
