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

use bytes::Bytes;
use std::collections::hash_map::Iter;
use std::collections::HashMap;
use uuid::Uuid;

/// String key/value pairs carried alongside a [`Message`] payload.
///
/// Keys are unique and iteration order is unspecified.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata(HashMap<String, String>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, String> {
        self.0.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Metadata
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl From<HashMap<String, String>> for Metadata {
    fn from(entries: HashMap<String, String>) -> Self {
        Self(entries)
    }
}

impl<'a> IntoIterator for &'a Metadata {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

///
/// [`Message`] is the immutable envelope routed between topics.
///
/// Every constructor assigns a fresh random identifier, so a handler that wants to
/// "change" a message builds a new one. Clones share the identifier of the original.
///
/// # Examples
///
/// ```
/// use topic_router::{Message, Metadata};
///
/// let plain = Message::new("hello");
/// assert!(plain.metadata().is_empty());
///
/// let tagged = Message::with_metadata(
///     "hello",
///     Metadata::from_iter([("correlation_id", "abc-123")]),
/// );
/// assert_eq!(tagged.metadata().get("correlation_id"), Some("abc-123"));
/// assert_ne!(plain.uuid(), tagged.uuid());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    uuid: Uuid,
    payload: Bytes,
    metadata: Metadata,
}

impl Message {
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self::with_metadata(payload, Metadata::new())
    }

    pub fn with_metadata(payload: impl Into<Bytes>, metadata: impl Into<Metadata>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            payload: payload.into(),
            metadata: metadata.into(),
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Returns the payload as text when it is valid UTF-8.
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::{Message, Metadata};
    use std::collections::HashMap;

    #[test]
    fn new_assigns_fresh_identifier_per_message() {
        let first = Message::new("same");
        let second = Message::new("same");

        assert_ne!(first.uuid(), second.uuid());
        assert_ne!(first, second);
    }

    #[test]
    fn clone_is_equal_to_original() {
        let message = Message::with_metadata("payload", Metadata::from_iter([("k", "v")]));

        assert_eq!(message.clone(), message);
    }

    #[test]
    fn empty_payload_is_valid() {
        let message = Message::new(Vec::<u8>::new());

        assert!(message.payload().is_empty());
        assert_eq!(message.payload_str(), Some(""));
        assert!(message.metadata().is_empty());
    }

    #[test]
    fn payload_str_rejects_invalid_utf8() {
        let message = Message::new(vec![0xffu8, 0xfe]);

        assert_eq!(message.payload_str(), None);
    }

    #[test]
    fn metadata_keeps_last_value_for_duplicate_keys() {
        let metadata = Metadata::from_iter([("key", "first"), ("key", "second")]);

        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata.get("key"), Some("second"));
    }

    #[test]
    fn metadata_equality_ignores_insertion_order() {
        let forward = Metadata::from_iter([("a", "1"), ("b", "2")]);
        let mut reversed = HashMap::new();
        reversed.insert("b".to_string(), "2".to_string());
        reversed.insert("a".to_string(), "1".to_string());

        assert_eq!(forward, Metadata::from(reversed));
    }
}
