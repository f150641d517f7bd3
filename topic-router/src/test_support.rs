//! In-crate fake brokers for unit tests.

use crate::error::PubSubError;
use crate::pubsub::{Acknowledgement, Delivery, Publisher, Subscriber, Subscription};
use crate::Message;
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::{mpsc, oneshot};

/// Subscriber whose streams are fed by the test through [`FeedSubscriber::feed`].
#[derive(Default)]
pub(crate) struct FeedSubscriber {
    feeds: Mutex<HashMap<String, mpsc::UnboundedReceiver<Delivery>>>,
}

impl FeedSubscriber {
    /// Prepares the stream the next `subscribe(topic)` call will return.
    pub(crate) fn feed(&self, topic: &str) -> mpsc::UnboundedSender<Delivery> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.feeds
            .lock()
            .unwrap()
            .insert(topic.to_string(), receiver);
        sender
    }
}

#[async_trait]
impl Subscriber for FeedSubscriber {
    async fn subscribe(&self, topic: &str) -> Result<Subscription, PubSubError> {
        let receiver = self
            .feeds
            .lock()
            .unwrap()
            .remove(topic)
            .ok_or_else(|| PubSubError::Backend(format!("no feed for {topic}").into()))?;

        Ok(futures::stream::unfold(receiver, |mut receiver| async move {
            receiver.recv().await.map(|delivery| (delivery, receiver))
        })
        .boxed())
    }

    async fn close(&self) -> Result<(), PubSubError> {
        Ok(())
    }
}

/// Publisher that records every published message, or fails on demand.
#[derive(Default)]
pub(crate) struct RecordingPublisher {
    published: Mutex<Vec<(String, Message)>>,
    fail: AtomicBool,
}

impl RecordingPublisher {
    pub(crate) fn failing() -> Self {
        Self {
            fail: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub(crate) fn published(&self) -> Vec<(String, Message)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, topic: &str, messages: Vec<Message>) -> Result<(), PubSubError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PubSubError::Backend("publish refused".into()));
        }
        let mut published = self.published.lock().unwrap();
        published.extend(
            messages
                .into_iter()
                .map(|message| (topic.to_string(), message)),
        );
        Ok(())
    }

    async fn close(&self) -> Result<(), PubSubError> {
        Ok(())
    }
}

/// Builds a delivery together with the receiver observing its acknowledgment.
pub(crate) fn delivery(payload: &'static str) -> (Delivery, oneshot::Receiver<Acknowledgement>) {
    let (acker, outcome) = oneshot::channel();
    (Delivery::new(Message::new(payload), acker), outcome)
}
