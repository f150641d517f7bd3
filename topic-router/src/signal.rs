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

//! One-shot readiness signals.

use tokio::sync::watch;

/// Observer side of a one-shot signal. Once fired it stays fired.
#[derive(Clone, Debug)]
pub struct ReadySignal {
    receiver: watch::Receiver<bool>,
}

impl ReadySignal {
    /// Non-blocking check.
    pub fn is_ready(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Waits until the signal fires.
    ///
    /// Also returns if the owning router or handler was dropped without firing.
    pub async fn wait(&mut self) {
        let _ = self.receiver.wait_for(|ready| *ready).await;
    }
}

/// Owner side of a [`ReadySignal`].
#[derive(Debug)]
pub(crate) struct ReadyTrigger {
    sender: watch::Sender<bool>,
}

impl ReadyTrigger {
    pub(crate) fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    pub(crate) fn fire(&self) {
        self.sender.send_replace(true);
    }

    pub(crate) fn signal(&self) -> ReadySignal {
        ReadySignal {
            receiver: self.sender.subscribe(),
        }
    }
}
