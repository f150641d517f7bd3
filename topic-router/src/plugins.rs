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


//! Bundled router plugins.

use crate::error::BoxError;
use crate::observability::events;
use crate::router::Router;
use tracing::{info, warn};

const COMPONENT: &str = "signals_handler";

/// Closes the router when the process receives Ctrl-C.
///
/// The listener task ends together with the router.
///
/// ```no_run
/// use topic_router::{plugins, Router, RouterConfig};
/// use tokio_util::sync::CancellationToken;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let router = Router::new(RouterConfig::default());
/// router.add_plugin(plugins::signals_handler()).unwrap();
/// router.run(CancellationToken::new()).await.unwrap();
/// # });
/// ```
pub fn signals_handler() -> impl FnOnce(&Router) -> Result<(), BoxError> + Send + 'static {
    |router: &Router| {
        let closer = router.closer();
        tokio::spawn(async move {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => match signal {
                    Ok(()) => {
                        info!(
                            event = events::SIGNAL_RECEIVED,
                            component = COMPONENT,
                            signal = "ctrl_c",
                            "closing router"
                        );
                        closer.close().await;
                    }
                    Err(err) => warn!(
                        event = events::SIGNAL_LISTEN_FAILED,
                        component = COMPONENT,
                        err = %err,
                        "unable to listen for ctrl_c"
                    ),
                },
                _ = closer.closed() => {}
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::signals_handler;
    use crate::{Router, RouterConfig};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn installs_without_blocking_router_shutdown() {
        let router = Router::new(RouterConfig::default());
        router
            .add_plugin(signals_handler())
            .expect("plugin is registered");
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        tokio::time::timeout(Duration::from_secs(2), router.run(shutdown))
            .await
            .expect("run should return")
            .expect("run should succeed");
        assert!(router.is_closed());
    }
}
