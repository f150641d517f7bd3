use channel_pubsub::ChannelPubSub;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use topic_router::{Router, RouterConfig, RouterError};

pub(crate) const WAIT: Duration = Duration::from_secs(2);

pub(crate) fn make_router() -> (Arc<Router>, Arc<ChannelPubSub>) {
    integration_test_utils::init_logging();
    let config = RouterConfig::from_json5_str("{ close_timeout_ms: 2000 }")
        .expect("router config should parse");
    (
        Arc::new(Router::new(config)),
        Arc::new(ChannelPubSub::default()),
    )
}

pub(crate) fn spawn_run(
    router: &Arc<Router>,
    shutdown: CancellationToken,
) -> JoinHandle<Result<(), RouterError>> {
    let router = router.clone();
    tokio::spawn(async move { router.run(shutdown).await })
}

pub(crate) async fn wait_running(router: &Router) {
    tokio::time::timeout(WAIT, router.running().wait())
        .await
        .expect("router should reach running");
}

pub(crate) async fn assert_run_ok(run: JoinHandle<Result<(), RouterError>>) {
    tokio::time::timeout(WAIT, run)
        .await
        .expect("run should return")
        .expect("run task should not panic")
        .expect("run should succeed");
}
