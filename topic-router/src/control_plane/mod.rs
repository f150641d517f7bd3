//! Control-plane layer.
//!
//! Owns router lifecycle transitions and the handler registry. This layer decides
//! whether configuration and run requests are legal; it never touches message flow.
//!
//! ```
//! use topic_router::{Router, RouterConfig, RouterError, RouterState};
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let router = Router::new(RouterConfig::default());
//! assert_eq!(router.state(), RouterState::Created);
//!
//! let shutdown = CancellationToken::new();
//! shutdown.cancel();
//! router.run(shutdown).await.unwrap();
//! assert_eq!(router.state(), RouterState::Closed);
//!
//! // A closed router never runs again.
//! assert!(matches!(
//!     router.run(CancellationToken::new()).await,
//!     Err(RouterError::AlreadyClosed)
//! ));
//! # });
//! ```

pub(crate) mod handler_registry;
pub(crate) mod lifecycle;
