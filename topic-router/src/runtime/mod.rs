//! Runtime integration layer.
//!
//! Owns the handler loop task types, task spawning and loop-level panic
//! containment. Library code outside this layer names tasks only through the
//! `HandlerTasks` and `HandlerJoin` aliases.

pub(crate) mod worker_runtime;
