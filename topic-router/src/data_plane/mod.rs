//! Data-plane layer.
//!
//! Owns the per-handler message loop: pull a delivery, invoke the composed
//! processing function, publish outputs, settle the delivery. Lifecycle policy
//! stays in the control plane; this layer only observes its stop tokens.

pub(crate) mod handler_loop;
