//! Canonical structured event names used across `topic-router`.

// Router lifecycle events.
pub const ROUTER_RUN_START: &str = "router_run_start";
pub const ROUTER_RUN_REJECTED: &str = "router_run_rejected";
pub const ROUTER_RUNNING: &str = "router_running";
pub const ROUTER_SHUTDOWN_SIGNAL: &str = "router_shutdown_signal";
pub const ROUTER_CLOSE_REQUESTED: &str = "router_close_requested";
pub const ROUTER_CLOSE_NOOP: &str = "router_close_noop";
pub const ROUTER_CLOSE_WAIT_TIMEOUT: &str = "router_close_wait_timeout";
pub const ROUTER_ALL_HANDLERS_STOPPED: &str = "router_all_handlers_stopped";
pub const ROUTER_SHUTDOWN_TIMEOUT: &str = "router_shutdown_timeout";
pub const ROUTER_CLOSED: &str = "router_closed";
pub const ROUTER_STARTUP_FAILED: &str = "router_startup_failed";

// Configuration events.
pub const HANDLER_ADD_OK: &str = "handler_add_ok";
pub const HANDLER_ADD_FAILED: &str = "handler_add_failed";
pub const MIDDLEWARE_ADD_OK: &str = "middleware_add_ok";
pub const MIDDLEWARE_ADD_IGNORED: &str = "middleware_add_ignored";
pub const PLUGIN_RUN_FAILED: &str = "plugin_run_failed";

// Handler loop events.
pub const HANDLER_SUBSCRIBE_START: &str = "handler_subscribe_start";
pub const HANDLER_SUBSCRIBE_OK: &str = "handler_subscribe_ok";
pub const HANDLER_SUBSCRIBE_FAILED: &str = "handler_subscribe_failed";
pub const HANDLER_LOOP_START: &str = "handler_loop_start";
pub const HANDLER_LOOP_STOP_REQUESTED: &str = "handler_loop_stop_requested";
pub const HANDLER_LOOP_STREAM_CLOSED: &str = "handler_loop_stream_closed";
pub const HANDLER_LOOP_STOPPED: &str = "handler_loop_stopped";
pub const HANDLER_LOOP_PANICKED: &str = "handler_loop_panicked";
pub const HANDLER_STOP_REQUESTED: &str = "handler_stop_requested";
pub const MESSAGE_RECEIVED: &str = "message_received";
pub const MESSAGE_PROCESSED: &str = "message_processed";
pub const MESSAGE_PROCESSING_FAILED: &str = "message_processing_failed";
pub const MESSAGE_HANDLER_PANICKED: &str = "message_handler_panicked";
pub const MESSAGE_PUBLISH_FAILED: &str = "message_publish_failed";
pub const SINK_OUTPUT_DISCARDED: &str = "sink_output_discarded";
pub const ACK_NOT_DELIVERED: &str = "ack_not_delivered";

// Bundled middleware events.
pub const HANDLER_PANIC_RECOVERED: &str = "handler_panic_recovered";
pub const HANDLER_RETRY_SCHEDULED: &str = "handler_retry_scheduled";
pub const HANDLER_RETRIES_EXHAUSTED: &str = "handler_retries_exhausted";
pub const HANDLER_TIMED_OUT: &str = "handler_timed_out";

// Runtime events.
pub const RUNTIME_SPAWN_OK: &str = "runtime_spawn_ok";
pub const SIGNAL_RECEIVED: &str = "signal_received";
pub const SIGNAL_LISTEN_FAILED: &str = "signal_listen_failed";
