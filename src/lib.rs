/// Settings loading (defaults, file, environment).
pub mod config;
/// Fixed-capacity request/reply correlation table.
pub mod correlation;
/// Publisher, subscription, service and client endpoints.
pub mod endpoint;
/// Message envelope and its self-describing wire format.
pub mod envelope;
/// Bridge-level error type aggregating component errors.
pub mod error;
/// Flexible logging (formatting, filters, sinks).
pub mod logging;
/// History QoS negotiation.
pub mod qos;
/// Bounded drop-oldest message queue.
pub mod queue;
/// Wall-clock timestamps.
pub mod time;
/// In-process transport session.
pub mod transport;
/// Wait-set aggregator and condition sources.
pub mod waitset;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Settings.
pub use config::Settings;
/// Correlation map and request identity.
pub use correlation::{CorrelationKey, CorrelationMap, RequestId};
/// Endpoints and their statistics.
pub use endpoint::{Client, MessageInfo, Publisher, Service, StatsSnapshot, Subscription};
/// Envelope types.
pub use envelope::{Envelope, Gid, GID_SIZE};
/// Errors and result types.
pub use error::{BridgeError, BridgeResult};
/// Logging entry point.
pub use logging::{init_logging, LoggingConfig, LoggingHandle};
/// QoS profile.
pub use qos::{History, QosProfile, DEFAULT_HISTORY_DEPTH};
/// Message queue.
pub use queue::{MessageQueue, QueuedMessage};
/// Transport.
pub use transport::{LoopbackSession, Query};
/// Waiting.
pub use waitset::{ConditionSource, GuardCondition, WaitSet, WaitSignal};
/// Component error types.
pub use zenbridge_error::{
    CorrelationError, EnvelopeError, ErrorExt, QosError, QueueError, StatusCode, WaitError,
};
