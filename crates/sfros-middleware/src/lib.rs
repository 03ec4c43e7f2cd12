//! `sfros-middleware` – Runtime Surface
//!
//! The pieces of the middleware runtime a simulator node talks to, without
//! caring what the simulator does.
//!
//! # Modules
//!
//! - [`shutdown`] – [`ShutdownSignal`]: one-way, process-wide request to stop
//!   spinning.  Raised by the windowed application when the simulation
//!   finishes and by the Ctrl-C handler.
//! - [`service`] – trigger-style request/response endpoints
//!   ([`ServiceClient`] / [`ServiceServer`]) carrying [`ServiceRequest`]s and
//!   answering with a [`TriggerResponse`].
//! - [`bridge`] – [`ServiceBridge`]: WebSocket endpoint that forwards
//!   rosbridge `call_service` messages to a [`ServiceClient`].

pub mod bridge;
pub mod service;
pub mod shutdown;

pub use bridge::ServiceBridge;
pub use service::{
    ServiceCall, ServiceClient, ServiceKind, ServiceRequest, ServiceServer, TriggerResponse,
};
pub use shutdown::ShutdownSignal;
