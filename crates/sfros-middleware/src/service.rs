//! Trigger-style services.
//!
//! A node owns a [`ServiceServer`] and answers each [`ServiceCall`] with a
//! [`TriggerResponse`].  Callers hold a cheap, cloneable [`ServiceClient`].
//! Requests are delivered in order over a bounded Tokio `mpsc` channel; each
//! carries a `oneshot` sender for its reply.
//!
//! | Service | Request |
//! |---|---|
//! | `pause_simulation` | [`ServiceRequest::PauseSimulation`] |
//! | `resume_simulation` | [`ServiceRequest::ResumeSimulation`] |
//! | `step_simulation` | [`ServiceRequest::StepSimulation`] |
//! | `tick_simulation` | [`ServiceRequest::TickSimulation`] |
//! | `set_jerlov` | [`ServiceRequest::SetJerlov`] |
//! | `enable_currents` | [`ServiceRequest::EnableCurrents`] |
//! | `disable_currents` | [`ServiceRequest::DisableCurrents`] |
//! | `respawn_robot` | [`ServiceRequest::RespawnRobot`] |

use std::fmt;

use sfros_types::SimError;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Default number of queued, unanswered calls before callers wait.
const DEFAULT_CAPACITY: usize = 32;

/// Identity of a service, independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    PauseSimulation,
    ResumeSimulation,
    StepSimulation,
    TickSimulation,
    SetJerlov,
    EnableCurrents,
    DisableCurrents,
    RespawnRobot,
}

impl ServiceKind {
    /// Every service, in advertisement order.
    pub const ALL: [ServiceKind; 8] = [
        ServiceKind::PauseSimulation,
        ServiceKind::ResumeSimulation,
        ServiceKind::StepSimulation,
        ServiceKind::TickSimulation,
        ServiceKind::SetJerlov,
        ServiceKind::EnableCurrents,
        ServiceKind::DisableCurrents,
        ServiceKind::RespawnRobot,
    ];

    /// Wire name of the service.
    pub fn name(self) -> &'static str {
        match self {
            ServiceKind::PauseSimulation => "pause_simulation",
            ServiceKind::ResumeSimulation => "resume_simulation",
            ServiceKind::StepSimulation => "step_simulation",
            ServiceKind::TickSimulation => "tick_simulation",
            ServiceKind::SetJerlov => "set_jerlov",
            ServiceKind::EnableCurrents => "enable_currents",
            ServiceKind::DisableCurrents => "disable_currents",
            ServiceKind::RespawnRobot => "respawn_robot",
        }
    }

    /// Reverse of [`name`][Self::name].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A request addressed to one of the simulator services.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceRequest {
    PauseSimulation,
    ResumeSimulation,
    StepSimulation,
    TickSimulation,
    /// Set the ocean's optical water type (Jerlov scale normalised to `[0, 1]`).
    SetJerlov { jerlov: f32 },
    EnableCurrents,
    DisableCurrents,
    /// Teleport a robot to a new origin at the next simulation step.
    RespawnRobot {
        name: String,
        position: [f64; 3],
        /// Quaternion as `[x, y, z, w]`.
        orientation: [f64; 4],
    },
}

impl ServiceRequest {
    pub fn kind(&self) -> ServiceKind {
        match self {
            ServiceRequest::PauseSimulation => ServiceKind::PauseSimulation,
            ServiceRequest::ResumeSimulation => ServiceKind::ResumeSimulation,
            ServiceRequest::StepSimulation => ServiceKind::StepSimulation,
            ServiceRequest::TickSimulation => ServiceKind::TickSimulation,
            ServiceRequest::SetJerlov { .. } => ServiceKind::SetJerlov,
            ServiceRequest::EnableCurrents => ServiceKind::EnableCurrents,
            ServiceRequest::DisableCurrents => ServiceKind::DisableCurrents,
            ServiceRequest::RespawnRobot { .. } => ServiceKind::RespawnRobot,
        }
    }
}

/// Outcome of a service call.  Failures are reported in-band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerResponse {
    pub success: bool,
    pub message: String,
}

impl TriggerResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// A request waiting for its answer.
#[derive(Debug)]
pub struct ServiceCall {
    pub request: ServiceRequest,
    reply: oneshot::Sender<TriggerResponse>,
}

impl ServiceCall {
    /// Send `response` back to the caller.  A caller that stopped waiting is
    /// not an error.
    pub fn respond(self, response: TriggerResponse) {
        let service = self.request.kind();
        if self.reply.send(response).is_err() {
            debug!(%service, "service caller went away before the reply");
        }
    }
}

/// Create a connected client/server pair.
pub fn channel() -> (ServiceClient, ServiceServer) {
    let (sender, receiver) = mpsc::channel(DEFAULT_CAPACITY);
    (ServiceClient { sender }, ServiceServer { receiver })
}

/// Caller side of the simulator services.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    sender: mpsc::Sender<ServiceCall>,
}

impl ServiceClient {
    /// Send `request` and wait for the node's answer.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Channel`] when the node is no longer serving.
    pub async fn call(&self, request: ServiceRequest) -> Result<TriggerResponse, SimError> {
        let (reply, response) = oneshot::channel();
        let service = request.kind();
        self.sender
            .send(ServiceCall { request, reply })
            .await
            .map_err(|_| SimError::Channel(format!("service '{service}' is not being served")))?;
        response
            .await
            .map_err(|_| SimError::Channel(format!("service '{service}' dropped the call")))
    }
}

/// Node side of the simulator services.
#[derive(Debug)]
pub struct ServiceServer {
    receiver: mpsc::Receiver<ServiceCall>,
}

impl ServiceServer {
    /// Wait for the next call.  Returns `None` once every client is gone.
    pub async fn recv(&mut self) -> Option<ServiceCall> {
        self.receiver.recv().await
    }
}
