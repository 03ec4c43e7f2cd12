//! [`SimulatorNode`] – one adapter served over the trigger services.
//!
//! The node owns the adapter and the server side of the service channel.
//! [`spin`][SimulatorNode::spin] interleaves periodic ticks with service
//! calls on a single task, so neither ever runs concurrently with the other.
//!
//! # Services
//!
//! | Service | Guard | Success message |
//! |---|---|---|
//! | `pause_simulation` | fails when stopped | `Simulation paused successfully.` |
//! | `resume_simulation` | fails when running | `Simulation resumed successfully.` |
//! | `step_simulation` | fails when running | `Simulation stepped successfully.` |
//! | `tick_simulation` | – | `Simulation ticked successfully.` |
//! | `set_jerlov` | value in `[0, 1]`, ocean | `Jerlov water type successfully set to <v>.` |
//! | `enable_currents` | ocean present | `Ocean current simulation enabled.` |
//! | `disable_currents` | ocean present | `Ocean current simulation disabled.` |
//! | `respawn_robot` | moving entity with that name | `Robot respawned.` |
//!
//! The headless node offers neither `tick_simulation` nor `set_jerlov`.

use std::time::Duration;

use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion};
use sfros_middleware::ShutdownSignal;
use sfros_middleware::service::{
    self, ServiceClient, ServiceKind, ServiceRequest, ServiceServer, TriggerResponse,
};
use sfros_types::{SimError, SimulationState};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use crate::app::{SimulationApp, TickOutcome};

/// Tick period of the periodic driver (≈ 60 Hz).
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_micros(16_667);

/// Name, timer period and advertised services of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOptions {
    pub name: String,
    pub tick_period: Duration,
    pub services: Vec<ServiceKind>,
}

impl NodeOptions {
    /// Options for a node driving the windowed adapter: every service.
    pub fn graphical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tick_period: DEFAULT_TICK_PERIOD,
            services: ServiceKind::ALL.to_vec(),
        }
    }

    /// Options for a node driving the headless adapter: everything except
    /// tick and water type.
    pub fn console(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tick_period: DEFAULT_TICK_PERIOD,
            services: vec![
                ServiceKind::PauseSimulation,
                ServiceKind::ResumeSimulation,
                ServiceKind::StepSimulation,
                ServiceKind::EnableCurrents,
                ServiceKind::DisableCurrents,
                ServiceKind::RespawnRobot,
            ],
        }
    }

    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }
}

/// A simulator adapter bound to the service surface.
pub struct SimulatorNode<A: SimulationApp> {
    options: NodeOptions,
    app: A,
    server: ServiceServer,
    shutdown: ShutdownSignal,
}

impl<A: SimulationApp> SimulatorNode<A> {
    /// Start `app` and advertise the services listed in `options`.
    ///
    /// Returns the node together with a client for its services.
    ///
    /// # Errors
    ///
    /// Whatever the adapter's startup returns; the node is not created.
    pub fn new(
        options: NodeOptions,
        mut app: A,
        shutdown: ShutdownSignal,
    ) -> Result<(Self, ServiceClient), SimError> {
        if options.tick_period.is_zero() {
            return Err(SimError::InvalidArgument("tick period must be non-zero".to_string()));
        }
        app.startup()?;

        let (client, server) = service::channel();
        let names: Vec<&str> = options.services.iter().map(|s| s.name()).collect();
        info!(
            node = %options.name,
            services = ?names,
            tick_period_us = options.tick_period.as_micros() as u64,
            "simulator node started"
        );
        Ok((
            Self {
                options,
                app,
                server,
                shutdown,
            },
            client,
        ))
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut A {
        &mut self.app
    }

    /// Whether this node answers `kind`.
    pub fn advertises(&self, kind: ServiceKind) -> bool {
        self.options.services.contains(&kind)
    }

    /// Answer one service request.  Failures are reported in the response.
    #[instrument(skip(self), fields(node = %self.options.name))]
    pub fn handle_request(&mut self, request: ServiceRequest) -> TriggerResponse {
        let kind = request.kind();
        let response = if self.advertises(kind) {
            self.dispatch(request)
        } else {
            TriggerResponse::fail(format!("Service '{kind}' is not available on this node."))
        };

        if response.success {
            debug!(service = %kind, message = %response.message, "service handled");
        } else {
            warn!(service = %kind, message = %response.message, "service rejected");
        }
        response
    }

    fn dispatch(&mut self, request: ServiceRequest) -> TriggerResponse {
        match request {
            ServiceRequest::PauseSimulation => {
                if self.app.state() == SimulationState::Stopped {
                    return TriggerResponse::fail("Simulation is not running.");
                }
                self.app.pause();
                TriggerResponse::ok("Simulation paused successfully.")
            }
            ServiceRequest::ResumeSimulation => {
                if self.app.state() == SimulationState::Running {
                    return TriggerResponse::fail("Simulation is already running.");
                }
                self.app.resume();
                TriggerResponse::ok("Simulation resumed successfully.")
            }
            ServiceRequest::StepSimulation => {
                if self.app.state() == SimulationState::Running {
                    return TriggerResponse::fail(
                        "Simulation is already running, please stop before stepping.",
                    );
                }
                match self.app.step() {
                    Ok(()) => TriggerResponse::ok("Simulation stepped successfully."),
                    Err(e) => TriggerResponse::fail(format!("Simulation step failed: {e}")),
                }
            }
            ServiceRequest::TickSimulation => match self.app.tick() {
                Ok(_) => TriggerResponse::ok("Simulation ticked successfully."),
                Err(e) => TriggerResponse::fail(format!("Simulation tick failed: {e}")),
            },
            ServiceRequest::SetJerlov { jerlov } => {
                if !(0.0..=1.0).contains(&jerlov) {
                    return TriggerResponse::fail(
                        "Invalid Jerlov water type. Must be between 0 and 1.",
                    );
                }
                match self.app.simulation_manager_mut().ocean_mut() {
                    Some(ocean) => {
                        ocean.set_water_type(jerlov);
                        TriggerResponse::ok(format!(
                            "Jerlov water type successfully set to {jerlov:.2}."
                        ))
                    }
                    None => TriggerResponse::fail("Ocean not enabled in the scenario."),
                }
            }
            ServiceRequest::EnableCurrents => match self.app.simulation_manager_mut().ocean_mut() {
                Some(ocean) => {
                    ocean.enable_currents();
                    TriggerResponse::ok("Ocean current simulation enabled.")
                }
                None => TriggerResponse::fail("Ocean not enabled in the scenario."),
            },
            ServiceRequest::DisableCurrents => match self.app.simulation_manager_mut().ocean_mut() {
                Some(ocean) => {
                    ocean.disable_currents();
                    TriggerResponse::ok("Ocean current simulation disabled.")
                }
                None => TriggerResponse::fail("Ocean not enabled in the scenario."),
            },
            ServiceRequest::RespawnRobot {
                name,
                position,
                orientation,
            } => {
                let Some(origin) = respawn_origin(position, orientation) else {
                    return TriggerResponse::fail("Invalid respawn origin.");
                };
                if self.app.simulation_manager_mut().respawn_robot(&name, origin) {
                    TriggerResponse::ok("Robot respawned.")
                } else {
                    TriggerResponse::fail("Robot not found.")
                }
            }
        }
    }

    /// Drive the adapter until shutdown is requested or a tick reports
    /// [`TickOutcome::Finished`], answering service calls in between.
    ///
    /// On exit the adapter is shut down and runtime shutdown is requested.
    /// The adapter is handed back to the caller.
    ///
    /// # Errors
    ///
    /// A failing tick ends the loop and is returned after the adapter has
    /// been shut down.
    pub async fn spin(mut self) -> Result<A, SimError> {
        let mut timer = tokio::time::interval(self.options.tick_period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let shutdown = self.shutdown.clone();
        let mut serving = true;

        let result = loop {
            tokio::select! {
                biased;

                _ = shutdown.wait() => {
                    info!(node = %self.options.name, "shutdown requested; leaving spin");
                    break Ok(());
                }

                call = self.server.recv(), if serving => match call {
                    Some(call) => {
                        let response = self.handle_request(call.request.clone());
                        call.respond(response);
                    }
                    None => {
                        debug!(node = %self.options.name, "all service clients gone");
                        serving = false;
                    }
                },

                _ = timer.tick() => match self.app.tick() {
                    Ok(TickOutcome::Running) => {}
                    Ok(TickOutcome::Finished) => {
                        info!(node = %self.options.name, "simulation finished; leaving spin");
                        break Ok(());
                    }
                    Err(e) => break Err(e),
                },
            }
        };

        self.app.shutdown();
        self.shutdown.request("simulator node stopped");
        result.map(|()| self.app)
    }
}

/// Pose from a position and an `[x, y, z, w]` quaternion.  `None` when a
/// component is not finite or the quaternion has no direction.
fn respawn_origin(position: [f64; 3], orientation: [f64; 4]) -> Option<Isometry3<f64>> {
    if !position.iter().chain(&orientation).all(|v| v.is_finite()) {
        return None;
    }
    let [x, y, z] = position;
    let [qx, qy, qz, qw] = orientation;
    let rotation = UnitQuaternion::try_new(Quaternion::new(qw, qx, qy, qz), 1e-9)?;
    Some(Isometry3::from_parts(Translation3::new(x, y, z), rotation))
}
