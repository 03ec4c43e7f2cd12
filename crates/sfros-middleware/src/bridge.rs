//! WebSocket service bridge.
//!
//! [`ServiceBridge`] lets processes outside the node reach the simulator
//! services.  It speaks the `call_service` subset of the rosbridge JSON
//! protocol:
//!
//! ```json
//! {"op":"call_service","id":"c1","service":"/pause_simulation","args":{}}
//! ```
//!
//! and answers each call with
//!
//! ```json
//! {"op":"service_response","id":"c1","service":"/pause_simulation",
//!  "values":{"success":true,"message":"Simulation paused."},"result":true}
//! ```
//!
//! `result` is `false` when the call never reached the node (unknown or
//! unadvertised service, malformed arguments, node gone); `values` is then
//! the error text.  Service names match on their last path segment, so
//! `/stonefish_simulator/step_simulation` and `step_simulation` are the same
//! service.  Other ops are ignored.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use sfros_types::SimError;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info};

use crate::service::{ServiceClient, ServiceKind, ServiceRequest};

/// Forwards rosbridge `call_service` messages to a [`ServiceClient`].
#[derive(Debug, Clone)]
pub struct ServiceBridge {
    client: ServiceClient,
    advertised: Vec<ServiceKind>,
}

impl ServiceBridge {
    /// Bridge to `client`, exposing only the `advertised` services.
    pub fn new(client: ServiceClient, advertised: Vec<ServiceKind>) -> Self {
        Self { client, advertised }
    }

    // ────────────────────────────────────────────────────────────────────
    // WebSocket server
    // ────────────────────────────────────────────────────────────────────

    /// Bind `addr` and serve until the task is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Channel`] if the listener cannot be bound.
    pub async fn run_ws_server(self, addr: SocketAddr) -> Result<(), SimError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| SimError::Channel(format!("ws bind error on {addr}: {e}")))?;
        self.serve(listener).await
    }

    /// Accept clients on an already bound `listener`.
    pub async fn serve(self, listener: TcpListener) -> Result<(), SimError> {
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "service bridge listening");
        }
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    let bridge = self.clone();
                    tokio::spawn(async move {
                        if let Err(e) = bridge.handle_ws_client(stream, peer).await {
                            error!(peer = %peer, error = %e, "ws client error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "ws accept error");
                }
            }
        }
    }

    async fn handle_ws_client(&self, stream: TcpStream, peer: SocketAddr) -> Result<(), SimError> {
        let ws_stream = accept_async(stream)
            .await
            .map_err(|e| SimError::Channel(format!("ws handshake from {peer}: {e}")))?;
        debug!(%peer, "bridge client connected");

        let (mut ws_tx, mut ws_rx) = ws_stream.split();
        while let Some(msg) = ws_rx.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Some(reply) = self.handle_incoming_ws_message(text.as_str()).await
                        && ws_tx.send(Message::Text(reply.into())).await.is_err()
                    {
                        break;
                    }
                }
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
        debug!(%peer, "bridge client disconnected");
        Ok(())
    }

    /// Answer one text frame.  Returns `None` for frames that are not
    /// `call_service` requests.
    pub async fn handle_incoming_ws_message(&self, text: &str) -> Option<String> {
        let Ok(json) = serde_json::from_str::<Value>(text) else {
            return None;
        };
        if json.get("op").and_then(Value::as_str) != Some("call_service") {
            return None;
        }

        let service = json.get("service").and_then(Value::as_str).unwrap_or("");
        let id = json.get("id");

        let request = match self.parse_call(service, json.get("args")) {
            Ok(request) => request,
            Err(reason) => return Some(service_response(service, id, json!(reason), false)),
        };

        let kind = request.kind();
        match self.client.call(request).await {
            Ok(response) => {
                debug!(service = %kind, success = response.success, "bridged call answered");
                let values = json!({
                    "success": response.success,
                    "message": response.message,
                });
                Some(service_response(service, id, values, true))
            }
            Err(e) => Some(service_response(service, id, json!(e.to_string()), false)),
        }
    }

    fn parse_call(&self, service: &str, args: Option<&Value>) -> Result<ServiceRequest, String> {
        let name = service.rsplit('/').next().unwrap_or("");
        let kind = ServiceKind::from_name(name)
            .filter(|k| self.advertised.contains(k))
            .ok_or_else(|| format!("Service '{service}' is not advertised."))?;
        let arg = |key: &str| args.and_then(|a| a.get(key));

        let request = match kind {
            ServiceKind::PauseSimulation => ServiceRequest::PauseSimulation,
            ServiceKind::ResumeSimulation => ServiceRequest::ResumeSimulation,
            ServiceKind::StepSimulation => ServiceRequest::StepSimulation,
            ServiceKind::TickSimulation => ServiceRequest::TickSimulation,
            ServiceKind::EnableCurrents => ServiceRequest::EnableCurrents,
            ServiceKind::DisableCurrents => ServiceRequest::DisableCurrents,
            ServiceKind::SetJerlov => {
                let jerlov = arg("jerlov")
                    .and_then(Value::as_f64)
                    .ok_or("Missing numeric argument 'jerlov'.")?;
                ServiceRequest::SetJerlov {
                    jerlov: jerlov as f32,
                }
            }
            ServiceKind::RespawnRobot => {
                let name = arg("name")
                    .and_then(Value::as_str)
                    .ok_or("Missing string argument 'name'.")?;
                let origin = arg("origin");
                let position = origin.and_then(|o| o.get("position"));
                let orientation = origin.and_then(|o| o.get("orientation"));
                ServiceRequest::RespawnRobot {
                    name: name.to_string(),
                    position: [
                        component(position, "x", 0.0),
                        component(position, "y", 0.0),
                        component(position, "z", 0.0),
                    ],
                    orientation: [
                        component(orientation, "x", 0.0),
                        component(orientation, "y", 0.0),
                        component(orientation, "z", 0.0),
                        component(orientation, "w", 1.0),
                    ],
                }
            }
        };
        Ok(request)
    }
}

fn component(value: Option<&Value>, key: &str, default: f64) -> f64 {
    value
        .and_then(|v| v.get(key))
        .and_then(Value::as_f64)
        .unwrap_or(default)
}

fn service_response(service: &str, id: Option<&Value>, values: Value, result: bool) -> String {
    let mut reply = json!({
        "op": "service_response",
        "service": service,
        "values": values,
        "result": result,
    });
    if let Some(id) = id {
        reply["id"] = id.clone();
    }
    reply.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{self, ServiceServer, TriggerResponse};

    fn make_bridge(advertised: &[ServiceKind]) -> (ServiceBridge, ServiceServer) {
        let (client, server) = service::channel();
        (ServiceBridge::new(client, advertised.to_vec()), server)
    }

    /// Answer every call with its own service name.
    fn answer_all(mut server: ServiceServer) -> tokio::task::JoinHandle<Vec<ServiceRequest>> {
        tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(call) = server.recv().await {
                let name = call.request.kind().name();
                seen.push(call.request.clone());
                call.respond(TriggerResponse::ok(name));
            }
            seen
        })
    }

    fn parse(reply: &str) -> Value {
        serde_json::from_str(reply).unwrap()
    }

    #[tokio::test]
    async fn call_service_is_forwarded_and_answered() {
        let (bridge, server) = make_bridge(&ServiceKind::ALL);
        let node = answer_all(server);

        let reply = bridge
            .handle_incoming_ws_message(
                r#"{"op":"call_service","id":"c1","service":"/pause_simulation","args":{}}"#,
            )
            .await
            .expect("reply");
        let reply = parse(&reply);
        assert_eq!(reply["op"], "service_response");
        assert_eq!(reply["id"], "c1");
        assert_eq!(reply["service"], "/pause_simulation");
        assert_eq!(reply["result"], true);
        assert_eq!(reply["values"]["success"], true);
        assert_eq!(reply["values"]["message"], "pause_simulation");

        drop(bridge);
        assert_eq!(node.await.unwrap(), vec![ServiceRequest::PauseSimulation]);
    }

    #[tokio::test]
    async fn namespaced_service_names_match_last_segment() {
        let (bridge, server) = make_bridge(&ServiceKind::ALL);
        let node = answer_all(server);

        let reply = bridge
            .handle_incoming_ws_message(
                r#"{"op":"call_service","service":"/stonefish_simulator/step_simulation"}"#,
            )
            .await
            .expect("reply");
        assert_eq!(parse(&reply)["result"], true);

        drop(bridge);
        assert_eq!(node.await.unwrap(), vec![ServiceRequest::StepSimulation]);
    }

    #[tokio::test]
    async fn arguments_are_decoded() {
        let (bridge, server) = make_bridge(&ServiceKind::ALL);
        let node = answer_all(server);

        bridge
            .handle_incoming_ws_message(
                r#"{"op":"call_service","service":"set_jerlov","args":{"jerlov":0.5}}"#,
            )
            .await
            .expect("reply");
        bridge
            .handle_incoming_ws_message(
                r#"{"op":"call_service","service":"respawn_robot","args":{"name":"auv",
                    "origin":{"position":{"x":1.0,"y":2.0,"z":3.0},
                              "orientation":{"x":0.0,"y":0.0,"z":1.0,"w":0.0}}}}"#,
            )
            .await
            .expect("reply");
        bridge
            .handle_incoming_ws_message(
                r#"{"op":"call_service","service":"respawn_robot","args":{"name":"auv"}}"#,
            )
            .await
            .expect("reply");

        drop(bridge);
        let seen = node.await.unwrap();
        assert_eq!(
            seen,
            vec![
                ServiceRequest::SetJerlov { jerlov: 0.5 },
                ServiceRequest::RespawnRobot {
                    name: "auv".into(),
                    position: [1.0, 2.0, 3.0],
                    orientation: [0.0, 0.0, 1.0, 0.0],
                },
                ServiceRequest::RespawnRobot {
                    name: "auv".into(),
                    position: [0.0, 0.0, 0.0],
                    orientation: [0.0, 0.0, 0.0, 1.0],
                },
            ]
        );
    }

    #[tokio::test]
    async fn bad_calls_fail_without_reaching_the_node() {
        let (bridge, server) = make_bridge(&[ServiceKind::PauseSimulation]);
        let node = answer_all(server);

        for msg in [
            r#"{"op":"call_service","id":7,"service":"/set_jerlov","args":{"jerlov":0.1}}"#,
            r#"{"op":"call_service","service":"/reset_world"}"#,
        ] {
            let reply = parse(&bridge.handle_incoming_ws_message(msg).await.expect("reply"));
            assert_eq!(reply["result"], false);
            assert!(reply["values"].as_str().unwrap().contains("not advertised"));
        }

        let (all, server2) = make_bridge(&ServiceKind::ALL);
        drop(server2);
        let reply = all
            .handle_incoming_ws_message(r#"{"op":"call_service","service":"set_jerlov","args":{}}"#)
            .await
            .expect("reply");
        assert!(parse(&reply)["values"].as_str().unwrap().contains("jerlov"));

        drop(bridge);
        assert!(node.await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn call_fails_in_band_when_node_is_gone() {
        let (bridge, server) = make_bridge(&ServiceKind::ALL);
        drop(server);
        let reply = bridge
            .handle_incoming_ws_message(r#"{"op":"call_service","service":"pause_simulation"}"#)
            .await
            .expect("reply");
        let reply = parse(&reply);
        assert_eq!(reply["result"], false);
        assert!(reply.get("id").is_none());
    }

    #[tokio::test]
    async fn other_ops_and_garbage_are_ignored() {
        let (bridge, _server) = make_bridge(&ServiceKind::ALL);
        assert!(bridge.handle_incoming_ws_message("not json").await.is_none());
        assert!(
            bridge
                .handle_incoming_ws_message(r#"{"op":"subscribe","topic":"/odom"}"#)
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn websocket_client_reaches_the_node() {
        let (bridge, server) = make_bridge(&ServiceKind::ALL);
        let node = answer_all(server);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server_task = tokio::spawn(bridge.serve(listener));

        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .unwrap();
        let call = r#"{"op":"call_service","id":"r1","service":"/resume_simulation"}"#;
        ws.send(Message::Text(String::from(call).into())).await.unwrap();

        let reply = match ws.next().await {
            Some(Ok(Message::Text(text))) => parse(text.as_str()),
            other => panic!("unexpected frame: {other:?}"),
        };
        assert_eq!(reply["id"], "r1");
        assert_eq!(reply["values"]["message"], "resume_simulation");

        ws.close(None).await.unwrap();
        server_task.abort();
        let _ = server_task.await;
        assert_eq!(node.await.unwrap(), vec![ServiceRequest::ResumeSimulation]);
    }
}
