//! Editor websocket — pointer gestures and keyboard shortcuts for one
//! project.
//!
//! DESIGN
//! ======
//! Each connection owns exactly one [`Session`] (the pointer state machine).
//! The session is the connection's scoped resource: pointer-up returns it to
//! idle, a vanished element ends it, and every way the connection can close
//! releases it before the handler returns. The socket never holds a project
//! lock across an await on the network.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade (404 if the project is unknown)
//! 2. Client sends `pointer_down` / `pointer_move` / `pointer_up` /
//!    `key_down` messages, JSON tagged with `type`
//! 3. Server replies with `geometry` after samples that change geometry,
//!    `deleted` after a delete shortcut, `error` otherwise
//! 4. Close → session released

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::canvas::element::ElementId;
use crate::canvas::geometry::Viewport;
use crate::canvas::session::{self, KeyEvent, Session, SessionOp, SessionUpdate};
use crate::state::AppState;

// =============================================================================
// MESSAGES
// =============================================================================

/// One inbound editor message, tagged with `type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMsg {
    /// Begin a move or resize gesture on an element.
    PointerDown {
        element: ElementId,
        op: SessionOp,
        x: f64,
        y: f64,
        viewport_w: f64,
        viewport_h: f64,
    },
    /// One pointer sample while a gesture is active.
    PointerMove { x: f64, y: f64 },
    /// End the gesture.
    PointerUp,
    /// A keyboard event (Delete/Backspace shortcuts).
    KeyDown {
        key: String,
        #[serde(default)]
        in_text_input: bool,
    },
}

/// One outbound editor message, tagged with `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMsg {
    /// The gesture changed an element's geometry.
    Geometry { element: ElementId, x: f64, y: f64, width: f64, height: f64 },
    /// A delete shortcut removed the selected element.
    Deleted { element: ElementId, suppress_default: bool },
    /// The message could not be applied.
    Error { code: &'static str, message: String },
}

// =============================================================================
// UPGRADE
// =============================================================================

/// `GET /api/projects/:id/ws` — open the editor socket for one project.
pub async fn handle_ws(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    ws: WebSocketUpgrade,
) -> Response {
    {
        let projects = state.projects.read().await;
        if !projects.contains_key(&project_id) {
            return (StatusCode::NOT_FOUND, "unknown project").into_response();
        }
    }
    ws.on_upgrade(move |socket| run_ws(socket, state, project_id))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, project_id: Uuid) {
    let mut session = Session::new();
    info!(%project_id, "ws: editor connected");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                let replies = process_message(&state, project_id, &mut session, &text).await;
                let mut closed = false;
                for reply in replies {
                    if send_msg(&mut socket, &reply).await.is_err() {
                        closed = true;
                        break;
                    }
                }
                if closed {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    // The connection owns the session: release it on every exit path.
    session.pointer_up();
    info!(%project_id, "ws: editor disconnected");
}

async fn send_msg(socket: &mut WebSocket, msg: &ServerMsg) -> Result<(), axum::Error> {
    let text = serde_json::to_string(msg)
        .map_err(|e| axum::Error::new(std::io::Error::other(e)))?;
    socket.send(Message::Text(text.into())).await
}

// =============================================================================
// MESSAGE DISPATCH
// =============================================================================

/// Parse and apply one inbound text message, returning replies for the
/// sender. Separated from the transport so tests can drive the gesture
/// machine without a live socket.
async fn process_message(
    state: &AppState,
    project_id: Uuid,
    session: &mut Session,
    text: &str,
) -> Vec<ServerMsg> {
    let msg: ClientMsg = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(%project_id, error = %e, "ws: invalid inbound message");
            return vec![ServerMsg::Error {
                code: "E_BAD_MESSAGE",
                message: format!("invalid message: {e}"),
            }];
        }
    };

    match msg {
        ClientMsg::PointerDown { element, op, x, y, viewport_w, viewport_h } => {
            let projects = state.projects.read().await;
            let Some(project) = projects.get(&project_id) else {
                return vec![project_gone(project_id)];
            };
            let viewport = Viewport { width_px: viewport_w, height_px: viewport_h };
            if session.pointer_down(&project.doc, element, op, x, y, viewport) {
                vec![]
            } else {
                vec![ServerMsg::Error {
                    code: "E_POINTER_DOWN_REJECTED",
                    message: format!("cannot start gesture on element {element}"),
                }]
            }
        }
        ClientMsg::PointerMove { x, y } => {
            let mut projects = state.projects.write().await;
            let Some(project) = projects.get_mut(&project_id) else {
                session.pointer_up();
                return vec![project_gone(project_id)];
            };
            match session.pointer_move(&mut project.doc, x, y) {
                SessionUpdate::None => vec![],
                SessionUpdate::Geometry { id, x, y, width, height } => {
                    vec![ServerMsg::Geometry { element: id, x, y, width, height }]
                }
            }
        }
        ClientMsg::PointerUp => {
            session.pointer_up();
            vec![]
        }
        ClientMsg::KeyDown { key, in_text_input } => {
            let mut projects = state.projects.write().await;
            let Some(project) = projects.get_mut(&project_id) else {
                return vec![project_gone(project_id)];
            };
            let outcome = session::handle_key(&mut project.doc, &KeyEvent { key, in_text_input });
            match outcome.deleted {
                Some(element) => vec![ServerMsg::Deleted {
                    element,
                    suppress_default: outcome.suppress_default,
                }],
                None => vec![],
            }
        }
    }
}

fn project_gone(project_id: Uuid) -> ServerMsg {
    ServerMsg::Error {
        code: "E_PROJECT_NOT_FOUND",
        message: format!("project not found: {project_id}"),
    }
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
