//! HTTP and WebSocket handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, ws::WebSocketUpgrade},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::common::time::timestamp_to_rfc3339;

use super::{bridge::Bridge, error::ServiceError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub id: String,
    pub username: String,
    pub connected_at: String,
}

/// Identity supplied by the client when joining a room.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinQuery {
    pub user_id: String,
    pub username: String,
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let room = state.service.create_room(&request.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(RoomResponse {
            id: room.id,
            name: room.name,
            created_at: timestamp_to_rfc3339(room.created_at),
        }),
    ))
}

pub async fn list_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomResponse>> {
    let rooms = state
        .service
        .list_rooms()
        .await
        .into_iter()
        .map(|room| RoomResponse {
            id: room.id,
            name: room.name,
            created_at: timestamp_to_rfc3339(room.created_at),
        })
        .collect();
    Json(rooms)
}

pub async fn delete_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    state.service.delete_room(&room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<MemberResponse>>, ServiceError> {
    let members = state
        .service
        .list_members(&room_id)
        .await?
        .into_iter()
        .map(|member| MemberResponse {
            id: member.id,
            username: member.username,
            connected_at: timestamp_to_rfc3339(member.connected_at),
        })
        .collect();
    Ok(Json(members))
}

/// Upgrade a join request to a WebSocket and bridge it into the room.
///
/// Validation and room lookup happen before the upgrade, so a bad request is
/// rejected as plain HTTP (422/404) rather than a broken socket. Registration
/// happens after the upgrade succeeds: a connection that never completes the
/// handshake must not occupy a membership slot.
pub async fn join_room(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(query): Query<JoinQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let room = state
        .service
        .join_room(&room_id, &query.user_id, &query.username)
        .await?;

    tracing::info!(
        room_id = %room.id,
        member_id = %query.user_id,
        username = %query.username,
        "join request accepted, upgrading connection"
    );

    Ok(ws.on_upgrade(move |socket| async move {
        let bridge = Bridge::new(&room.id, &query.user_id, &query.username);
        match bridge.attach(&room).await {
            Ok(outbound) => bridge.run(socket, room, outbound).await,
            Err(_) => {
                // The room was deleted between lookup and upgrade; dropping
                // the socket here closes the connection.
                tracing::warn!(
                    room_id = %room.id,
                    member_id = %query.user_id,
                    "room closed before the connection could attach"
                );
            }
        }
    }))
}
