//! Per-connection bridge between a WebSocket and a room's channels.
//!
//! One bridge wraps one accepted connection and runs two independent loops:
//! outbound (room queue → socket) and inbound (socket → room broadcast).
//! Whichever loop finishes first aborts the other, so neither outlives the
//! connection.

use axum::extract::ws::{Message as WsFrame, WebSocket};
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::common::time::now_millis;

use super::{
    message::ChatMessage,
    room::{Member, OUTBOUND_BUFFER, RoomClosed, RoomHandle, Unregister},
};

/// Identity of one accepted connection. `conn_id` is unique per connection,
/// while `member_id` is the stable identity a reconnect reuses.
pub struct Bridge {
    pub conn_id: Uuid,
    pub room_id: String,
    pub member_id: String,
    pub username: String,
}

impl Bridge {
    pub fn new(room_id: &str, member_id: &str, username: &str) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            room_id: room_id.to_string(),
            member_id: member_id.to_string(),
            username: username.to_string(),
        }
    }

    /// Register this connection with the room and announce the join.
    ///
    /// Returns the receiving half of the bounded outbound queue; the sending
    /// half now lives in the room's membership map. The join notice goes
    /// through the room's broadcast input after registration, so the joiner
    /// receives its own notice.
    pub async fn attach(&self, room: &RoomHandle) -> Result<mpsc::Receiver<ChatMessage>, RoomClosed> {
        let (sender, receiver) = mpsc::channel(OUTBOUND_BUFFER);
        room.register(Member {
            conn_id: self.conn_id,
            member_id: self.member_id.clone(),
            username: self.username.clone(),
            connected_at: now_millis(),
            sender,
        })?;
        room.broadcast(ChatMessage::joined(&self.room_id, &self.username))
            .await?;
        Ok(receiver)
    }

    /// Drive the connection until it terminates.
    ///
    /// Spawns the outbound and inbound loops as independent tasks; whichever
    /// finishes first aborts the other. The slot is handed back to the room
    /// here, after both loops are down, never inside them: the outbound loop
    /// can finish first (write failure on a dead peer while the read is still
    /// parked), and an unregister living in the aborted inbound task would be
    /// lost, leaking the member. The room's conn-id guard makes the send
    /// idempotent, so the eviction and replacement cases stay safe.
    pub async fn run(
        self,
        socket: WebSocket,
        room: RoomHandle,
        outbound: mpsc::Receiver<ChatMessage>,
    ) {
        let (sink, stream) = socket.split();

        let mut send_task = tokio::spawn(outbound_loop(sink, outbound, self.conn_id));
        let mut recv_task = tokio::spawn(inbound_loop(
            stream,
            room.clone(),
            self.room_id.clone(),
            self.username.clone(),
            self.conn_id,
        ));

        tokio::select! {
            _ = &mut recv_task => send_task.abort(),
            _ = &mut send_task => recv_task.abort(),
        }

        let _ = room.unregister(Unregister {
            member_id: self.member_id.clone(),
            conn_id: self.conn_id,
            username: self.username.clone(),
        });

        tracing::info!(
            room_id = %self.room_id,
            member_id = %self.member_id,
            conn_id = %self.conn_id,
            "connection closed"
        );
    }
}

/// Outbound loop: take the next message from the queue and write it to the
/// socket. Ends when the queue closes (the room dropped our sender) or the
/// write fails.
async fn outbound_loop(
    mut sink: SplitSink<WebSocket, WsFrame>,
    mut outbound: mpsc::Receiver<ChatMessage>,
    conn_id: Uuid,
) {
    while let Some(message) = outbound.recv().await {
        let text = match serde_json::to_string(&message) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(%conn_id, "failed to serialize outbound message: {e}");
                continue;
            }
        };
        if let Err(e) = sink.send(WsFrame::Text(text.into())).await {
            tracing::debug!(%conn_id, "websocket write failed: {e}");
            break;
        }
    }
    let _ = sink.close().await;
}

/// Inbound loop: read text frames, wrap them as chat messages tagged with
/// this bridge's room and username, and submit them to the room's broadcast
/// input. Ends on transport error or close; [`Bridge::run`] then hands the
/// slot back to the room.
async fn inbound_loop(
    mut stream: SplitStream<WebSocket>,
    room: RoomHandle,
    room_id: String,
    username: String,
    conn_id: Uuid,
) {
    loop {
        let frame = match stream.next().await {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                tracing::debug!(%conn_id, "websocket read failed: {e}");
                break;
            }
            None => break,
        };

        match frame {
            WsFrame::Text(text) => {
                let message = ChatMessage::new(text.as_str(), &room_id, &username);
                if room.broadcast(message).await.is_err() {
                    // Room loop is gone; nothing left to deliver to.
                    break;
                }
            }
            WsFrame::Close(_) => {
                tracing::debug!(%conn_id, "client requested close");
                break;
            }
            // Ping/pong is answered by axum itself; binary frames are not
            // part of the wire protocol.
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::room::Room;

    #[tokio::test]
    async fn test_attach_registers_and_announces_join() {
        // given: a room with one existing member
        let room = Room::spawn("r1", "general");
        let (tx, mut existing) = mpsc::channel(8);
        room.register(Member::new("u1", "alice", tx)).unwrap();

        // when: a bridge for a second member attaches
        let bridge = Bridge::new("r1", "u2", "bob");
        let mut outbound = bridge.attach(&room).await.unwrap();

        // then: both the existing member and the joiner see the notice, and
        // the membership contains both
        let notice = ChatMessage::joined("r1", "bob");
        assert_eq!(existing.recv().await.unwrap(), notice);
        assert_eq!(outbound.recv().await.unwrap(), notice);

        let mut ids: Vec<String> = room
            .members()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["u1", "u2"]);
    }

    #[tokio::test]
    async fn test_attach_fails_when_room_is_gone() {
        // given: a room that has been shut down
        let room = Room::spawn("r1", "general");
        room.shutdown();
        // Wait for the loop to actually exit.
        while room.members().await.is_ok() {
            tokio::task::yield_now().await;
        }

        // when / then:
        let bridge = Bridge::new("r1", "u1", "alice");
        assert!(bridge.attach(&room).await.is_err());
    }
}
