//! Room actor: membership and broadcast fan-out.
//!
//! Each room runs a single event loop task that exclusively owns the
//! membership map. All mutation flows through the room's channels, so the map
//! itself needs no locking. The loop never awaits a member's outbound queue:
//! delivery uses `try_send`, and a full queue drops the message for that
//! member only, so one slow consumer cannot stall fan-out to the rest.

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::common::time::now_millis;

use super::message::ChatMessage;

/// Capacity of a room's broadcast input. Inbound connection loops block on
/// this when the room falls behind, which backpressures their reads.
pub const BROADCAST_BUFFER: usize = 64;

/// Capacity of each member's outbound queue.
pub const OUTBOUND_BUFFER: usize = 64;

/// A registered room member: identity plus the sending half of its bounded
/// outbound queue. Dropping the sender closes the queue, which is the only
/// shutdown signal the member's writer loop gets.
pub struct Member {
    pub conn_id: Uuid,
    pub member_id: String,
    pub username: String,
    pub connected_at: i64,
    pub sender: mpsc::Sender<ChatMessage>,
}

impl Member {
    pub fn new(member_id: &str, username: &str, sender: mpsc::Sender<ChatMessage>) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            member_id: member_id.to_string(),
            username: username.to_string(),
            connected_at: now_millis(),
            sender,
        }
    }
}

/// Snapshot of one member, taken by the room loop itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub id: String,
    pub username: String,
    pub connected_at: i64,
}

/// Request to remove a member. `conn_id` must match the registered member's
/// connection: a bridge that was replaced by a reconnect (last writer wins on
/// `member_id`) must not evict its replacement during its own teardown.
pub struct Unregister {
    pub member_id: String,
    pub conn_id: Uuid,
    pub username: String,
}

enum Control {
    Shutdown,
    ListMembers(oneshot::Sender<Vec<MemberInfo>>),
}

/// The room's event loop has stopped and can no longer accept events.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("room event loop has stopped")]
pub struct RoomClosed;

/// Cloneable handle to a running room event loop.
///
/// Held by the hub and by every bridge attached to the room. The loop exits
/// when it receives [`RoomHandle::shutdown`] or when every handle is gone.
#[derive(Clone, Debug)]
pub struct RoomHandle {
    pub id: String,
    pub name: String,
    pub created_at: i64,
    register_tx: mpsc::UnboundedSender<Member>,
    unregister_tx: mpsc::UnboundedSender<Unregister>,
    broadcast_tx: mpsc::Sender<ChatMessage>,
    control_tx: mpsc::UnboundedSender<Control>,
}

impl RoomHandle {
    /// Submit a member for registration. Processed before any broadcast
    /// submitted afterwards, so a joiner always sees its own join notice.
    pub fn register(&self, member: Member) -> Result<(), RoomClosed> {
        self.register_tx.send(member).map_err(|_| RoomClosed)
    }

    /// Submit a removal request. Idempotent at the loop: removing an absent
    /// or already-replaced member is a no-op.
    pub fn unregister(&self, request: Unregister) -> Result<(), RoomClosed> {
        self.unregister_tx.send(request).map_err(|_| RoomClosed)
    }

    /// Enqueue a message for fan-out to every current member. Suspends while
    /// the room's broadcast input is full.
    pub async fn broadcast(&self, message: ChatMessage) -> Result<(), RoomClosed> {
        self.broadcast_tx
            .send(message)
            .await
            .map_err(|_| RoomClosed)
    }

    /// Snapshot the current membership.
    pub async fn members(&self) -> Result<Vec<MemberInfo>, RoomClosed> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.control_tx
            .send(Control::ListMembers(reply_tx))
            .map_err(|_| RoomClosed)?;
        reply_rx.await.map_err(|_| RoomClosed)
    }

    /// Ask the event loop to exit. Closes every member's outbound queue,
    /// which tears down all attached bridges. Safe to call more than once.
    pub fn shutdown(&self) {
        let _ = self.control_tx.send(Control::Shutdown);
    }
}

/// Room state owned by the event loop task.
pub struct Room {
    id: String,
    name: String,
    members: HashMap<String, Member>,
}

impl Room {
    /// Start a room's event loop as an independent task and return a handle
    /// to it.
    pub fn spawn(id: &str, name: &str) -> RoomHandle {
        let (register_tx, register_rx) = mpsc::unbounded_channel();
        let (unregister_tx, unregister_rx) = mpsc::unbounded_channel();
        let (broadcast_tx, broadcast_rx) = mpsc::channel(BROADCAST_BUFFER);
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        let room = Room {
            id: id.to_string(),
            name: name.to_string(),
            members: HashMap::new(),
        };
        tokio::spawn(room.run(register_rx, unregister_rx, broadcast_rx, control_rx));

        RoomHandle {
            id: id.to_string(),
            name: name.to_string(),
            created_at: now_millis(),
            register_tx,
            unregister_tx,
            broadcast_tx,
            control_tx,
        }
    }

    /// The event loop. Selection is biased so that membership changes drain
    /// before message fan-out: a registration submitted before a broadcast is
    /// always applied first, even though the channels are buffered.
    async fn run(
        mut self,
        mut register_rx: mpsc::UnboundedReceiver<Member>,
        mut unregister_rx: mpsc::UnboundedReceiver<Unregister>,
        mut broadcast_rx: mpsc::Receiver<ChatMessage>,
        mut control_rx: mpsc::UnboundedReceiver<Control>,
    ) {
        tracing::info!(room_id = %self.id, room_name = %self.name, "room event loop started");

        loop {
            tokio::select! {
                biased;

                Some(member) = register_rx.recv() => self.handle_register(member),
                Some(request) = unregister_rx.recv() => self.handle_unregister(request),
                control = control_rx.recv() => match control {
                    Some(Control::ListMembers(reply)) => {
                        let _ = reply.send(self.member_snapshot());
                    }
                    // `None` means every handle is gone; nothing can reach
                    // this room anymore.
                    Some(Control::Shutdown) | None => break,
                },
                Some(message) = broadcast_rx.recv() => self.handle_broadcast(&message),
            }
        }

        // Dropping `self.members` drops every outbound sender, closing the
        // queues and stopping all attached writer loops.
        tracing::info!(
            room_id = %self.id,
            remaining_members = self.members.len(),
            "room event loop stopped"
        );
    }

    fn handle_register(&mut self, member: Member) {
        tracing::debug!(
            room_id = %self.id,
            member_id = %member.member_id,
            username = %member.username,
            "member registered"
        );
        if let Some(replaced) = self.members.insert(member.member_id.clone(), member) {
            // Last writer wins on member_id; the evicted sender drops here,
            // closing the old bridge's queue.
            tracing::warn!(
                room_id = %self.id,
                member_id = %replaced.member_id,
                "member re-registered, replacing existing connection"
            );
        }
    }

    fn handle_unregister(&mut self, request: Unregister) {
        let current = self.members.get(&request.member_id);
        let owns_slot = current.is_some_and(|m| m.conn_id == request.conn_id);
        if !owns_slot {
            // Already removed, or the slot now belongs to a newer connection.
            tracing::debug!(
                room_id = %self.id,
                member_id = %request.member_id,
                "unregister ignored: not the current member"
            );
            return;
        }

        self.members.remove(&request.member_id);
        tracing::info!(
            room_id = %self.id,
            member_id = %request.member_id,
            username = %request.username,
            "member unregistered"
        );

        // Fanned out directly rather than re-enqueued on our own bounded
        // broadcast input: a self-send from inside the loop can fill the
        // buffer and deadlock the loop. Removal has already happened, so the
        // leaver never sees its own notice.
        let notice = ChatMessage::left(&self.id, &request.username);
        self.handle_broadcast(&notice);
    }

    fn handle_broadcast(&self, message: &ChatMessage) {
        for member in self.members.values() {
            match member.sender.try_send(message.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    // Chosen capacity policy: drop for the slow member only.
                    tracing::warn!(
                        room_id = %self.id,
                        member_id = %member.member_id,
                        "outbound queue full, dropping message for member"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    // The bridge is gone; its unregister is in flight.
                    tracing::debug!(
                        room_id = %self.id,
                        member_id = %member.member_id,
                        "outbound queue closed, member teardown pending"
                    );
                }
            }
        }
    }

    fn member_snapshot(&self) -> Vec<MemberInfo> {
        self.members
            .values()
            .map(|m| MemberInfo {
                id: m.member_id.clone(),
                username: m.username.clone(),
                connected_at: m.connected_at,
            })
            .collect()
    }
}
