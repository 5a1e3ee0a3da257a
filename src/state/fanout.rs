use std::fmt;

use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::dto::events::ServerEvent;

/// Addressable notification channel subscribers join to receive events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Room {
    /// Personal room of a single member (`score:status`, `team:added`).
    User(Uuid),
    /// Shared room of a team (`score:new`).
    Team(Uuid),
    /// Activity-scoped broadcast room (`activity:change`, `timer:ended`, ...).
    Activity(Uuid),
    /// Global broadcast room (`feedback:new`).
    Broadcast,
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::User(id) => write!(f, "user:{id}"),
            Room::Team(id) => write!(f, "team:{id}"),
            Room::Activity(id) => write!(f, "activity:{id}"),
            Room::Broadcast => write!(f, "broadcast"),
        }
    }
}

/// Room-keyed publish/subscribe hub.
///
/// Each room is a bounded broadcast channel: delivery is at-most-once with no
/// backlog, a lagging subscriber skips the overwritten events and keeps
/// receiving, and a slow subscriber never blocks the publisher. Events
/// published to one room reach its subscribers in publish order; no ordering
/// holds across rooms.
pub struct FanoutHub {
    rooms: DashMap<Room, broadcast::Sender<ServerEvent>>,
    capacity: usize,
}

impl FanoutHub {
    /// Create a hub whose rooms buffer at most `capacity` undelivered events
    /// per subscriber.
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            capacity,
        }
    }

    /// Join a room, creating its channel on first use.
    ///
    /// The returned subscription owns the interest: dropping it releases the
    /// slot, and the empty room is pruned on a later publish. The map entry
    /// guard is held across channel creation and subscription so a concurrent
    /// prune cannot drop the channel in between.
    pub fn subscribe(&self, room: Room) -> RoomSubscription {
        let entry = self
            .rooms
            .entry(room.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        let receiver = entry.subscribe();
        drop(entry);

        RoomSubscription { room, receiver }
    }

    /// Send an event to every current subscriber of `room`, returning how many
    /// received it. A room nobody listens to swallows the event.
    pub fn publish(&self, room: &Room, event: ServerEvent) -> usize {
        let delivered = match self.rooms.get(room) {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        };

        if delivered == 0 {
            // remove_if holds the entry lock, so it cannot race a subscribe
            // that is about to attach to the same channel.
            self.rooms
                .remove_if(room, |_, sender| sender.receiver_count() == 0);
        }

        delivered
    }

    /// Number of rooms currently kept alive by at least one subscriber or an
    /// unpruned channel.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

/// Owned membership in a single room.
pub struct RoomSubscription {
    room: Room,
    receiver: broadcast::Receiver<ServerEvent>,
}

impl RoomSubscription {
    /// Room this subscription listens to.
    pub fn room(&self) -> &Room {
        &self.room
    }

    /// Wait for the next event. `Lagged` reports how many events were missed;
    /// callers are expected to continue receiving afterwards.
    pub async fn recv(&mut self) -> Result<ServerEvent, broadcast::error::RecvError> {
        self.receiver.recv().await
    }
}
