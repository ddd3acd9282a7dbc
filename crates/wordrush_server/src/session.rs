//! Session protocol: applies client intents to rooms and fans out the results.
//!
//! Every intent follows the same discipline: resolve the connection's
//! binding, lock the target room, apply one [`Room`] transition, then
//! broadcast while the lock is still held. Holding the lock across the
//! broadcast keeps the event order seen by every member of a room equal to
//! the order in which the room was mutated.
//!
//! [`Room`]: wordrush_game::Room

use crate::connection::{Binding, ConnectionId, ConnectionManager};
use crate::registry::{RoomHandle, RoomRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::MutexGuard;
use tracing::{debug, info};
use wordrush_game::{
    AnswerOutcome, ClientMessage, GameError, LevelOutcome, PlayerId, PuzzleProvider, Room,
    RoomId, RoomRules, ServerMessage,
};

/// Shared state behind every connection handler.
pub struct GameSession {
    registry: Arc<RoomRegistry>,
    connections: Arc<ConnectionManager>,
    provider: Arc<dyn PuzzleProvider>,
    rules: RoomRules,
}

impl GameSession {
    pub fn new(
        registry: Arc<RoomRegistry>,
        connections: Arc<ConnectionManager>,
        provider: Arc<dyn PuzzleProvider>,
        rules: RoomRules,
    ) -> Self {
        Self {
            registry,
            connections,
            provider,
            rules,
        }
    }

    pub fn registry(&self) -> Arc<RoomRegistry> {
        self.registry.clone()
    }

    pub fn connections(&self) -> Arc<ConnectionManager> {
        self.connections.clone()
    }

    /// Applies one parsed intent on behalf of `connection_id`.
    pub async fn handle(
        &self,
        connection_id: ConnectionId,
        message: ClientMessage,
    ) -> Result<(), GameError> {
        match message {
            ClientMessage::Create { names } => self.create(connection_id, &names).await.map(|_| ()),
            ClientMessage::Join { room_id, name } => self
                .join(connection_id, &room_id, name.as_deref())
                .await
                .map(|_| ()),
            ClientMessage::Start => self.start(connection_id).await,
            ClientMessage::Answer { word } => self.answer(connection_id, &word).await,
            ClientMessage::Highlight {
                player_id,
                word,
                color,
            } => self.highlight(connection_id, &player_id, &word, &color).await,
            ClientMessage::NextLevel => self.next_level(connection_id).await,
            ClientMessage::Restart => self.restart(connection_id).await.map(|_| ()),
        }
    }

    /// Creates a room seeded with `names` and seats the caller in the first slot.
    pub async fn create(
        &self,
        connection_id: ConnectionId,
        names: &[String],
    ) -> Result<RoomId, GameError> {
        if self.connections.binding(connection_id).await.is_seated() {
            return Err(GameError::AlreadyBound);
        }

        let rules = self.rules.clone();
        let (room_id, handle) = self
            .registry
            .create(|id| Room::new(id, names, connection_id, rules))?;
        let room = handle.lock().await;

        let creator_slot = room.players().first().map(|p| p.id.clone());
        self.connections.bind(connection_id, room_id, creator_slot).await;

        let players = room.players().to_vec();
        self.connections
            .send_to_connection(
                connection_id,
                &ServerMessage::RoomCreated {
                    room_id,
                    players: players.clone(),
                },
            )
            .await;
        self.connections
            .broadcast(&room_id, &ServerMessage::PlayerUpdate { players })
            .await;

        info!(
            "🎲 Connection {} created room {} with {} slot(s)",
            connection_id,
            room_id,
            room.players().len()
        );
        Ok(room_id)
    }

    /// Seats the caller in the first free slot of an existing room.
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        room_id: &str,
        name: Option<&str>,
    ) -> Result<PlayerId, GameError> {
        if self.connections.binding(connection_id).await.is_seated() {
            return Err(GameError::AlreadyBound);
        }

        let room_id: RoomId = room_id
            .parse()
            .map_err(|_| GameError::RoomNotFound(room_id.to_string()))?;
        let handle = self.registry.get(&room_id)?;
        let mut room = self.lock_live(connection_id, &handle, room_id).await?;

        let player_id = room.claim_slot(name)?;
        self.connections
            .bind(connection_id, room_id, Some(player_id.clone()))
            .await;
        self.connections
            .broadcast(
                &room_id,
                &ServerMessage::PlayerUpdate {
                    players: room.players().to_vec(),
                },
            )
            .await;

        info!("🙋 Connection {} joined room {} as {}", connection_id, room_id, player_id);
        Ok(player_id)
    }

    pub async fn start(&self, connection_id: ConnectionId) -> Result<(), GameError> {
        let (room_id, handle) = self.bound_room(connection_id).await?;
        let mut room = self.lock_live(connection_id, &handle, room_id).await?;

        room.start(connection_id, self.provider.as_ref())?;
        let puzzle = room
            .puzzle()
            .cloned()
            .ok_or(GameError::WrongPhase(room.phase()))?;
        self.connections
            .broadcast(
                &room_id,
                &ServerMessage::Start {
                    game_state: room.game_state().clone(),
                    puzzle,
                },
            )
            .await;

        info!("🏁 Room {} started", room_id);
        Ok(())
    }

    pub async fn answer(&self, connection_id: ConnectionId, word: &str) -> Result<(), GameError> {
        let binding = self.connections.binding(connection_id).await;
        let player_id = binding.player_id.clone().ok_or(GameError::NotBound)?;
        let (room_id, handle) = self.room_of(connection_id, &binding).await?;
        let mut room = self.lock_live(connection_id, &handle, room_id).await?;

        let outcome = room.submit_answer(&player_id, word)?;
        self.connections
            .broadcast(
                &room_id,
                &ServerMessage::Update {
                    game_state: room.game_state().clone(),
                    puzzle: None,
                },
            )
            .await;

        if outcome == AnswerOutcome::LevelCompleted {
            self.connections
                .broadcast(
                    &room_id,
                    &ServerMessage::LevelComplete {
                        game_state: room.game_state().clone(),
                    },
                )
                .await;
            info!("🎉 Room {} completed level {}", room_id, room.game_state().level);
        } else {
            debug!("✏️ Room {}: {} solved a word", room_id, player_id);
        }
        Ok(())
    }

    pub async fn highlight(
        &self,
        connection_id: ConnectionId,
        player_id: &str,
        word: &str,
        color: &str,
    ) -> Result<(), GameError> {
        let (room_id, handle) = self.bound_room(connection_id).await?;
        let mut room = self.lock_live(connection_id, &handle, room_id).await?;

        let player_id = room.set_highlight(player_id, word, color)?;
        self.connections
            .broadcast(
                &room_id,
                &ServerMessage::Highlight {
                    player_id,
                    word: word.to_string(),
                    color: color.to_string(),
                },
            )
            .await;
        Ok(())
    }

    pub async fn next_level(&self, connection_id: ConnectionId) -> Result<(), GameError> {
        let (room_id, handle) = self.bound_room(connection_id).await?;
        let mut room = self.lock_live(connection_id, &handle, room_id).await?;

        let message = match room.advance_level(self.provider.as_ref())? {
            LevelOutcome::Advanced => {
                info!("⏭️ Room {} advanced to level {}", room_id, room.game_state().level);
                ServerMessage::Update {
                    game_state: room.game_state().clone(),
                    puzzle: room.puzzle().cloned(),
                }
            }
            LevelOutcome::GameOver => {
                info!("🏆 Room {} finished every level", room_id);
                ServerMessage::GameOver {
                    game_state: room.game_state().clone(),
                }
            }
        };
        self.connections.broadcast(&room_id, &message).await;
        Ok(())
    }

    /// Replaces the caller's room with a fresh one under a new id.
    ///
    /// Every connection bound to the old room follows it to the new id with
    /// its slot cleared; the caller becomes the new creator.
    pub async fn restart(&self, connection_id: ConnectionId) -> Result<RoomId, GameError> {
        let (old_id, handle) = self.bound_room(connection_id).await?;
        let mut old = self.lock_live(connection_id, &handle, old_id).await?;

        let (new_id, fresh) = self
            .registry
            .replace(&old_id, |id| old.restarted(id, connection_id));
        old.retire();
        let room = fresh.lock().await;

        self.connections.rebind_room(&old_id, new_id).await;
        self.connections
            .broadcast(
                &new_id,
                &ServerMessage::RoomCreated {
                    room_id: new_id,
                    players: room.players().to_vec(),
                },
            )
            .await;

        info!("🔄 Connection {} restarted room {} as {}", connection_id, old_id, new_id);
        Ok(new_id)
    }

    /// Drops a connection and frees the slot it held.
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        let Some(binding) = self.connections.remove_connection(connection_id).await else {
            return;
        };
        let (Some(room_id), Some(player_id)) = (binding.room_id, binding.player_id) else {
            return;
        };
        let Ok(handle) = self.registry.get(&room_id) else {
            return;
        };
        let mut room = handle.lock().await;
        if room.is_retired() || !room.mark_offline(&player_id) {
            return;
        }

        self.connections
            .broadcast(
                &room_id,
                &ServerMessage::PlayerUpdate {
                    players: room.players().to_vec(),
                },
            )
            .await;
        info!("👋 {} left room {}", player_id, room_id);
    }

    /// Runs every room's clock down by `elapsed_secs`.
    ///
    /// Returns the number of rooms whose time ran out on this tick.
    pub async fn tick(&self, elapsed_secs: u32) -> usize {
        let mut expired = 0;
        for (room_id, handle) in self.registry.snapshot() {
            let mut room = handle.lock().await;
            if room.is_retired() || !room.tick(elapsed_secs) {
                continue;
            }
            expired += 1;
            self.connections
                .broadcast(
                    &room_id,
                    &ServerMessage::GameOver {
                        game_state: room.game_state().clone(),
                    },
                )
                .await;
            info!("⏰ Room {} ran out of time", room_id);
        }
        expired
    }

    /// Deletes rooms that nobody is bound to and whose slots have all been
    /// offline for at least `ttl`.
    pub async fn reap_idle(&self, ttl: Duration) -> usize {
        let mut reaped = 0;
        for (room_id, handle) in self.registry.snapshot() {
            let mut room = handle.lock().await;
            if room.is_retired() || !room.is_idle_for(ttl) {
                continue;
            }
            if self.connections.bound_count(&room_id).await > 0 {
                continue;
            }
            room.retire();
            if self.registry.delete(&room_id) {
                reaped += 1;
            }
        }
        if reaped > 0 {
            info!("🧹 Reaped {} idle room(s)", reaped);
        }
        reaped
    }

    async fn bound_room(&self, connection_id: ConnectionId) -> Result<(RoomId, RoomHandle), GameError> {
        let binding = self.connections.binding(connection_id).await;
        self.room_of(connection_id, &binding).await
    }

    async fn room_of(
        &self,
        connection_id: ConnectionId,
        binding: &Binding,
    ) -> Result<(RoomId, RoomHandle), GameError> {
        let room_id = binding.room_id.ok_or(GameError::NotBound)?;
        match self.registry.get(&room_id) {
            Ok(handle) => Ok((room_id, handle)),
            Err(_) => Err(self.missing_room(connection_id, room_id).await),
        }
    }

    /// Locks a room, rejecting it if it was replaced while we waited.
    async fn lock_live<'a>(
        &self,
        connection_id: ConnectionId,
        handle: &'a RoomHandle,
        room_id: RoomId,
    ) -> Result<MutexGuard<'a, Room>, GameError> {
        let room = handle.lock().await;
        if !room.is_retired() {
            return Ok(room);
        }
        drop(room);
        Err(self.missing_room(connection_id, room_id).await)
    }

    /// A connection that a restart already moved to the replacement room
    /// only loses this one intent; anyone else sees the room as gone.
    async fn missing_room(&self, connection_id: ConnectionId, room_id: RoomId) -> GameError {
        match self.connections.binding(connection_id).await.room_id {
            Some(current) if current != room_id => {
                debug!(
                    "♻️ Connection {} raced a restart of room {}, now in {}",
                    connection_id, room_id, current
                );
                GameError::RoomReplaced(room_id.to_string())
            }
            _ => GameError::RoomNotFound(room_id.to_string()),
        }
    }
}
