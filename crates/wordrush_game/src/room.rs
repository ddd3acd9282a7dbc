//! The authoritative state of one game session.
//!
//! A [`Room`] owns the roster, the shared [`GameState`], the lifecycle
//! [`Phase`], and the puzzle cached for the level being played. Every method
//! is a single state-machine transition: it either applies completely or
//! returns a [`GameError`] without touching the room.
//!
//! Rooms are not synchronized internally; the server wraps each one in its
//! own lock so transitions on one room never contend with another.

use crate::error::GameError;
use crate::player::{display_name_for, Player};
use crate::puzzle::{normalize_word, Puzzle, PuzzleProvider};
use crate::rules::{NextLevelPolicy, RosterPolicy, RoomRules, StartPolicy};
use crate::state::{GameState, Highlight, Phase};
use crate::types::{ConnectionId, PlayerId, RoomId};
use std::time::{Duration, Instant};
use tracing::debug;

/// Result of an accepted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The word was counted and the level continues
    Progress,
    /// The word was the last one missing; the room is now `LevelComplete`
    LevelCompleted,
}

/// Result of an accepted `nextLevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelOutcome {
    /// The room entered the next level
    Advanced,
    /// The last level was passed; the room is now `GameOver`
    GameOver,
}

#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    players: Vec<Player>,
    game_state: GameState,
    phase: Phase,
    creator: Option<ConnectionId>,
    puzzle: Option<Puzzle>,
    rules: RoomRules,
    retired: bool,
    idle_since: Option<Instant>,
}

impl Room {
    /// Creates a room in `Lobby` with one slot per name.
    ///
    /// The first slot is seated for the creating connection; the rest start
    /// offline unless `rules.seat_all_on_create` is set.
    pub fn new(
        id: RoomId,
        names: &[String],
        creator: ConnectionId,
        rules: RoomRules,
    ) -> Result<Self, GameError> {
        if names.is_empty() {
            return Err(GameError::EmptyRoster);
        }

        let players: Vec<Player> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let position = i + 1;
                Player::new(
                    PlayerId::for_slot(position),
                    display_name_for(Some(name), position),
                    i == 0 || rules.seat_all_on_create,
                )
            })
            .collect();
        let game_state = GameState::new(players.iter().map(|p| &p.id), rules.time_limit_secs);

        Ok(Self {
            id,
            players,
            game_state,
            phase: Phase::Lobby,
            creator: Some(creator),
            puzzle: None,
            rules,
            retired: false,
            idle_since: None,
        })
    }

    /// Builds the replacement room handed out by a restart.
    ///
    /// The roster keeps its ids and names but every slot is offline; scores,
    /// level, words and highlights start over.
    pub fn restarted(&self, id: RoomId, creator: ConnectionId) -> Self {
        let players: Vec<Player> = self
            .players
            .iter()
            .map(|p| Player::new(p.id.clone(), p.display_name.clone(), false))
            .collect();
        let game_state = GameState::new(players.iter().map(|p| &p.id), self.rules.time_limit_secs);

        Self {
            id,
            players,
            game_state,
            phase: Phase::Lobby,
            creator: Some(creator),
            puzzle: None,
            rules: self.rules.clone(),
            retired: false,
            idle_since: Some(Instant::now()),
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn creator(&self) -> Option<ConnectionId> {
        self.creator
    }

    /// The puzzle of the level in play, if any.
    pub fn puzzle(&self) -> Option<&Puzzle> {
        self.puzzle.as_ref()
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn online_count(&self) -> usize {
        self.players.iter().filter(|p| p.online).count()
    }

    /// Marks the room as replaced. A retired room rejects nothing by itself;
    /// callers check [`Room::is_retired`] after acquiring its lock.
    pub fn retire(&mut self) {
        self.retired = true;
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    /// True once every slot has been offline for at least `ttl`.
    pub fn is_idle_for(&self, ttl: Duration) -> bool {
        self.idle_since.is_some_and(|since| since.elapsed() >= ttl)
    }

    /// Seats a joining connection.
    ///
    /// The first offline slot wins, regardless of its name. With no offline
    /// slot an open roster appends a new player, a fixed one is full.
    pub fn claim_slot(&mut self, requested_name: Option<&str>) -> Result<PlayerId, GameError> {
        if let Some(player) = self.players.iter_mut().find(|p| !p.online) {
            player.online = true;
            self.idle_since = None;
            debug!("🪑 Room {}: slot {} reclaimed", self.id, player.id);
            return Ok(player.id.clone());
        }

        match self.rules.roster {
            RosterPolicy::Fixed => Err(GameError::RoomFull),
            RosterPolicy::Open if self.players.len() >= self.rules.max_players => {
                Err(GameError::RoomFull)
            }
            RosterPolicy::Open => {
                let position = self.players.len() + 1;
                let id = PlayerId::for_slot(position);
                self.players.push(Player::new(
                    id.clone(),
                    display_name_for(requested_name, position),
                    true,
                ));
                self.game_state.scores.insert(id.clone(), 0);
                self.idle_since = None;
                debug!("🪑 Room {}: slot {} appended", self.id, id);
                Ok(id)
            }
        }
    }

    /// Marks a slot offline. Returns false if the player is unknown or
    /// already offline.
    pub fn mark_offline(&mut self, id: &PlayerId) -> bool {
        let Some(player) = self.players.iter_mut().find(|p| &p.id == id) else {
            return false;
        };
        if !player.online {
            return false;
        }
        player.online = false;
        if self.online_count() == 0 {
            self.idle_since = Some(Instant::now());
        }
        true
    }

    /// `Lobby -> Active(1)`.
    pub fn start(
        &mut self,
        caller: ConnectionId,
        provider: &dyn PuzzleProvider,
    ) -> Result<(), GameError> {
        if self.rules.start_policy == StartPolicy::Creator && self.creator != Some(caller) {
            return Err(GameError::Unauthorized("only the room creator can start the game"));
        }
        if self.phase != Phase::Lobby {
            return Err(GameError::WrongPhase(self.phase));
        }

        self.enter_level(1, provider);
        Ok(())
    }

    /// Records a solved word for `player`.
    ///
    /// Duplicate and unknown words are rejected without any change, so a
    /// word is counted at most once per level.
    pub fn submit_answer(
        &mut self,
        player: &PlayerId,
        word: &str,
    ) -> Result<AnswerOutcome, GameError> {
        if self.phase != Phase::Active {
            return Err(GameError::WrongPhase(self.phase));
        }
        let word = normalize_word(word);
        let Some(puzzle) = self.puzzle.as_ref() else {
            return Err(GameError::WrongPhase(self.phase));
        };
        if !puzzle.contains(&word) {
            return Err(GameError::InvalidWord(word));
        }
        if self.game_state.is_completed(&word) {
            return Err(GameError::AlreadyCompleted(word));
        }
        if self.player(player).is_none() {
            return Err(GameError::UnknownPlayer(player.to_string()));
        }

        let target = puzzle.word_count();
        self.game_state.completed_words.push(word);
        *self.game_state.scores.entry(player.clone()).or_insert(0) += 1;

        if self.game_state.completed_words.len() >= target {
            self.phase = Phase::LevelComplete;
            Ok(AnswerOutcome::LevelCompleted)
        } else {
            Ok(AnswerOutcome::Progress)
        }
    }

    /// Sets the highlight shown for `player`.
    pub fn set_highlight(
        &mut self,
        player: &str,
        word: &str,
        color: &str,
    ) -> Result<PlayerId, GameError> {
        let id = PlayerId::from(player);
        if self.player(&id).is_none() {
            return Err(GameError::UnknownPlayer(player.to_string()));
        }
        self.game_state.highlights.insert(
            id.clone(),
            Highlight {
                word: word.to_string(),
                color: color.to_string(),
            },
        );
        Ok(id)
    }

    /// Moves past the current level, ending the game after `max_level`.
    pub fn advance_level(&mut self, provider: &dyn PuzzleProvider) -> Result<LevelOutcome, GameError> {
        let allowed = match self.phase {
            Phase::LevelComplete => true,
            Phase::Active => self.rules.next_level_policy == NextLevelPolicy::Anytime,
            Phase::Lobby | Phase::GameOver => false,
        };
        if !allowed {
            return Err(GameError::WrongPhase(self.phase));
        }

        let next = self.game_state.level + 1;
        if next > self.rules.max_level {
            self.game_state.level = next;
            self.game_state.completed_words.clear();
            self.game_state.highlights.clear();
            self.finish();
            return Ok(LevelOutcome::GameOver);
        }

        self.enter_level(next, provider);
        Ok(LevelOutcome::Advanced)
    }

    /// Runs the game clock down by `elapsed_secs` while a level is in play.
    ///
    /// Returns true if the clock ran out and the room moved to `GameOver`.
    pub fn tick(&mut self, elapsed_secs: u32) -> bool {
        if self.phase != Phase::Active || elapsed_secs == 0 {
            return false;
        }
        self.game_state.time_left = self.game_state.time_left.saturating_sub(elapsed_secs);
        if self.game_state.time_left == 0 {
            self.finish();
            return true;
        }
        false
    }

    fn enter_level(&mut self, level: u32, provider: &dyn PuzzleProvider) {
        self.game_state.level = level;
        self.game_state.completed_words.clear();
        self.game_state.highlights.clear();
        self.puzzle = Some(provider.puzzle(level));
        self.phase = Phase::Active;
    }

    fn finish(&mut self) {
        self.phase = Phase::GameOver;
        self.puzzle = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{ClassicPuzzles, WordBankPuzzles};

    const CREATOR: ConnectionId = 1;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn room_with(rules: RoomRules) -> Room {
        Room::new(RoomId::new(), &names(&["A", "B"]), CREATOR, rules).expect("room")
    }

    fn started_room() -> Room {
        let mut room = room_with(RoomRules::default());
        room.start(CREATOR, &ClassicPuzzles::new()).expect("start");
        room
    }

    #[test]
    fn create_seats_only_the_first_player() {
        let room = room_with(RoomRules::default());
        let players = room.players();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].id.as_str(), "p1");
        assert!(players[0].online);
        assert_eq!(players[1].id.as_str(), "p2");
        assert!(!players[1].online);
        assert_eq!(room.game_state().level, 1);
        assert!(room.game_state().completed_words.is_empty());
        assert_eq!(room.phase(), Phase::Lobby);
    }

    #[test]
    fn create_can_seat_everyone() {
        let rules = RoomRules { seat_all_on_create: true, ..RoomRules::default() };
        let room = room_with(rules);
        assert!(room.players().iter().all(|p| p.online));
    }

    #[test]
    fn create_requires_a_name() {
        let result = Room::new(RoomId::new(), &[], CREATOR, RoomRules::default());
        assert!(matches!(result, Err(GameError::EmptyRoster)));
    }

    #[test]
    fn classic_scenario_runs_to_game_over() {
        let provider = ClassicPuzzles::new();
        let mut room = started_room();
        let p1 = PlayerId::for_slot(1);

        assert_eq!(room.submit_answer(&p1, "CAT").expect("cat"), AnswerOutcome::Progress);
        assert_eq!(room.game_state().completed_words, vec!["CAT".to_string()]);
        assert_eq!(room.game_state().scores[&p1], 1);

        assert!(matches!(room.submit_answer(&p1, "CAT"), Err(GameError::AlreadyCompleted(_))));
        assert_eq!(room.game_state().scores[&p1], 1);

        assert_eq!(room.submit_answer(&p1, "hat").expect("hat"), AnswerOutcome::LevelCompleted);
        assert_eq!(room.phase(), Phase::LevelComplete);

        assert_eq!(room.advance_level(&provider).expect("level 2"), LevelOutcome::Advanced);
        assert_eq!(room.game_state().level, 2);
        assert!(room.game_state().completed_words.is_empty());
        assert!(room.puzzle().expect("puzzle").contains("BOOK"));

        room.submit_answer(&p1, "BOOK").expect("book");
        room.submit_answer(&p1, "KITE").expect("kite");
        assert_eq!(room.advance_level(&provider).expect("level 3"), LevelOutcome::Advanced);

        room.submit_answer(&p1, "HOUSE").expect("house");
        room.submit_answer(&p1, "EAGLE").expect("eagle");
        assert_eq!(room.advance_level(&provider).expect("end"), LevelOutcome::GameOver);
        assert_eq!(room.phase(), Phase::GameOver);
        assert!(room.puzzle().is_none());

        let level = room.game_state().level;
        assert!(matches!(room.advance_level(&provider), Err(GameError::WrongPhase(Phase::GameOver))));
        assert_eq!(room.game_state().level, level);
    }

    #[test]
    fn answers_outside_the_puzzle_change_nothing() {
        let mut room = started_room();
        let before = room.game_state().clone();
        let result = room.submit_answer(&PlayerId::for_slot(1), "DOG");
        assert!(matches!(result, Err(GameError::InvalidWord(_))));
        assert_eq!(room.game_state(), &before);
    }

    #[test]
    fn answers_before_start_are_rejected() {
        let mut room = room_with(RoomRules::default());
        let result = room.submit_answer(&PlayerId::for_slot(1), "CAT");
        assert!(matches!(result, Err(GameError::WrongPhase(Phase::Lobby))));
    }

    #[test]
    fn only_the_creator_may_start_by_default() {
        let mut room = room_with(RoomRules::default());
        let result = room.start(CREATOR + 1, &ClassicPuzzles::new());
        assert!(matches!(result, Err(GameError::Unauthorized(_))));
        assert_eq!(room.phase(), Phase::Lobby);

        let rules = RoomRules { start_policy: StartPolicy::Anyone, ..RoomRules::default() };
        let mut open = room_with(rules);
        open.start(CREATOR + 1, &ClassicPuzzles::new()).expect("anyone may start");
        assert_eq!(open.phase(), Phase::Active);
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut room = started_room();
        let result = room.start(CREATOR, &ClassicPuzzles::new());
        assert!(matches!(result, Err(GameError::WrongPhase(Phase::Active))));
    }

    #[test]
    fn next_level_waits_for_completion_by_default() {
        let provider = ClassicPuzzles::new();
        let mut room = started_room();
        assert!(matches!(room.advance_level(&provider), Err(GameError::WrongPhase(Phase::Active))));

        let rules = RoomRules { next_level_policy: NextLevelPolicy::Anytime, ..RoomRules::default() };
        let mut eager = room_with(rules);
        eager.start(CREATOR, &provider).expect("start");
        assert_eq!(eager.advance_level(&provider).expect("skip"), LevelOutcome::Advanced);
        assert_eq!(eager.game_state().level, 2);
    }

    #[test]
    fn level_advance_clears_highlights() {
        let rules = RoomRules { next_level_policy: NextLevelPolicy::Anytime, ..RoomRules::default() };
        let mut room = room_with(rules);
        let provider = ClassicPuzzles::new();
        room.start(CREATOR, &provider).expect("start");
        room.set_highlight("p1", "CAT", "red").expect("highlight");
        room.advance_level(&provider).expect("advance");
        assert!(room.game_state().highlights.is_empty());
    }

    #[test]
    fn highlight_requires_a_roster_player() {
        let mut room = room_with(RoomRules::default());
        assert!(matches!(room.set_highlight("p9", "CAT", "red"), Err(GameError::UnknownPlayer(_))));
        let id = room.set_highlight("p2", "CAT", "blue").expect("highlight");
        assert_eq!(room.game_state().highlights[&id].color, "blue");
    }

    #[test]
    fn fixed_roster_rejoins_by_slot_then_fills_up() {
        let mut room = room_with(RoomRules::default());
        let id = room.claim_slot(Some("ignored")).expect("free slot");
        assert_eq!(id.as_str(), "p2");
        assert_eq!(room.players()[1].display_name, "B");
        assert!(matches!(room.claim_slot(None), Err(GameError::RoomFull)));
    }

    #[test]
    fn disconnect_then_rejoin_restores_the_same_slot() {
        let mut room = started_room();
        let p1 = PlayerId::for_slot(1);
        room.submit_answer(&p1, "CAT").expect("cat");
        room.claim_slot(None).expect("p2 joins");

        assert!(room.mark_offline(&p1));
        assert!(!room.players()[0].online);
        assert!(room.players()[1].online);
        assert_eq!(room.game_state().scores[&p1], 1);

        let rejoined = room.claim_slot(None).expect("rejoin");
        assert_eq!(rejoined, p1);
        assert!(room.players()[0].online);
    }

    #[test]
    fn open_roster_appends_until_capacity() {
        let rules = RoomRules { roster: RosterPolicy::Open, max_players: 3, ..RoomRules::default() };
        let mut room = room_with(rules);
        room.claim_slot(None).expect("p2");
        let appended = room.claim_slot(Some("Cleo")).expect("p3");
        assert_eq!(appended.as_str(), "p3");
        assert_eq!(room.players()[2].display_name, "Cleo");
        assert_eq!(room.game_state().scores[&appended], 0);
        assert!(matches!(room.claim_slot(None), Err(GameError::RoomFull)));
    }

    #[test]
    fn restart_keeps_names_and_resets_everything_else() {
        let provider = ClassicPuzzles::new();
        let mut room = started_room();
        let p1 = PlayerId::for_slot(1);
        room.submit_answer(&p1, "CAT").expect("cat");
        room.submit_answer(&p1, "HAT").expect("hat");
        room.advance_level(&provider).expect("advance");

        let new_id = RoomId::new();
        let fresh = room.restarted(new_id, CREATOR + 5);
        assert_eq!(fresh.id(), new_id);
        assert_ne!(fresh.id(), room.id());
        assert_eq!(fresh.phase(), Phase::Lobby);
        assert_eq!(fresh.creator(), Some(CREATOR + 5));
        let names: Vec<&str> = fresh.players().iter().map(|p| p.display_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(fresh.players().iter().all(|p| !p.online));
        assert_eq!(fresh.game_state().level, 1);
        assert!(fresh.game_state().completed_words.is_empty());
        assert!(fresh.game_state().scores.values().all(|s| *s == 0));
    }

    #[test]
    fn clock_running_out_ends_the_game() {
        let rules = RoomRules { time_limit_secs: 3, ..RoomRules::default() };
        let mut room = room_with(rules);
        assert!(!room.tick(5), "lobby clock does not run");
        assert_eq!(room.game_state().time_left, 3);

        room.start(CREATOR, &ClassicPuzzles::new()).expect("start");
        assert!(!room.tick(2));
        assert_eq!(room.game_state().time_left, 1);
        assert!(room.tick(2));
        assert_eq!(room.game_state().time_left, 0);
        assert_eq!(room.phase(), Phase::GameOver);
        assert!(!room.tick(1));
    }

    #[test]
    fn completed_words_never_exceed_puzzle_words() {
        let provider = WordBankPuzzles::seeded(11, 3);
        let rules = RoomRules { max_level: 5, ..RoomRules::default() };
        let mut room = room_with(rules);
        room.start(CREATOR, &provider).expect("start");
        let p1 = PlayerId::for_slot(1);

        for _ in 0..5 {
            let words: Vec<String> = room
                .puzzle()
                .expect("puzzle")
                .words
                .iter()
                .map(|w| w.word.clone())
                .collect();
            for word in words.iter().chain(words.iter()) {
                let _ = room.submit_answer(&p1, word);
                let limit = room.puzzle().map_or(0, Puzzle::word_count);
                assert!(room.game_state().completed_words.len() <= limit);
            }
            if room.advance_level(&provider).expect("advance") == LevelOutcome::GameOver {
                break;
            }
        }
        assert_eq!(room.phase(), Phase::GameOver);
        assert_eq!(room.game_state().scores[&p1], 15);
    }
}
