//! Session lifecycle
//!
//! Wraps one `GameState` at a time in the phase machine the page walks
//! through:
//!
//! ```text
//! AwaitingVerification -> Start -> Playing -> GameOver -> Start -> ...
//! ```
//!
//! The session owns everything that lives only as long as a game does (the
//! state, its pending explosions, the frame clock) and tears it down when the
//! player is destroyed.

use glam::Vec2;

use super::events::{GameEvent, SoundCue};
use super::snapshot::Snapshot;
use super::state::{GameState, GameSummary};
use super::tick::{TickInput, tick};
use crate::platform::FrameClock;
use crate::settings::Settings;
use crate::tuning::Tuning;
use crate::verify::{VerifyError, VerifyResponse};

/// Where the page is in the verify / play / game-over flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Identity check not passed yet
    AwaitingVerification,
    /// Verified, waiting for the player to start
    Start,
    Playing,
    /// Showing the final score
    GameOver,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::AwaitingVerification => "awaiting_verification",
            SessionPhase::Start => "start",
            SessionPhase::Playing => "playing",
            SessionPhase::GameOver => "game_over",
        }
    }
}

/// Called once per game with the final result
pub type GameOverCallback = Box<dyn FnMut(&GameSummary)>;

pub struct Session {
    phase: SessionPhase,
    tuning: Tuning,
    field: Vec2,
    settings: Settings,
    clock: FrameClock,
    /// Present only while `Playing`
    game: Option<GameState>,
    /// Events of the last frame, kept past teardown so the final blast is heard
    last_events: Vec<GameEvent>,
    last_summary: Option<GameSummary>,
    /// Proof nullifier of the verified person
    verified_as: Option<String>,
    verification_error: Option<String>,
    pause_requested: bool,
    on_game_over: Option<GameOverCallback>,
}

impl Session {
    pub fn new(tuning: Tuning, field: Vec2, settings: Settings) -> Self {
        Self {
            phase: SessionPhase::AwaitingVerification,
            tuning,
            field,
            settings,
            clock: FrameClock::default(),
            game: None,
            last_events: Vec::new(),
            last_summary: None,
            verified_as: None,
            verification_error: None,
            pause_requested: false,
            on_game_over: None,
        }
    }

    /// Register the host's game-over handler
    pub fn on_game_over(&mut self, callback: impl FnMut(&GameSummary) + 'static) {
        self.on_game_over = Some(Box::new(callback));
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == SessionPhase::Playing
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    pub fn last_summary(&self) -> Option<GameSummary> {
        self.last_summary
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn verified_as(&self) -> Option<&str> {
        self.verified_as.as_deref()
    }

    /// User-facing message of the last failed verification
    pub fn verification_error(&self) -> Option<&str> {
        self.verification_error.as_deref()
    }

    /// Feed the verification outcome in. Only success unlocks `Start`; a
    /// failure keeps the gate closed and is returned for display.
    pub fn apply_verification(
        &mut self,
        outcome: Result<VerifyResponse, VerifyError>,
    ) -> Result<(), VerifyError> {
        if self.phase != SessionPhase::AwaitingVerification {
            log::warn!("Ignoring verification result in phase {}", self.phase.as_str());
            return Ok(());
        }

        match outcome.and_then(VerifyResponse::into_result) {
            Ok(nullifier) => {
                log::info!("Verification succeeded");
                self.verified_as = nullifier;
                self.verification_error = None;
                self.phase = SessionPhase::Start;
                Ok(())
            }
            Err(e) => {
                log::warn!("Verification failed: {e}");
                self.verification_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Begin a fresh game. Returns false outside the `Start` phase.
    pub fn start(&mut self, seed: u64) -> bool {
        if self.phase != SessionPhase::Start {
            return false;
        }

        self.game = Some(GameState::new(seed, self.field, self.tuning.clone()));
        self.clock.reset();
        self.last_events.clear();
        self.last_summary = None;
        self.pause_requested = false;
        self.phase = SessionPhase::Playing;
        log::info!("Game started (seed {seed})");
        true
    }

    /// Drive one animation frame. Returns the frame's snapshot while playing;
    /// the frame that ends the game still returns one, carrying the outcome.
    pub fn frame(&mut self, timestamp_ms: f64, input: &TickInput) -> Option<Snapshot> {
        if self.phase != SessionPhase::Playing {
            return None;
        }
        let game = self.game.as_mut()?;

        let dt = self.clock.advance(timestamp_ms);
        let mut input = input.clone();
        input.pause |= std::mem::take(&mut self.pause_requested);

        tick(game, &input, dt);
        self.last_events.clone_from(&game.events);
        let snapshot = Snapshot::capture(game);

        if let Some(summary) = game.outcome {
            self.finish(summary);
        }

        Some(snapshot)
    }

    fn finish(&mut self, summary: GameSummary) {
        if let Some(mut game) = self.game.take() {
            game.cancel_explosions();
        }
        self.last_summary = Some(summary);
        self.phase = SessionPhase::GameOver;

        if let Some(callback) = self.on_game_over.as_mut() {
            callback(&summary);
        }
    }

    /// Back to the start screen after a game over
    pub fn restart(&mut self) -> bool {
        if self.phase != SessionPhase::GameOver {
            return false;
        }
        self.phase = SessionPhase::Start;
        log::info!("Restarting");
        true
    }

    /// Host visibility changed (tab hidden, window blurred)
    pub fn visibility_changed(&mut self, visible: bool) {
        let Some(game) = self.game.as_ref() else {
            return;
        };

        if visible {
            // Don't feed the hidden time in as one long frame
            self.clock.reset();
        } else if !game.paused && !self.pause_requested {
            log::info!("Auto-pausing on visibility loss");
            self.pause_requested = true;
        }
    }

    pub fn toggle_sound(&mut self) -> bool {
        let enabled = self.settings.toggle_sound();
        self.settings.save();
        enabled
    }

    pub fn toggle_debug(&mut self) -> bool {
        let enabled = self.settings.toggle_debug();
        self.settings.save();
        enabled
    }

    /// Events raised by the last frame
    pub fn events(&self) -> &[GameEvent] {
        &self.last_events
    }

    /// Sounds to play for the last frame (empty when muted)
    pub fn sound_cues(&self) -> Vec<SoundCue> {
        self.settings.sound_cues(&self.last_events).collect()
    }

    /// The container was resized
    pub fn resize(&mut self, field: Vec2) {
        self.field = field;
        if let Some(game) = self.game.as_mut() {
            game.resize(field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Enemy;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: f64 = 1000.0 / 60.0;

    fn success() -> Result<VerifyResponse, VerifyError> {
        Ok(VerifyResponse {
            success: true,
            nullifier_hash: Some("0xnull".into()),
            error: None,
        })
    }

    fn quiet_tuning() -> Tuning {
        Tuning {
            enemy_base_spawn_interval_ms: 1.0e12,
            enemy_min_spawn_interval_ms: 1.0e12,
            supply_chance: 0.0,
            ..Tuning::default()
        }
    }

    fn verified_session() -> Session {
        let mut session =
            Session::new(quiet_tuning(), Vec2::new(400.0, 700.0), Settings::default());
        session.apply_verification(success()).unwrap();
        session
    }

    /// Put a motionless enemy on top of the player
    fn ram_player(session: &mut Session) {
        let game = session.game.as_mut().unwrap();
        let id = game.next_entity_id();
        game.enemies.push(Enemy {
            id,
            pos: game.player.pos,
            size: Vec2::new(30.0, 30.0),
            health: 1,
            speed: 0.0,
        });
    }

    #[test]
    fn test_gate_blocks_start_until_verified() {
        let mut session =
            Session::new(Tuning::default(), Vec2::new(400.0, 700.0), Settings::default());
        assert!(!session.start(1));
        assert_eq!(session.frame(0.0, &TickInput::default()), None);

        let rejected = Ok(VerifyResponse {
            success: false,
            nullifier_hash: None,
            error: Some("bad proof".into()),
        });
        assert!(session.apply_verification(rejected).is_err());
        assert_eq!(session.phase(), SessionPhase::AwaitingVerification);
        assert_eq!(
            session.verification_error(),
            Some("proof verification failed: bad proof")
        );

        assert!(
            session
                .apply_verification(Err(VerifyError::Transport("offline".into())))
                .is_err()
        );
        assert_eq!(session.phase(), SessionPhase::AwaitingVerification);

        session.apply_verification(success()).unwrap();
        assert_eq!(session.phase(), SessionPhase::Start);
        assert_eq!(session.verified_as(), Some("0xnull"));
        assert_eq!(session.verification_error(), None);
    }

    #[test]
    fn test_frames_advance_play_time() {
        let mut session = verified_session();
        assert!(session.start(7));
        assert!(session.is_playing());

        let first = session.frame(1000.0, &TickInput::default()).unwrap();
        assert_eq!(first.elapsed_ms, 0.0);
        let second = session.frame(1000.0 + DT, &TickInput::default()).unwrap();
        assert!((second.elapsed_ms - DT).abs() < 1e-9);
    }

    #[test]
    fn test_visibility_loss_pauses() {
        let mut session = verified_session();
        session.start(7);
        session.frame(0.0, &TickInput::default());

        session.visibility_changed(false);
        let snapshot = session.frame(DT, &TickInput::default()).unwrap();
        assert!(snapshot.paused);
        let frozen = snapshot.elapsed_ms;

        // Coming back resets the clock, and the game stays paused until asked
        session.visibility_changed(true);
        let snapshot = session.frame(60_000.0, &TickInput::default()).unwrap();
        assert!(snapshot.paused);
        assert_eq!(snapshot.elapsed_ms, frozen);

        let resume = TickInput {
            pause: true,
            ..Default::default()
        };
        let snapshot = session.frame(60_000.0 + DT, &resume).unwrap();
        assert!(!snapshot.paused);
    }

    #[test]
    fn test_game_over_tears_down_and_reports() {
        let summaries = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&summaries);

        let mut session = verified_session();
        session.on_game_over(move |summary| sink.borrow_mut().push(*summary));
        session.start(3);
        session.frame(0.0, &TickInput::default());

        ram_player(&mut session);
        let last = session.frame(DT, &TickInput::default()).unwrap();

        let expected = GameSummary {
            score: 0,
            tokens: 0,
            level: 1,
        };
        assert_eq!(last.outcome, Some(expected));
        assert_eq!(session.phase(), SessionPhase::GameOver);
        assert!(session.game().is_none());
        assert_eq!(session.last_summary(), Some(expected));
        assert_eq!(*summaries.borrow(), vec![expected]);
        assert!(session.sound_cues().contains(&SoundCue::Explosion));

        // No more frames until restarted
        assert_eq!(session.frame(2.0 * DT, &TickInput::default()), None);
        assert_eq!(summaries.borrow().len(), 1);

        assert!(session.restart());
        assert_eq!(session.phase(), SessionPhase::Start);
        assert!(session.start(4));
        let fresh = session.game().unwrap();
        assert_eq!(fresh.score, 0);
        assert!(fresh.enemies.is_empty());
    }

    #[test]
    fn test_muted_session_has_no_cues() {
        let mut session = verified_session();
        session.start(3);
        assert!(!session.toggle_sound());

        let firing = TickInput {
            firing: true,
            ..Default::default()
        };
        session.frame(0.0, &firing);
        for i in 1..60 {
            session.frame(i as f64 * DT, &firing);
            assert!(session.sound_cues().is_empty());
        }
    }

    #[test]
    fn test_resize_keeps_player_inside() {
        let mut session = verified_session();
        session.start(3);
        let input = TickInput {
            target_x: Some(360.0),
            ..Default::default()
        };
        session.frame(0.0, &input);
        session.resize(Vec2::new(200.0, 500.0));
        let game = session.game().unwrap();
        assert_eq!(game.player.pos.x, 160.0);
        assert_eq!(game.field, Vec2::new(200.0, 500.0));
    }
}
