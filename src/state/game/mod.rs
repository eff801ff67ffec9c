//! Gameplay session: scheduling, judging and the end-of-song flow.
//!
//! A `GameSession` is driven by `update(dt)` once per frame. Inputs arrive
//! through `press`/`release` and are resolved at the start of the next
//! frame, so every judgement happens inside the frame step.

mod input;
mod notes;
mod snapshot;

pub mod feedback;
pub mod timer;

pub use notes::{ActiveNotes, Expired};

use crate::core::input::actions::DrumKey;
use crate::core::input::router::KeyRouter;
use crate::database::models::{PlayRecord, Player};
use crate::database::recorder::ScoreRecorder;
use crate::logic::audio::MusicPlayer;
use crate::models::engine::{ALPHA_MAX, HIT_LINE_X, HitWindow, Note, SCREEN_WIDTH};
use crate::models::settings::GameplaySettings;
use crate::models::stats::{HitStats, Judgement};
use feedback::Feedback;
use std::collections::VecDeque;
use timer::DeferredTimer;

/// Overlay ramp and music fade after the last note.
pub const END_FADE_SECONDS: f64 = 1.5;
/// Cross-fade from the results screen back to the caller.
pub const LEAVE_FADE_SECONDS: f64 = 1.0;

pub const MSG_SAVED: &str = "Score saved!";
pub const MSG_SAVE_FAILED: &str = "Could not save the score.";
pub const MSG_GUEST: &str = "Guest run, score not saved.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Playing,
    EndingFade,
    ShowResults,
    Leaving,
    Finished,
}

/// What the caller should do after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSignal {
    Continue,
    /// The session is over; switch scenes.
    Exit,
}

/// Collaborators and identity of one run.
pub struct SessionContext {
    pub music_name: String,
    pub player: Option<Player>,
    pub audio: Box<dyn MusicPlayer>,
    pub recorder: Box<dyn ScoreRecorder>,
}

pub struct GameSession {
    /// Unspawned notes, ascending by `spawn_time`.
    pub(crate) queue: VecDeque<Note>,
    pub(crate) notes: ActiveNotes,
    /// Seconds since the session started.
    pub(crate) clock: f64,
    pub(crate) scroll_speed: f64,
    /// Off-screen x where notes enter the lane.
    pub(crate) spawn_x: f64,
    pub(crate) hit_window: HitWindow,

    pub(crate) stats: HitStats,
    pub(crate) last_judgement: Option<Judgement>,
    pub(crate) feedback: Feedback,
    pub(crate) router: KeyRouter,

    state: SessionState,
    phase_elapsed: f64,
    overlay_alpha: f64,
    results_alpha: f64,
    exit_alpha: f64,
    total_notes: usize,

    music_start: DeferredTimer,
    audio: Box<dyn MusicPlayer>,
    recorder: Box<dyn ScoreRecorder>,
    music_name: String,
    player: Option<Player>,
    recorded: bool,
    results_message: Option<String>,
}

impl GameSession {
    pub fn new(mut notes: Vec<Note>, settings: &GameplaySettings, context: SessionContext) -> Self {
        notes.sort_by(|a, b| a.spawn_time.total_cmp(&b.spawn_time));

        let scroll_speed = settings.scroll_speed.max(1.0);
        let spawn_x = SCREEN_WIDTH + settings.note_radius;

        // Notes are due when they reach the hit line, so the track starts
        // once the first possible note has crossed the lane.
        let travel = (spawn_x - HIT_LINE_X) / scroll_speed;
        let mut music_start = DeferredTimer::new();
        music_start.schedule(travel);

        let mut audio = context.audio;
        audio.set_volume(settings.master_volume);

        log::info!(
            "ENGINE: Session '{}' with {} notes, music starts in {:.2}s",
            context.music_name,
            notes.len(),
            travel
        );

        Self {
            total_notes: notes.len(),
            queue: notes.into(),
            notes: ActiveNotes::new(),
            clock: 0.0,
            scroll_speed,
            spawn_x,
            hit_window: HitWindow::from_radii(settings.note_radius, settings.hit_radius),
            stats: HitStats::new(),
            last_judgement: None,
            feedback: Feedback::new(),
            router: KeyRouter::new(settings.key_cooldown),
            state: SessionState::Playing,
            phase_elapsed: 0.0,
            overlay_alpha: 0.0,
            results_alpha: 0.0,
            exit_alpha: 0.0,
            music_start,
            audio,
            recorder: context.recorder,
            music_name: context.music_name,
            player: context.player,
            recorded: false,
            results_message: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> &HitStats {
        &self.stats
    }

    pub fn results_message(&self) -> Option<&str> {
        self.results_message.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    /// The note currently eligible for judging.
    pub fn leader(&self) -> Option<&Note> {
        self.notes.leader()
    }

    pub fn hit_window(&self) -> &HitWindow {
        &self.hit_window
    }

    /// Advances the session by one frame.
    pub fn update(&mut self, dt: f64) -> SessionSignal {
        let dt = dt.max(0.0);
        match self.state {
            SessionState::Playing => self.update_playing(dt),
            SessionState::EndingFade => {
                let progress = self.advance_phase(dt, END_FADE_SECONDS);
                self.overlay_alpha = ALPHA_MAX * progress;
                self.notes.advance_exits(dt);
                if progress >= 1.0 {
                    self.transition_to_results();
                }
            }
            SessionState::ShowResults => {}
            SessionState::Leaving => {
                let progress = self.advance_phase(dt, LEAVE_FADE_SECONDS);
                self.exit_alpha = ALPHA_MAX * progress;
                self.results_alpha = ALPHA_MAX * (1.0 - progress);
                if progress >= 1.0 {
                    log::info!("ENGINE: Leaving session '{}'", self.music_name);
                    self.state = SessionState::Finished;
                }
            }
            SessionState::Finished => return SessionSignal::Exit,
        }

        self.feedback.update(dt);
        self.audio.update(dt);

        if self.state == SessionState::Finished {
            SessionSignal::Exit
        } else {
            SessionSignal::Continue
        }
    }

    fn update_playing(&mut self, dt: f64) {
        self.process_inputs();

        self.clock += dt;
        if self.music_start.tick(dt) {
            log::info!("AUDIO: Starting playback at {:.3}s", self.clock);
            self.audio.play();
        }

        self.update_notes(dt);

        if self.queue.is_empty() && self.notes.is_empty() {
            self.begin_ending();
        }
    }

    /// Returns the phase progress in `0..=1`.
    fn advance_phase(&mut self, dt: f64, duration: f64) -> f64 {
        self.phase_elapsed += dt;
        if duration <= 0.0 {
            1.0
        } else {
            (self.phase_elapsed / duration).min(1.0)
        }
    }

    fn begin_ending(&mut self) {
        log::info!(
            "ENGINE: All {} notes done (score {}), fading out",
            self.total_notes,
            self.stats.score
        );
        self.music_start.cancel();
        self.audio.fade_out(END_FADE_SECONDS);
        self.router.clear();
        self.state = SessionState::EndingFade;
        self.phase_elapsed = 0.0;
    }

    /// Stops the music, shows the results and records the run once.
    pub(crate) fn transition_to_results(&mut self) {
        self.audio.stop();
        self.overlay_alpha = ALPHA_MAX;
        self.results_alpha = ALPHA_MAX;
        self.state = SessionState::ShowResults;
        self.phase_elapsed = 0.0;

        if self.recorded {
            return;
        }
        self.recorded = true;
        self.results_message = Some(self.record_results());
    }

    fn record_results(&mut self) -> String {
        let Some(player) = &self.player else {
            log::info!("ENGINE: No player selected, run not recorded");
            return MSG_GUEST.to_string();
        };

        let record = PlayRecord::from_stats(player.id, &self.music_name, &self.stats);
        match self.recorder.record(&record) {
            Ok(id) => {
                log::info!(
                    "ENGINE: Recorded play #{} for {} on '{}' (score {})",
                    id,
                    player.name,
                    self.music_name,
                    record.score
                );
                MSG_SAVED.to_string()
            }
            Err(e) => {
                log::error!("ENGINE: Failed to record the run: {}", e);
                MSG_SAVE_FAILED.to_string()
            }
        }
    }

    /// Queues a pad stroke for the next frame. Inert outside gameplay.
    pub fn press(&mut self, key: DrumKey) {
        if self.state == SessionState::Playing {
            self.router.press(key);
        }
    }

    pub fn release(&mut self, key: DrumKey) {
        self.router.release(key);
    }

    /// Leaves the results screen. Returns `false` when there is nothing to confirm.
    pub fn confirm(&mut self) -> bool {
        if self.state != SessionState::ShowResults {
            return false;
        }
        self.state = SessionState::Leaving;
        self.phase_elapsed = 0.0;
        true
    }

    /// Ends the session immediately without recording.
    pub fn abort(&mut self) {
        if self.state == SessionState::Finished {
            return;
        }
        log::info!("ENGINE: Session '{}' aborted", self.music_name);
        if self.music_start.is_pending() {
            log::debug!("AUDIO: Deferred playback start cancelled");
        }
        self.music_start.cancel();
        self.audio.stop();
        self.router.clear();
        self.state = SessionState::Finished;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::database::recorder::RecordError;
    use crate::models::engine::{NOTE_FADE_SECONDS, NoteKind, NoteState};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    pub(crate) struct AudioLog {
        pub events: Vec<String>,
    }

    pub(crate) struct FakeAudio(pub Rc<RefCell<AudioLog>>);

    impl MusicPlayer for FakeAudio {
        fn play(&mut self) {
            self.0.borrow_mut().events.push("play".into());
        }
        fn stop(&mut self) {
            self.0.borrow_mut().events.push("stop".into());
        }
        fn set_volume(&mut self, _volume: f32) {}
        fn fade_out(&mut self, _seconds: f64) {
            self.0.borrow_mut().events.push("fade_out".into());
        }
        fn update(&mut self, _dt: f64) {}
        fn play_effect(&mut self, kind: NoteKind) {
            self.0.borrow_mut().events.push(format!("effect:{}", kind.code()));
        }
    }

    pub(crate) struct FakeRecorder {
        pub records: Rc<RefCell<Vec<PlayRecord>>>,
        pub fail: bool,
    }

    impl ScoreRecorder for FakeRecorder {
        fn record(&mut self, play: &PlayRecord) -> Result<i64, RecordError> {
            if self.fail {
                return Err(RecordError::Unavailable("offline".to_string()));
            }
            let mut records = self.records.borrow_mut();
            records.push(play.clone());
            Ok(records.len() as i64)
        }
    }

    pub(crate) struct Harness {
        pub session: GameSession,
        pub audio: Rc<RefCell<AudioLog>>,
        pub records: Rc<RefCell<Vec<PlayRecord>>>,
    }

    fn player() -> Player {
        Player {
            id: 1,
            name: "Ana".to_string(),
        }
    }

    pub(crate) fn harness_with(notes: Vec<Note>, player: Option<Player>, fail: bool) -> Harness {
        let audio = Rc::new(RefCell::new(AudioLog::default()));
        let records = Rc::new(RefCell::new(Vec::new()));
        let context = SessionContext {
            music_name: "Samba".to_string(),
            player,
            audio: Box::new(FakeAudio(audio.clone())),
            recorder: Box::new(FakeRecorder {
                records: records.clone(),
                fail,
            }),
        };
        Harness {
            session: GameSession::new(notes, &GameplaySettings::default(), context),
            audio,
            records,
        }
    }

    pub(crate) fn harness(notes: &[(f64, NoteKind)]) -> Harness {
        let notes = notes.iter().map(|&(t, k)| Note::new(t, k)).collect();
        harness_with(notes, Some(player()), false)
    }

    /// Seconds a note needs to scroll from its entry point to the hit line.
    pub(crate) fn travel(session: &GameSession) -> f64 {
        (session.spawn_x - session.hit_window.hit_line) / session.scroll_speed
    }

    /// Steps until the first note of `hit_time` sits on the hit line.
    pub(crate) fn reach_hit_line(session: &mut GameSession, hit_time: f64) {
        session.update(hit_time);
        let t = travel(session);
        session.update(t);
    }

    fn run_to_results(session: &mut GameSession) {
        for _ in 0..200 {
            session.update(0.05);
            if session.state() == SessionState::ShowResults {
                return;
            }
        }
        panic!("session never reached the results screen");
    }

    #[test]
    fn perfect_hit_on_the_line() {
        let mut h = harness(&[(2.0, NoteKind::Agudo)]);
        reach_hit_line(&mut h.session, 2.0);

        let leader = h.session.leader().unwrap();
        assert!(h.session.hit_window.distance(leader.position) < 1e-6);

        assert_eq!(h.session.judge(NoteKind::Agudo), Judgement::Perfect);
        assert_eq!(h.session.stats.score, 100);
        assert_eq!(h.session.stats.perfect, 1);
        assert!(h.session.leader().is_none());

        h.session.update(NOTE_FADE_SECONDS + 0.01);
        assert!(h.session.notes.is_empty());
        assert!(h.audio.borrow().events.contains(&"effect:a".to_string()));
    }

    #[test]
    fn unplayed_note_expires_and_falls() {
        let mut h = harness(&[(1.0, NoteKind::Grave)]);
        h.session.update(1.0);
        let t = travel(&h.session);
        h.session.update(t + 0.2);

        assert_eq!(h.session.stats.miss, 1);
        let note = h.session.notes.iter().next().unwrap();
        assert_eq!(note.state, NoteState::Falling);
        assert_eq!(note.result, Some(Judgement::Miss));
        assert!(!note.active);

        let y = note.y;
        h.session.update(NOTE_FADE_SECONDS / 2.0);
        let note = h.session.notes.iter().next().unwrap();
        assert!(note.y > y);
        assert!(note.alpha < ALPHA_MAX);

        h.session.update(NOTE_FADE_SECONDS);
        assert!(h.session.notes.is_empty());
        assert_eq!(h.session.stats.miss, 1);
    }

    #[test]
    fn wrong_key_is_charged_once() {
        let mut h = harness(&[(1.0, NoteKind::Agudo)]);
        reach_hit_line(&mut h.session, 1.0);

        assert_eq!(h.session.judge(NoteKind::Grave), Judgement::Miss);
        assert_eq!(h.session.stats.miss, 1);
        let leader = h.session.leader().unwrap();
        assert!(leader.key_mistaken);

        h.session.update(1.0);
        assert_eq!(h.session.stats.miss, 1);
        let note = h.session.notes.iter().next().unwrap();
        assert_eq!(note.state, NoteState::Falling);
    }

    #[test]
    fn far_input_misses_without_touching_the_note() {
        let mut h = harness(&[(1.0, NoteKind::Mao)]);
        h.session.update(1.0);

        assert_eq!(h.session.judge(NoteKind::Mao), Judgement::Miss);
        let leader = h.session.leader().unwrap();
        assert!(!leader.key_mistaken);
        assert!(leader.is_scheduled());

        let t = travel(&h.session);
        h.session.update(t);
        assert_eq!(h.session.judge(NoteKind::Mao), Judgement::Perfect);
        assert_eq!(h.session.stats.miss, 1);
        assert_eq!(h.session.stats.perfect, 1);
    }

    #[test]
    fn stroke_without_leader_is_a_miss() {
        let mut h = harness(&[(5.0, NoteKind::Agudo)]);
        assert_eq!(h.session.judge(NoteKind::Agudo), Judgement::Miss);
        assert_eq!(h.session.stats.miss, 1);
        assert_eq!(h.session.queue.len(), 1);
        assert_eq!(h.session.last_judgement, Some(Judgement::Miss));
    }

    #[test]
    fn good_band_between_radii() {
        let mut h = harness(&[(1.0, NoteKind::Agudo)]);
        reach_hit_line(&mut h.session, 1.0);
        // 45 px before the line: outside the perfect band, inside 2 * hit radius.
        h.session.notes.scroll(-45.0);
        assert_eq!(h.session.judge(NoteKind::Agudo), Judgement::Good);
        assert_eq!(h.session.stats.score, 50);
    }

    #[test]
    fn chord_resolves_to_flam() {
        let mut h = harness(&[(1.0, NoteKind::Flam)]);
        reach_hit_line(&mut h.session, 1.0);

        h.session.press(DrumKey::Agudo);
        h.session.press(DrumKey::Grave);
        h.session.update(0.0);

        assert_eq!(h.session.stats.perfect, 1);
        assert_eq!(h.session.stats.miss, 0);
        assert!(h.session.leader().is_none());
    }

    #[test]
    fn single_leader_through_a_chart() {
        let chart: Vec<(f64, NoteKind)> = (0..24)
            .map(|i| (0.5 + i as f64 * 0.15, NoteKind::ALL[i % NoteKind::ALL.len()]))
            .collect();
        let mut h = harness(&chart);

        let mut frame = 0;
        while h.session.state() == SessionState::Playing && frame < 2000 {
            if frame % 3 == 0 {
                h.session.press(DrumKey::ALL[frame % DrumKey::ALL.len()]);
            }
            h.session.update(1.0 / 60.0);
            let scheduled = h.session.notes.iter().filter(|n| n.is_scheduled()).count();
            let leaders = h.session.notes.leader_count();
            assert!(leaders <= 1);
            assert_eq!(leaders == 1, scheduled > 0);
            if let Some(leader) = h.session.leader() {
                let earliest = h
                    .session
                    .notes
                    .iter()
                    .filter(|n| n.is_scheduled())
                    .map(|n| n.hit_time)
                    .fold(f64::INFINITY, f64::min);
                assert_eq!(leader.hit_time, earliest);
            }
            frame += 1;
        }

        let stats = h.session.stats();
        assert_eq!(stats.score, stats.perfect * 100 + stats.good * 50);
        assert_eq!(h.session.state(), SessionState::EndingFade);
    }

    #[test]
    fn music_starts_after_lane_travel() {
        let mut h = harness(&[(3.0, NoteKind::Agudo)]);
        let t = travel(&h.session);
        h.session.update(t - 0.1);
        assert!(h.audio.borrow().events.is_empty());
        h.session.update(0.2);
        assert_eq!(h.audio.borrow().events, vec!["play".to_string()]);
        h.session.update(0.5);
        assert_eq!(h.audio.borrow().events.len(), 1);
    }

    #[test]
    fn end_flow_records_once() {
        let mut h = harness(&[(0.5, NoteKind::Agudo)]);
        reach_hit_line(&mut h.session, 0.5);
        h.session.judge(NoteKind::Agudo);
        run_to_results(&mut h.session);

        assert_eq!(h.records.borrow().len(), 1);
        let record = h.records.borrow()[0].clone();
        assert_eq!(record.score, 100);
        assert_eq!(record.perfect_hits, 1);
        assert_eq!(record.music_name, "Samba");
        assert_eq!(h.session.results_message(), Some(MSG_SAVED));

        h.session.transition_to_results();
        assert_eq!(h.records.borrow().len(), 1);

        let events = h.audio.borrow().events.clone();
        assert!(events.contains(&"fade_out".to_string()));
        assert_eq!(events.last().map(String::as_str), Some("stop"));

        // Gameplay input is inert on the results screen.
        h.session.press(DrumKey::Agudo);
        assert_eq!(h.session.update(0.1), SessionSignal::Continue);
        assert_eq!(h.session.stats.judged(), 1);

        assert!(h.session.confirm());
        assert_eq!(h.session.state(), SessionState::Leaving);
        assert_eq!(h.session.update(LEAVE_FADE_SECONDS), SessionSignal::Exit);
        assert!(h.session.is_finished());
    }

    #[test]
    fn empty_chart_ends_right_away() {
        let mut h = harness(&[]);
        h.session.update(0.016);
        assert_eq!(h.session.state(), SessionState::EndingFade);
        h.session.update(END_FADE_SECONDS);
        assert_eq!(h.session.state(), SessionState::ShowResults);
        assert!(!h.audio.borrow().events.contains(&"play".to_string()));
    }

    #[test]
    fn failed_save_is_reported() {
        let mut h = harness_with(Vec::new(), Some(player()), true);
        run_to_results(&mut h.session);
        assert_eq!(h.session.results_message(), Some(MSG_SAVE_FAILED));
    }

    #[test]
    fn guest_run_is_not_recorded() {
        let mut h = harness_with(Vec::new(), None, false);
        run_to_results(&mut h.session);
        assert!(h.records.borrow().is_empty());
        assert_eq!(h.session.results_message(), Some(MSG_GUEST));
    }

    #[test]
    fn abort_stops_everything() {
        let mut h = harness(&[(1.0, NoteKind::Agudo)]);
        h.session.update(0.5);
        h.session.abort();
        assert!(h.session.is_finished());
        assert_eq!(h.session.update(5.0), SessionSignal::Exit);
        assert_eq!(h.audio.borrow().events, vec!["stop".to_string()]);
        assert!(h.records.borrow().is_empty());
    }

    #[test]
    fn confirm_is_ignored_while_playing() {
        let mut h = harness(&[(1.0, NoteKind::Agudo)]);
        assert!(!h.session.confirm());
        assert_eq!(h.session.state(), SessionState::Playing);
    }
}
