//! The game engine: the heart of THERMOS-4.
//!
//! TIMER ORDER at a shared instant (fixed, see scheduler.rs):
//!   1. Intro dwell (LORE, BOOT)
//!   2. Passive drain
//!   3. Rift hazard scan
//!   4. Mini-game trigger
//!   5. Capture resolution
//!   6. Narration poll / deadline
//!   7. Mini-game mechanics (frame, playback, highlight, settle)
//!   8. Ending reveal step
//!
//! RULES:
//!   - The engine is the only writer of session state.
//!   - All randomness flows through the injected RandomSource.
//!   - Every resource mutation in ACTIVE or MINIGAME is followed by a
//!     death check (oxygen, then energy, then heat).
//!   - Leaving a phase cancels the timers that phase owns.
//!   - Invalid intents are silent no-ops.

use crate::{
    anomaly::Survey,
    audio::{AudioError, AudioSink, Cue, SilentAudio},
    capture::{
        self, CaptureProtocol, CaptureStage, CaptureVerdict, MSG_COLLAPSING, MSG_MISALIGNED,
    },
    clock::SessionClock,
    config::GameConfig,
    error::GameResult,
    event::GameEvent,
    intent::PlayerIntent,
    minigame::{
        MiniGame, MiniGameKind, PlaybackStep, SequenceInput, SequenceMechanic, TimingMechanic,
    },
    narrator::{CannedNarrator, NarrationError, NarrationRequest, NarrationTicket, Narrator},
    phase::Phase,
    resources::{DeathCause, Resources},
    rift::RiftField,
    rng::{RandomSource, SeededRng},
    scheduler::{Scheduler, TimerGroup, TimerKind},
    snapshot::{MiniGameView, PhotoRecord, SessionSnapshot},
    terminal::{LogSource, TerminalLog},
    types::{Direction, GridPos, Millis, SessionId},
};

pub const MSG_SYSTEM_READY: &str = "THERMOS-4 SYSTEM INITIALIZED";
pub const MSG_WELCOME: &str = "WELCOME PILOT. COMMENCING INDEXING.";
pub const MSG_OVERRIDE_OK: &str = "OVERRIDE SUCCESSFUL";
pub const MSG_OVERRIDE_FAILED: &str = "OVERRIDE FAILED: RESOURCE LOSS";

/// An instruction request still waiting on the narrator.
struct PendingInstruction {
    ticket:  NarrationTicket,
    request: NarrationRequest,
}

pub struct GameEngine {
    pub session_id: SessionId,
    pub clock:      SessionClock,
    config:         GameConfig,
    scheduler:      Scheduler,
    rng:            Box<dyn RandomSource>,
    narrator:       Box<dyn Narrator>,
    audio:          Box<dyn AudioSink>,

    phase:        Phase,
    paused_from:  Option<Phase>,
    position:     GridPos,
    resources:    Resources,
    death_cause:  Option<DeathCause>,
    survey:       Survey,
    rifts:        RiftField,
    colliding:    bool,
    capture:      CaptureProtocol,
    minigame:     Option<MiniGame>,
    photo:        Option<PhotoRecord>,
    instructions: Vec<PendingInstruction>,
    terminal:     TerminalLog,
    volume:       f32,
    /// Reveal steps shown since ENDING began.
    ending_step:  u8,

    events: Vec<GameEvent>,
}

impl GameEngine {
    /// Wire an engine from explicit collaborators. The session starts in
    /// LORE with the intro dwell armed.
    pub fn new(
        session_id: SessionId,
        config:     GameConfig,
        rng:        Box<dyn RandomSource>,
        narrator:   Box<dyn Narrator>,
        audio:      Box<dyn AudioSink>,
    ) -> GameResult<Self> {
        config.validate()?;

        let mut engine = Self {
            session_id,
            clock:        SessionClock::new(),
            scheduler:    Scheduler::new(),
            rng,
            narrator,
            audio,
            phase:        Phase::Lore,
            paused_from:  None,
            position:     config.start,
            resources:    Resources::initial(&config.resources),
            death_cause:  None,
            survey:       Survey::from_config(&config.anomalies),
            rifts:        RiftField::from_config(&config.rifts),
            colliding:    false,
            capture:      CaptureProtocol::new(),
            minigame:     None,
            photo:        None,
            instructions: Vec::new(),
            terminal:     TerminalLog::new(config.log_capacity),
            volume:       config.volume.clamp(0.0, 1.0),
            ending_step:  0,
            events:       Vec::new(),
            config,
        };

        let volume = engine.volume;
        engine.audio_call(|a| a.set_volume(volume));
        engine.scheduler.schedule_once(0, engine.config.timing.lore_dwell_ms, TimerKind::LoreDwell);
        log::info!("session {} created in LORE", engine.session_id);
        Ok(engine)
    }

    /// Build an engine with the seeded RNG, the offline narrator and no audio.
    pub fn build(session_id: SessionId, seed: u64, config: GameConfig) -> GameResult<Self> {
        Self::new(
            session_id,
            config,
            Box::new(SeededRng::new(seed)),
            Box::new(CannedNarrator::new()),
            Box::new(SilentAudio),
        )
    }

    /// Seeded engine over the hazard-free test config.
    pub fn build_test(seed: u64) -> GameResult<Self> {
        Self::build(format!("test-{seed}"), seed, GameConfig::default_test())
    }

    // ── Driving the simulation ─────────────────────────────

    /// Advance virtual time by `dt` ms, firing every timer that falls due.
    /// Does nothing while paused. Time stops at `Millis::MAX`.
    pub fn advance(&mut self, dt: Millis) -> Vec<GameEvent> {
        if !self.clock.paused {
            let target = self.clock.now_ms.saturating_add(dt);
            while let Some((due, kind)) = self.scheduler.pop_due(target) {
                self.clock.advance_to(due);
                self.fire(kind);
            }
            self.clock.advance_to(target);
        }
        std::mem::take(&mut self.events)
    }

    /// Apply one player intent at the current instant.
    pub fn handle(&mut self, intent: PlayerIntent) -> Vec<GameEvent> {
        match intent {
            PlayerIntent::Move { direction } => self.move_probe(direction),
            PlayerIntent::Capture => self.start_capture(),
            PlayerIntent::AcknowledgePhoto => self.acknowledge_photo(),
            PlayerIntent::TimingTrigger => self.timing_trigger(),
            PlayerIntent::SequenceInput { symbol } => self.sequence_input(symbol),
            PlayerIntent::Pause => self.pause(),
            PlayerIntent::Resume => self.resume(),
            PlayerIntent::SetVolume { volume } => self.set_volume(volume),
            PlayerIntent::Reset => self.reset(),
        }
        std::mem::take(&mut self.events)
    }

    fn fire(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::LoreDwell => {
                self.set_phase(Phase::Boot);
                self.scheduler.schedule_once(
                    self.clock.now_ms,
                    self.config.timing.boot_dwell_ms,
                    TimerKind::BootDwell,
                );
            }
            TimerKind::BootDwell => self.finish_boot(),
            TimerKind::Drain => self.drain_tick(),
            TimerKind::Hazard => self.hazard_tick(),
            TimerKind::MiniGameTrigger => self.roll_minigame(),
            TimerKind::CaptureResolve => self.resolve_capture(),
            TimerKind::NarrationPoll => self.poll_narrations(),
            TimerKind::NarrationDeadline(ticket) => self.narration_deadline(ticket),
            TimerKind::MarkerFrame => {
                if let Some(MiniGame::Timing(m)) = &mut self.minigame {
                    m.frame();
                }
            }
            TimerKind::PlaybackStep => self.playback_step(),
            TimerKind::HighlightOff => {
                if let Some(MiniGame::Sequence(m)) = &mut self.minigame {
                    m.highlight_off();
                }
            }
            TimerKind::SequenceSettle => {
                let outcome = match &mut self.minigame {
                    Some(MiniGame::Sequence(m)) => m.settle(),
                    _ => None,
                };
                if let Some(success) = outcome {
                    self.resolve_minigame(success);
                }
            }
            TimerKind::EndingStep => self.ending_advance(),
        }
    }

    // ── Phase machine ──────────────────────────────────────

    /// Move to `to`, arming and cancelling the timers each side owns.
    /// Pause and reset do not come through here.
    fn set_phase(&mut self, to: Phase) {
        let from = self.phase;
        if from == to {
            return;
        }
        debug_assert!(from.can_transition(to), "illegal transition {from:?} -> {to:?}");
        self.phase = to;
        let now = self.clock.now_ms;
        let timing = &self.config.timing;

        if from.is_in_play() && !to.is_in_play() {
            self.scheduler.cancel_kind(TimerKind::Drain);
            self.scheduler.cancel_kind(TimerKind::Hazard);
            self.colliding = false;
        }
        if !from.is_in_play() && to.is_in_play() {
            self.scheduler.schedule_every(now, timing.drain_period_ms, TimerKind::Drain);
            self.scheduler.schedule_every(now, timing.hazard_period_ms, TimerKind::Hazard);
        }
        if from == Phase::Active {
            self.scheduler.cancel_kind(TimerKind::MiniGameTrigger);
        }
        if to == Phase::Active {
            self.scheduler
                .schedule_every(now, timing.minigame_interval_ms, TimerKind::MiniGameTrigger);
        }
        if from == Phase::MiniGame {
            self.scheduler.cancel_group(TimerGroup::MiniGame);
            self.minigame = None;
        }
        if to.is_terminal() {
            self.abandon_narrations();
            self.scheduler.clear();
            self.capture.finish();
            self.audio_call(|a| a.stop_music());
        }
        if to == Phase::Ending {
            for &offset in &self.config.timing.ending_steps_ms {
                self.scheduler.schedule_once(now, offset, TimerKind::EndingStep);
            }
        }

        log::info!("t={now} phase {from:?} -> {to:?}");
        self.events.push(GameEvent::PhaseChanged { at: now, from, to });
    }

    fn finish_boot(&mut self) {
        self.set_phase(Phase::Active);
        self.log(LogSource::System, MSG_SYSTEM_READY);
        self.log(LogSource::Corp, MSG_WELCOME);
        self.audio_call(|a| a.start_music());
        self.request_instruction();
    }

    fn ending_advance(&mut self) {
        if self.phase != Phase::Ending {
            return;
        }
        self.ending_step = self.ending_step.saturating_add(1);
        log::debug!("t={} ending step {}", self.clock.now_ms, self.ending_step);
        let step = self.ending_step;
        self.events.push(GameEvent::EndingAdvanced { at: self.clock.now_ms, step });
    }

    fn check_death(&mut self) {
        if !self.phase.is_in_play() {
            return;
        }
        if let Some(cause) = self.resources.death_cause(&self.config.resources) {
            log::warn!("t={} probe lost: {}", self.clock.now_ms, cause.message());
            self.death_cause = Some(cause);
            self.set_phase(Phase::Death);
            self.audio_call(|a| a.play(Cue::Death));
            self.events.push(GameEvent::Died { at: self.clock.now_ms, cause });
        }
    }

    fn pause(&mut self) {
        if !self.phase.can_pause() {
            return;
        }
        let from = self.phase;
        self.paused_from = Some(from);
        self.phase = Phase::Paused;
        self.clock.pause();
        self.events.push(GameEvent::PhaseChanged { at: self.clock.now_ms, from, to: Phase::Paused });
    }

    fn resume(&mut self) {
        if self.phase != Phase::Paused {
            return;
        }
        let Some(to) = self.paused_from.take() else {
            return;
        };
        self.phase = to;
        self.clock.resume();
        self.events.push(GameEvent::PhaseChanged { at: self.clock.now_ms, from: Phase::Paused, to });
    }

    /// Back to BOOT with every field at its initial value. Legal from any phase.
    pub fn reset(&mut self) {
        let from = self.phase;
        let now = self.clock.now_ms;

        self.abandon_narrations();
        self.scheduler.clear();
        self.clock.resume();
        self.paused_from = None;
        self.position = self.config.start;
        self.resources = Resources::initial(&self.config.resources);
        self.death_cause = None;
        self.survey.reset();
        self.colliding = false;
        self.capture.finish();
        self.minigame = None;
        self.photo = None;
        self.terminal.clear();
        self.ending_step = 0;

        self.phase = Phase::Boot;
        self.scheduler.schedule_once(now, self.config.timing.boot_dwell_ms, TimerKind::BootDwell);

        log::info!("t={now} session {} reset from {from:?}", self.session_id);
        self.events.push(GameEvent::SessionReset { at: now });
        self.events.push(GameEvent::PhaseChanged { at: now, from, to: Phase::Boot });
    }

    // ── Resource ticks ─────────────────────────────────────

    fn drain_tick(&mut self) {
        self.resources.passive_tick(&self.config.resources);
        log::debug!(
            "t={} drain: o2={:.2} energy={:.2} heat={:.2}",
            self.clock.now_ms,
            self.resources.oxygen,
            self.resources.energy,
            self.resources.heat
        );
        self.check_death();
    }

    fn hazard_tick(&mut self) {
        let scan = self.rifts.scan(self.position);
        self.resources.rift_exposure(scan.count(), &self.config.resources);

        if scan.any() != self.colliding {
            self.colliding = scan.any();
            if self.colliding {
                log::debug!("t={} inside rifts {:?}", self.clock.now_ms, scan.colliding);
                self.audio_call(|a| a.play(Cue::Warning));
            }
            self.events.push(GameEvent::RiftContact {
                at:        self.clock.now_ms,
                colliding: self.colliding,
            });
        }
        self.check_death();
    }

    fn move_probe(&mut self, direction: Direction) {
        if self.phase != Phase::Active {
            return;
        }
        let (dx, dy) = direction.delta();
        let max = self.config.grid_size - 1;
        let to = GridPos::new(
            (self.position.x + dx).clamp(0, max),
            (self.position.y + dy).clamp(0, max),
        );
        if to == self.position {
            return;
        }
        self.position = to;
        self.resources.move_cost(&self.config.resources);
        self.audio_call(|a| a.play(Cue::Move));
        self.log(LogSource::System, format!("MOVE: [{}, {}]", to.x, to.y));
        self.events.push(GameEvent::Moved { at: self.clock.now_ms, to });
        self.check_death();
    }

    // ── Capture ────────────────────────────────────────────

    fn start_capture(&mut self) {
        if self.phase != Phase::Active {
            return;
        }
        let Some(target_id) = self.survey.target().map(|t| t.id.clone()) else {
            return;
        };
        if !self.capture.begin() {
            return;
        }
        self.log(LogSource::System, MSG_COLLAPSING);
        self.audio_call(|a| a.play(Cue::Capture));
        self.scheduler.schedule_once(
            self.clock.now_ms,
            self.config.timing.capture_delay_ms,
            TimerKind::CaptureResolve,
        );
        self.events.push(GameEvent::CaptureStarted { at: self.clock.now_ms, target_id });
    }

    fn resolve_capture(&mut self) {
        let now = self.clock.now_ms;
        let target = match self.survey.target() {
            Some(t) if self.phase == Phase::Active => t,
            _ => {
                self.capture.finish();
                return;
            }
        };

        match capture::evaluate(self.position, target, self.config.capture_range) {
            CaptureVerdict::Misaligned { distance } => {
                self.log(LogSource::System, MSG_MISALIGNED);
                self.events.push(GameEvent::CaptureMissed { at: now, distance });
                self.capture.finish();
            }
            CaptureVerdict::Final => {
                log::info!("t={now} final anomaly reached");
                self.events.push(GameEvent::FinalReached { at: now });
                self.set_phase(Phase::Ending);
            }
            CaptureVerdict::Acquired => {
                let request = NarrationRequest::Describe { subject: target.name.clone() };
                let anomaly_index = self.survey.target_index();
                let ticket = self.narrator.request(request);
                self.capture.await_description(ticket, anomaly_index);
                self.arm_narration(ticket);
                self.poll_narrations();
            }
        }
    }

    fn complete_capture(&mut self, reply: Result<String, NarrationError>) {
        let CaptureStage::AwaitingDescription { ticket, anomaly_index } = self.capture.stage()
        else {
            return;
        };
        self.scheduler.cancel_kind(TimerKind::NarrationDeadline(ticket));
        if anomaly_index != self.survey.target_index() {
            let now = self.clock.now_ms;
            log::warn!("t={now} dropping description for stale target {anomaly_index}");
            self.capture.finish();
            return;
        }
        let Some(target) = self.survey.target() else {
            self.capture.finish();
            return;
        };
        let request = NarrationRequest::Describe { subject: target.name.clone() };
        let description = request.resolve(reply);
        let record = PhotoRecord {
            anomaly_id:  target.id.clone(),
            name:        target.name.clone(),
            description: description.clone(),
        };

        self.survey.record_capture(description.clone());
        self.set_phase(Phase::PhotoView);
        self.resources.capture_reward(&self.config.resources);
        self.capture.finish();

        log::info!("t={} captured {}", self.clock.now_ms, record.anomaly_id);
        self.events.push(GameEvent::AnomalyCaptured {
            at:          self.clock.now_ms,
            anomaly_id:  record.anomaly_id.clone(),
            description,
        });
        self.photo = Some(record);
    }

    fn acknowledge_photo(&mut self) {
        if self.phase != Phase::PhotoView {
            return;
        }
        self.photo = None;
        self.audio_call(|a| a.play(Cue::Click));
        self.set_phase(Phase::Active);
        self.request_instruction();
    }

    // ── Narration ──────────────────────────────────────────

    fn request_instruction(&mut self) {
        let Some(target_id) = self.survey.target().map(|t| t.id.clone()) else {
            return;
        };
        let request = NarrationRequest::Instruction { target_id };
        let ticket = self.narrator.request(request.clone());
        self.instructions.push(PendingInstruction { ticket, request });
        self.arm_narration(ticket);
        self.poll_narrations();
    }

    fn arm_narration(&mut self, ticket: NarrationTicket) {
        let now = self.clock.now_ms;
        let timing = &self.config.timing;
        self.scheduler
            .schedule_once(now, timing.narration_deadline_ms, TimerKind::NarrationDeadline(ticket));
        if !self.scheduler.is_scheduled(TimerKind::NarrationPoll) {
            self.scheduler.schedule_every(now, timing.narration_poll_ms, TimerKind::NarrationPoll);
        }
    }

    fn poll_narrations(&mut self) {
        if let Some(ticket) = self.capture.pending_ticket() {
            if let Some(reply) = self.narrator.poll(ticket) {
                self.complete_capture(reply);
            }
        }

        let mut i = 0;
        while i < self.instructions.len() {
            let ticket = self.instructions[i].ticket;
            match self.narrator.poll(ticket) {
                Some(reply) => {
                    let pending = self.instructions.remove(i);
                    self.scheduler.cancel_kind(TimerKind::NarrationDeadline(ticket));
                    let text = pending.request.resolve(reply);
                    self.log(LogSource::Corp, text);
                }
                None => i += 1,
            }
        }

        if self.capture.pending_ticket().is_none() && self.instructions.is_empty() {
            self.scheduler.cancel_kind(TimerKind::NarrationPoll);
        }
    }

    fn narration_deadline(&mut self, ticket: NarrationTicket) {
        log::warn!("t={} narration {ticket:?} timed out", self.clock.now_ms);
        self.narrator.cancel(ticket);

        if self.capture.pending_ticket() == Some(ticket) {
            self.complete_capture(Err(NarrationError::Timeout));
        } else if let Some(pos) = self.instructions.iter().position(|p| p.ticket == ticket) {
            let pending = self.instructions.remove(pos);
            let text = pending.request.resolve(Err(NarrationError::Timeout));
            self.log(LogSource::Corp, text);
        }

        if self.capture.pending_ticket().is_none() && self.instructions.is_empty() {
            self.scheduler.cancel_kind(TimerKind::NarrationPoll);
        }
    }

    fn abandon_narrations(&mut self) {
        if let Some(ticket) = self.capture.pending_ticket() {
            self.narrator.cancel(ticket);
        }
        for pending in self.instructions.drain(..) {
            self.narrator.cancel(pending.ticket);
        }
    }

    // ── Mini-games ─────────────────────────────────────────

    fn roll_minigame(&mut self) {
        if self.phase != Phase::Active || self.minigame.is_some() || self.capture.is_capturing() {
            return;
        }
        if !self.rng.chance(self.config.timing.minigame_probability) {
            return;
        }
        let kind = if self.rng.chance(0.5) { MiniGameKind::Timing } else { MiniGameKind::Sequence };
        self.spawn_minigame(kind);
    }

    fn spawn_minigame(&mut self, kind: MiniGameKind) {
        let now = self.clock.now_ms;
        let cfg = &self.config.minigame;
        let game = match kind {
            MiniGameKind::Timing => {
                self.scheduler.schedule_every(now, cfg.frame_period_ms, TimerKind::MarkerFrame);
                MiniGame::Timing(TimingMechanic::new(cfg))
            }
            MiniGameKind::Sequence => {
                self.scheduler.schedule_every(now, cfg.playback_step_ms, TimerKind::PlaybackStep);
                MiniGame::Sequence(SequenceMechanic::new(cfg, self.rng.as_mut()))
            }
        };

        self.set_phase(Phase::MiniGame);
        self.minigame = Some(game);
        self.audio_call(|a| a.play(Cue::Warning));
        self.log(LogSource::System, format!("OVERRIDE REQUIRED: {}", kind.title()));
        self.events.push(GameEvent::MiniGameSpawned { at: now, kind });
    }

    fn playback_step(&mut self) {
        let Some(MiniGame::Sequence(m)) = &mut self.minigame else {
            return;
        };
        match m.playback_step() {
            PlaybackStep::Show(_) => {
                self.scheduler.schedule_once(
                    self.clock.now_ms,
                    self.config.minigame.highlight_ms,
                    TimerKind::HighlightOff,
                );
            }
            PlaybackStep::Done => {
                self.scheduler.cancel_kind(TimerKind::PlaybackStep);
            }
        }
    }

    fn timing_trigger(&mut self) {
        if self.phase != Phase::MiniGame {
            return;
        }
        let outcome = match &mut self.minigame {
            Some(MiniGame::Timing(m)) => m.trigger(),
            _ => None,
        };
        if let Some(success) = outcome {
            self.resolve_minigame(success);
        }
    }

    fn sequence_input(&mut self, symbol: u8) {
        if self.phase != Phase::MiniGame {
            return;
        }
        let result = match &mut self.minigame {
            Some(MiniGame::Sequence(m)) => m.input(symbol),
            _ => return,
        };
        self.audio_call(|a| a.play(Cue::Click));
        match result {
            SequenceInput::Failed => self.resolve_minigame(false),
            SequenceInput::Settling => {
                self.scheduler.schedule_once(
                    self.clock.now_ms,
                    self.config.minigame.settle_ms,
                    TimerKind::SequenceSettle,
                );
            }
            SequenceInput::Accepted | SequenceInput::Ignored => {}
        }
    }

    /// Outcome is in: apply consequences, then return to ACTIVE.
    fn resolve_minigame(&mut self, success: bool) {
        let Some(kind) = self.minigame.as_ref().map(MiniGame::kind) else {
            return;
        };
        self.scheduler.cancel_group(TimerGroup::MiniGame);
        self.resources.apply_override(kind, success, &self.config.resources);
        self.log(LogSource::System, if success { MSG_OVERRIDE_OK } else { MSG_OVERRIDE_FAILED });
        self.events.push(GameEvent::MiniGameResolved { at: self.clock.now_ms, kind, success });

        self.check_death();
        if self.phase == Phase::MiniGame {
            self.set_phase(Phase::Active);
        }
    }

    // ── Misc ───────────────────────────────────────────────

    fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { self.volume };
        self.volume = volume;
        self.audio_call(|a| a.set_volume(volume));
    }

    fn audio_call(&mut self, f: impl FnOnce(&mut dyn AudioSink) -> Result<(), AudioError>) {
        let sink: &mut dyn AudioSink = self.audio.as_mut();
        if let Err(e) = f(sink) {
            log::debug!("audio ignored: {e}");
        }
    }

    fn log(&mut self, source: LogSource, message: impl Into<String>) {
        self.terminal.push(self.clock.timestamp(), source, message);
    }

    /// Overwrite the resource levels, clamped and death-checked like any
    /// other mutation. Used by scenario tooling and tests.
    pub fn set_resources(&mut self, resources: Resources) {
        self.resources = resources.clamped(&self.config.resources);
        self.check_death();
    }

    // ── Read access ────────────────────────────────────────

    pub fn phase(&self) -> Phase { self.phase }
    pub fn paused_from(&self) -> Option<Phase> { self.paused_from }
    pub fn position(&self) -> GridPos { self.position }
    pub fn resources(&self) -> Resources { self.resources }
    pub fn death_cause(&self) -> Option<DeathCause> { self.death_cause }
    pub fn survey(&self) -> &Survey { &self.survey }
    pub fn rifts(&self) -> &RiftField { &self.rifts }
    pub fn is_capturing(&self) -> bool { self.capture.is_capturing() }
    pub fn is_colliding(&self) -> bool { self.colliding }
    pub fn minigame(&self) -> Option<&MiniGame> { self.minigame.as_ref() }
    pub fn photo(&self) -> Option<&PhotoRecord> { self.photo.as_ref() }
    pub fn terminal(&self) -> &TerminalLog { &self.terminal }
    pub fn volume(&self) -> f32 { self.volume }
    pub fn ending_step(&self) -> u8 { self.ending_step }
    pub fn config(&self) -> &GameConfig { &self.config }
    pub fn scheduler(&self) -> &Scheduler { &self.scheduler }

    pub fn snapshot(&self) -> SessionSnapshot {
        let minigame = self.minigame.as_ref().map(|g| match g {
            MiniGame::Timing(m) => MiniGameView::Timing {
                marker:      m.marker(),
                window_low:  self.config.minigame.window_low,
                window_high: self.config.minigame.window_high,
            },
            MiniGame::Sequence(m) => MiniGameView::Sequence {
                highlighted:   m.highlighted(),
                entered:       m.entered().len(),
                length:        m.sequence().len(),
                alphabet_size: m.alphabet_size(),
                playback_done: m.playback_done(),
            },
        });

        SessionSnapshot {
            session_id:   self.session_id.clone(),
            now_ms:       self.clock.now_ms,
            phase:        self.phase,
            paused_from:  self.paused_from,
            position:     self.position,
            resources:    self.resources,
            death_cause:  self.death_cause.map(|c| c.message().to_string()),
            target_index: self.survey.target_index(),
            capturing:    self.capture.is_capturing(),
            colliding:    self.colliding,
            volume:       self.volume,
            anomalies:    self.survey.anomalies().to_vec(),
            rifts:        self.rifts.rifts().to_vec(),
            logs:         self.terminal.entries().cloned().collect(),
            minigame,
            photo:        self.photo.clone(),
            ending_step:  self.ending_step,
        }
    }
}
