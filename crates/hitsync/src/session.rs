//! Session composition and driver loop.
//!
//! A [`Session`] owns everything one play of one chart needs: the frozen
//! chart with its per-note slots, the anchor clock, the statistics tracker,
//! the judgement engine and the lifecycle scheduler. It is built from an
//! explicit [`SessionConfig`]; nothing is read from global state.

use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use tracing::{debug, info};

use crate::assets::{AudioHandle, AudioResolver, SpriteResolver, VisualTable};
use crate::chart::Chart;
use crate::clock::{AnchorClock, DeviceClock};
use crate::config::SessionConfig;
use crate::error::{LoadError, Result};
use crate::judge::{Judge, Playfield};
use crate::persist::ScoreSink;
use crate::schedule::{NotePosition, Scheduler, TickReport};
use crate::signal::StopSignal;
use crate::stats::{SessionStats, StatsTracker};
use crate::ui::{UiSink, UiSnapshot};

pub struct Session {
    config: SessionConfig,
    audio: AudioHandle,
    clock: Arc<dyn DeviceClock>,
    anchor: Arc<AnchorClock>,
    field: Arc<Playfield>,
    stats: Arc<StatsTracker>,
    judge: Judge,
    scheduler: Scheduler,
}

impl Session {
    /// Validate the configuration, resolve assets and wire the engine together.
    ///
    /// Fails with a `ConfigError` for bad windows or geometry, a `LoadError`
    /// for notes outside the configured lanes and an `AssetError` when the
    /// song's audio cannot be found. Missing sprites are not an error.
    pub fn new(
        config: SessionConfig,
        chart: Chart,
        clock: Arc<dyn DeviceClock>,
        audio: &dyn AudioResolver,
        sprites: &dyn SpriteResolver,
        sink: Arc<dyn ScoreSink>,
        ui: Arc<dyn UiSink>,
    ) -> Result<Self> {
        config.validate()?;

        let lane_count = config.lane_count();
        if let Some((index, note)) = chart
            .notes()
            .iter()
            .enumerate()
            .find(|(_, note)| note.lane >= lane_count)
        {
            return Err(LoadError::malformed(format!(
                "note {index}: lane {} outside 0..{lane_count}",
                note.lane
            ))
            .into());
        }

        let audio = audio.resolve_clip(chart.song_name())?;
        let visuals = VisualTable::resolve(&chart, sprites);

        let total = chart.len();
        let field = Arc::new(Playfield::new(chart, lane_count));
        let stats = Arc::new(StatsTracker::new(config.level_id.clone(), total, ui, sink));
        let anchor = Arc::new(AnchorClock::new(Arc::clone(&clock)));
        let (tx, rx) = mpsc::channel();

        let judge = Judge::new(
            Arc::clone(&field),
            config.windows,
            config.timing.global_offset,
            Arc::clone(&stats),
            Arc::clone(&anchor),
            tx,
        );
        let scheduler = Scheduler::new(
            Arc::clone(&field),
            Arc::clone(&stats),
            visuals,
            config.layout.clone(),
            config.timing.global_offset + config.windows.late,
            rx,
        );

        info!(
            "Session `{}` ready: song `{}`, {} notes in {} lanes",
            config.level_id,
            field.chart().song_name(),
            total,
            lane_count
        );

        Ok(Self {
            config,
            audio,
            clock,
            anchor,
            field,
            stats,
            judge,
            scheduler,
        })
    }

    /// Publish the anchor `start_lead` seconds from now and return it.
    ///
    /// A session starts once; a second call fails with `AlreadyStarted`.
    pub fn start(&self) -> Result<f64> {
        let anchor = self.anchor.anchor_in(self.config.timing.start_lead)?;
        info!(
            "Session `{}` anchored at device time {:.3}",
            self.config.level_id, anchor
        );

        if self.stats.finalize_if_complete() {
            debug!("Empty chart finalized at start");
        }
        Ok(anchor)
    }

    /// Handle for delivering lane presses, usable from any thread.
    pub fn judge(&self) -> Judge {
        self.judge.clone()
    }

    /// Current song time, or `None` before [`Session::start`].
    pub fn song_time(&self) -> Option<f64> {
        self.anchor.song_time()
    }

    /// Advance the scheduler to the current song time.
    pub fn tick(&mut self) -> TickReport {
        match self.song_time() {
            Some(song_time) => self.scheduler.tick(song_time),
            None => TickReport::default(),
        }
    }

    /// Advance the scheduler to an explicit song time.
    pub fn tick_at(&mut self, song_time: f64) -> TickReport {
        self.scheduler.tick(song_time)
    }

    pub fn positions(&self, song_time: f64) -> Vec<NotePosition> {
        self.scheduler.positions(song_time)
    }

    /// All lifecycles have terminated.
    pub fn is_complete(&self) -> bool {
        self.scheduler.is_complete()
    }

    /// Drive the session until every lifecycle terminates and the statistics
    /// are finalized, or until `stop` fires.
    ///
    /// Starts the session if needed. The loop sleeps until the earlier of the
    /// next scheduled wake and the next frame, then ticks at the song time
    /// read from the clock at that moment; `on_frame` runs after every tick.
    /// A note the judge resolved may still be awaiting its report from the
    /// input thread, so completion alone does not end the loop.
    /// Returns the final statistics, or the current ones when stopped early.
    pub fn run<F>(
        &mut self,
        stop: &StopSignal,
        frame: Duration,
        mut on_frame: F,
    ) -> Result<SessionStats>
    where
        F: FnMut(&Session, f64, &TickReport),
    {
        let anchor = match self.anchor.anchor() {
            Some(anchor) => anchor,
            None => self.start()?,
        };
        let frame = frame.as_secs_f64();

        loop {
            let song_time = self.clock.now() - anchor;
            let report = self.scheduler.tick(song_time);
            on_frame(self, song_time, &report);

            if self.is_complete() && self.stats.is_finalized() {
                break;
            }

            let next_frame = song_time + frame;
            let next = self
                .scheduler
                .next_wake()
                .map_or(next_frame, |wake| wake.min(next_frame));
            if stop.wait_until(self.clock.as_ref(), anchor + next) {
                info!(
                    "Session `{}` stopped with {} of {} notes resolved",
                    self.config.level_id,
                    self.stats.stats().resolved(),
                    self.field.len()
                );
                break;
            }
        }

        Ok(self.final_stats().unwrap_or_else(|| self.stats()))
    }

    pub fn stats(&self) -> SessionStats {
        self.stats.stats()
    }

    pub fn snapshot(&self) -> UiSnapshot {
        self.stats.snapshot()
    }

    /// Statistics frozen at finalization, once every note has an outcome.
    pub fn final_stats(&self) -> Option<SessionStats> {
        self.stats.final_stats()
    }

    pub fn chart(&self) -> &Chart {
        self.field.chart()
    }

    pub fn audio(&self) -> &AudioHandle {
        &self.audio
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("level_id", &self.config.level_id)
            .field("audio", &self.audio)
            .field("anchor", &self.anchor)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}
