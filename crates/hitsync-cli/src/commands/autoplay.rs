//! Scripted play command.

use std::path::Path;
use std::sync::Arc;
use std::thread;

use anyhow::{Result, bail};
use hitsync::{ChartNote, DeviceClock, MonotonicClock, StopSignal};
use tracing::{debug, info};

use super::{FRAME, Prepared, prepare_session};
use crate::config::AppConfig;
use crate::display::{self, ConsoleUi};

/// One scripted press
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptedPress {
    pub lane: usize,
    pub song_time: f64,
}

/// Press every note at `hit_time + offset` in hit order, leaving out every
/// `skip_every`-th note.
pub fn script(
    notes: &[ChartNote],
    offset: f64,
    skip_every: Option<usize>,
) -> Vec<ScriptedPress> {
    let mut order: Vec<usize> = (0..notes.len()).collect();
    order.sort_by(|&a, &b| notes[a].hit_time.total_cmp(&notes[b].hit_time));

    order
        .into_iter()
        .enumerate()
        .filter(|(position, _)| !matches!(skip_every, Some(k) if (position + 1) % k == 0))
        .map(|(_, index)| ScriptedPress {
            lane: notes[index].lane,
            song_time: notes[index].hit_time + offset,
        })
        .collect()
}

/// Play a chart with a scripted player thread
pub fn run(
    app: &AppConfig,
    chart_path: &Path,
    level: Option<&str>,
    offset_ms: i64,
    skip_every: Option<usize>,
) -> Result<()> {
    if skip_every == Some(0) {
        bail!("--skip-every must be at least 1");
    }

    let stop = Arc::new(StopSignal::new());
    let stop_ctrlc = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        stop_ctrlc.stop();
    })?;

    let clock: Arc<dyn DeviceClock> = Arc::new(MonotonicClock::new());
    let Prepared {
        mut session,
        level_id,
        store,
    } = prepare_session(
        app,
        chart_path,
        level,
        Arc::clone(&clock),
        Arc::new(ConsoleUi::new()),
    )?;

    let presses = script(session.chart().notes(), offset_ms as f64 / 1000.0, skip_every);
    println!(
        "Autoplay `{}`: {} of {} notes pressed {:+} ms from their hit time",
        session.chart().song_name(),
        presses.len(),
        session.chart().len(),
        offset_ms
    );

    let anchor = session.start()?;
    let player = {
        let judge = session.judge();
        let stop = Arc::clone(&stop);
        let clock = Arc::clone(&clock);
        thread::spawn(move || {
            for press in presses {
                if stop.wait_until(clock.as_ref(), anchor + press.song_time) {
                    break;
                }
                let judgement = judge.press(press.lane);
                debug!("Scripted press {:?} -> {:?}", press, judgement);
            }
        })
    };

    let result = session.run(&stop, FRAME, |_, _, _| {});
    stop.stop();
    let _ = player.join();
    let stats = result?;

    println!();
    println!("{}", display::format_summary(&level_id, &stats));
    if session.final_stats().is_some() {
        println!("Saved to: {}", store.path().display());
    }

    Ok(())
}
