//! Keyboard play command.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use hitsync::{DeviceClock, MonotonicClock, StopSignal};
use tracing::info;

use super::{FRAME, Prepared, prepare_session};
use crate::config::AppConfig;
use crate::display::{self, ConsoleUi};
use crate::input::{self, RawModeGuard};

/// Play a chart with the keyboard
pub fn run(app: &AppConfig, chart_path: &Path, level: Option<&str>) -> Result<()> {
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
    } = prepare_session(app, chart_path, level, clock, Arc::new(ConsoleUi::new()))?;

    println!(
        "Playing `{}` ({} notes). D/F or Left: lane 0, J/K or Right: lane 1, Esc or q: quit",
        session.chart().song_name(),
        session.chart().len()
    );

    let stats = {
        let _raw = RawModeGuard::enable()?;
        let keyboard = input::spawn_keyboard_monitor(session.judge(), Arc::clone(&stop));
        let result = session.run(&stop, FRAME, |_, _, _| {});
        stop.stop();
        let _ = keyboard.join();
        result?
    };

    println!();
    println!("{}", display::format_summary(&level_id, &stats));
    if session.final_stats().is_some() {
        println!("Saved to: {}", store.path().display());
    } else {
        println!("Stopped early, score not saved");
    }

    Ok(())
}
