//! Wiring for `run`: tailer → event pump → controller → actuator.

use std::{path::Path, sync::Arc, time::Duration};

use autocast_engine::{Controller, SystemClock};
use config::Settings;
use logtail::{EventSource, LogTailer};
use oscpress::OscPress;
use time::UtcOffset;
use tokio::{sync::mpsc, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{Error, cli::RunArgs, console};

/// Log a status line every `every` until cancelled.
async fn report_status(controller: Controller, every: Duration, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = String::new();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = ticker.tick() => {}
        }
        let snap = controller.snapshot();
        if !snap.running {
            continue;
        }
        let line = snap.to_string();
        if line != last {
            info!(status = %line, "status");
            last = line;
        }
    }
}

/// Run until `quit`, stdin EOF, or Ctrl-C. Settings are saved on the way out.
pub async fn run(
    args: RunArgs,
    config_path: &Path,
    mut settings: Settings,
    offset: UtcOffset,
) -> Result<(), Error> {
    if let Some(dir) = args.log_dir {
        settings.log_dir = Some(dir);
    }

    let osc = Arc::new(OscPress::connect(
        &settings.osc.host,
        settings.osc.port,
        &settings.osc.address,
    )?);
    let controller = Controller::new(
        osc.clone(),
        Arc::new(SystemClock::new(offset)),
        settings.clone(),
    );

    let mut tailer = LogTailer::from_settings(&settings, offset)?;
    info!(dir = %tailer.dir().display(), "following_logs");
    let (tx, rx) = mpsc::unbounded_channel();
    tailer.start(tx)?;
    let pump = controller.spawn_event_pump(rx);

    let shutdown = CancellationToken::new();
    let status = tokio::spawn(report_status(
        controller.clone(),
        args.status_every,
        shutdown.clone(),
    ));
    let console = tokio::spawn(console::run(controller.clone(), shutdown.clone()));

    if args.start {
        controller.start();
    }
    println!("type `help` for commands");

    tokio::select! {
        _ = shutdown.cancelled() => debug!("console_closed"),
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                warn!(error = %e, "ctrl_c_listener_failed");
            }
            info!("interrupted");
            shutdown.cancel();
        }
    }

    controller.stop();
    osc.release();
    // Joining the reader thread blocks for up to one poll interval.
    let tail_stopped = tokio::task::spawn_blocking(move || tailer.stop());
    if tail_stopped.await.is_err() {
        warn!("logtail_stop_panicked");
    }
    if pump.await.is_err() {
        warn!("event_pump_panicked");
    }
    for task in [status, console] {
        if task.await.is_err() {
            warn!("background_task_panicked");
        }
    }

    config::save_to_path(&controller.settings(), config_path)?;
    info!(path = %config_path.display(), "settings_saved");
    Ok(())
}
