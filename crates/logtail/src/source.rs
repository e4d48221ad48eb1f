//! Background tailer thread and the `EventSource` seam.

use std::{
    path::PathBuf,
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::Duration,
};

use time::UtcOffset;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::{Classifier, Error, LogEvent, Result, Tail, parse::wall_now};

/// Something that pushes parsed log events into a channel.
///
/// Delivery is at-least-once per physical line with no ordering guarantee
/// across rotations; consumers must tolerate duplicates.
pub trait EventSource: Send {
    /// Begin delivering events to `sink`.
    fn start(&mut self, sink: UnboundedSender<LogEvent>) -> Result<()>;
    /// Stop delivering events. Idempotent.
    fn stop(&mut self);
}

/// Handle to a running reader thread.
struct Running {
    /// Dropping or sending stops the loop.
    stop_tx: mpsc::Sender<()>,
    /// Reader thread.
    join: thread::JoinHandle<()>,
}

/// Polls the newest log file on a dedicated thread.
pub struct LogTailer {
    /// Directory to follow.
    dir: PathBuf,
    /// Line classifier.
    classifier: Classifier,
    /// Interval between reads.
    interval: Duration,
    /// Offset used to stamp lines without a timestamp prefix.
    offset: UtcOffset,
    /// Reader thread, when started.
    running: Option<Running>,
}

impl LogTailer {
    /// Create a tailer for `dir`.
    pub fn new(dir: PathBuf, classifier: Classifier, interval: Duration, offset: UtcOffset) -> Self {
        Self {
            dir,
            classifier,
            interval,
            offset,
            running: None,
        }
    }

    /// Build a tailer from settings, resolving the platform default directory.
    pub fn from_settings(settings: &config::Settings, offset: UtcOffset) -> Result<Self> {
        let dir = match settings.log_dir.clone() {
            Some(d) => d,
            None => crate::default_log_dir().ok_or(Error::NoLogDir)?,
        };
        let classifier = Classifier::new(&settings.patterns)?;
        Ok(Self::new(
            dir,
            classifier,
            settings.policy.log_poll_interval(),
            offset,
        ))
    }

    /// Directory being followed.
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

impl EventSource for LogTailer {
    fn start(&mut self, sink: UnboundedSender<LogEvent>) -> Result<()> {
        if self.running.is_some() {
            return Ok(());
        }
        if !self.dir.is_dir() {
            warn!(dir = %self.dir.display(), "log_dir_missing; will keep polling");
        }
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let mut tail = Tail::new(self.dir.clone(), self.classifier.clone());
        let interval = self.interval;
        let offset = self.offset;
        let join = thread::Builder::new()
            .name("logtail".into())
            .spawn(move || {
                info!("logtail_started");
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                    for ev in tail.poll(wall_now(offset)) {
                        if sink.send(ev).is_err() {
                            debug!("logtail_sink_closed");
                            return;
                        }
                    }
                }
                info!("logtail_stopped");
            })
            .map_err(Error::Spawn)?;
        self.running = Some(Running { stop_tx, join });
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(r) = self.running.take() {
            let _ = r.stop_tx.send(());
            if r.join.join().is_err() {
                warn!("logtail_thread_panicked");
            }
        }
    }
}

impl Drop for LogTailer {
    fn drop(&mut self) {
        self.stop();
    }
}
