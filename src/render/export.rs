//! Export worker
//!
//! Flattening a large photo takes long enough to stall the UI, so exports run
//! on a background thread. The UI submits owned jobs and polls events.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};
use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::warp::Quad;

use super::{flatten, ExportError};

/// Everything needed to produce one exported file
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub background: Arc<RgbaImage>,
    pub overlay: Arc<RgbaImage>,
    /// Corners in background image pixels
    pub quad: Quad,
    pub path: PathBuf,
}

/// Commands sent to the worker thread.
#[derive(Debug)]
enum WorkerCommand {
    Export(ExportJob),
    Stop,
}

/// Events from the worker thread.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    Started(PathBuf),
    Finished(PathBuf),
    Failed(PathBuf, String),
}

/// Background export thread
pub struct ExportWorker {
    command_tx: Sender<WorkerCommand>,
    event_rx: Receiver<ExportEvent>,
    worker_handle: Option<JoinHandle<()>>,
}

impl Default for ExportWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportWorker {
    pub fn new() -> Self {
        let (command_tx, command_rx) = bounded::<WorkerCommand>(8);
        let (event_tx, event_rx) = bounded::<ExportEvent>(32);

        let worker_handle = thread::spawn(move || {
            Self::worker_loop(command_rx, event_tx);
        });

        Self {
            command_tx,
            event_rx,
            worker_handle: Some(worker_handle),
        }
    }

    fn worker_loop(command_rx: Receiver<WorkerCommand>, event_tx: Sender<ExportEvent>) {
        while let Ok(command) = command_rx.recv() {
            match command {
                WorkerCommand::Export(job) => {
                    let _ = event_tx.send(ExportEvent::Started(job.path.clone()));
                    let event = match export_composite(&job) {
                        Ok(()) => {
                            log::info!("Exported composite to {:?}", job.path);
                            ExportEvent::Finished(job.path)
                        }
                        Err(e) => {
                            log::error!("Export to {:?} failed: {}", job.path, e);
                            ExportEvent::Failed(job.path, e.to_string())
                        }
                    };
                    let _ = event_tx.send(event);
                }
                WorkerCommand::Stop => break,
            }
        }
        log::debug!("Export worker stopped");
    }

    /// Queue an export
    pub fn submit(&self, job: ExportJob) -> Result<(), ExportError> {
        self.command_tx
            .send(WorkerCommand::Export(job))
            .map_err(|_| ExportError::WorkerStopped)
    }

    /// Drain all pending events without blocking
    pub fn poll_events(&self) -> Vec<ExportEvent> {
        self.event_rx.try_iter().collect()
    }

    /// Wait for the next event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ExportEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for ExportWorker {
    fn drop(&mut self) {
        let _ = self.command_tx.send(WorkerCommand::Stop);
        if let Some(handle) = self.worker_handle.take() {
            let _ = handle.join();
        }
    }
}

/// Flatten a job and write it, picking the format from the file extension
pub fn export_composite(job: &ExportJob) -> Result<(), ExportError> {
    let composite = flatten(&job.background, &job.overlay, &job.quad)?;
    save_image(composite, &job.path)
}

fn save_image(image: RgbaImage, path: &Path) -> Result<(), ExportError> {
    let format = ImageFormat::from_path(path)?;
    match format {
        // No alpha channel in JPEG
        ImageFormat::Jpeg => DynamicImage::ImageRgba8(image)
            .to_rgb8()
            .save_with_format(path, format)?,
        _ => image.save_with_format(path, format)?,
    }
    Ok(())
}
