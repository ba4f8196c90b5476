//! Flattening and export
//!
//! Renders the final composite on the CPU and writes it to disk from a
//! background worker.

mod compositor;
mod export;

pub use compositor::flatten;
pub use export::{export_composite, ExportEvent, ExportJob, ExportWorker};

use thiserror::Error;

use crate::warp::WarpError;

/// Errors that can occur while flattening or saving the composite
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("no background image loaded")]
    NoBackground,
    #[error("no overlay image loaded")]
    NoOverlay,
    #[error("cannot warp overlay: {0}")]
    Warp(#[from] WarpError),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("export worker is not running")]
    WorkerStopped,
}
