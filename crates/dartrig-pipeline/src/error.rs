//! Pipeline error taxonomy.
//!
//! `UnknownCamera` marks a programmer error (unregistered id) and is
//! never retried. The `Insufficient*` variants mean "collect more
//! data" and surface to the operator as guidance. `Solver` wraps a
//! failed geometric solve; accumulated samples survive it so the
//! caller may retry.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unknown camera id: {0}")]
    UnknownCamera(String),

    #[error("not enough calibration samples: got {got}, need {need}")]
    InsufficientSamples { got: usize, need: usize },

    #[error("no common markers between the two observation sets")]
    InsufficientCorrespondence,

    #[error("calibration solver failed")]
    Solver(#[from] anyhow::Error),
}
