//! Multi-camera frame synchronization.
//!
//! Cameras are independent producers with independent capture jitter.
//! Instead of a hard rendezvous (which deadlocks on a lagging feed),
//! the synchronizer compares the *latest* buffered timestamp of every
//! camera: when the spread is within the sync threshold, a
//! synchronized flag is raised and consumers may take the latest frame
//! of each feed as one [`SyncedFrameSet`]. Absence of synchronization
//! is a normal transient state, not an error.
//!
//! Each camera buffer sits behind its own mutex so that one feed's
//! insertion never blocks another's.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use dartrig_core::Real;

use crate::config::SyncConfig;
use crate::error::PipelineError;

/// A buffered camera frame. The payload is typically a shared handle
/// to a decoded pixel buffer.
#[derive(Debug, Clone)]
pub struct Frame<T> {
    pub timestamp: Real,
    pub data: T,
}

/// One aligned multi-camera frame set.
#[derive(Debug, Clone)]
pub struct SyncedFrameSet<T> {
    /// Latest frame of each configured camera.
    pub frames: HashMap<String, Frame<T>>,
    /// Representative timestamp (newest frame in the set).
    pub timestamp: Real,
    /// Max pairwise timestamp skew, seconds. Always within the
    /// configured threshold.
    pub skew: Real,
}

pub struct FrameSynchronizer<T> {
    config: SyncConfig,
    buffers: HashMap<String, Mutex<VecDeque<Frame<T>>>>,
    camera_ids: Vec<String>,
    synced: AtomicBool,
    started: Instant,
}

impl<T: Clone> FrameSynchronizer<T> {
    pub fn new(camera_ids: Vec<String>, config: SyncConfig) -> Self {
        let buffers = camera_ids
            .iter()
            .map(|id| (id.clone(), Mutex::new(VecDeque::new())))
            .collect();
        Self {
            config,
            buffers,
            camera_ids,
            synced: AtomicBool::new(false),
            started: Instant::now(),
        }
    }

    /// Register a frame for a configured camera.
    ///
    /// `timestamp` defaults to the session clock (seconds since the
    /// synchronizer was created). Frames older than the retention
    /// window relative to the newest frame of the same camera are
    /// evicted on every insertion.
    pub fn add_frame(
        &self,
        camera_id: &str,
        data: T,
        timestamp: Option<Real>,
    ) -> Result<(), PipelineError> {
        let buffer = self
            .buffers
            .get(camera_id)
            .ok_or_else(|| PipelineError::UnknownCamera(camera_id.to_string()))?;

        let timestamp = timestamp.unwrap_or_else(|| self.now());

        {
            let mut buf = lock(buffer);
            buf.push_back(Frame { timestamp, data });
            let cutoff = newest_timestamp(&buf) - self.config.retention_window_s;
            buf.retain(|f| f.timestamp >= cutoff);
        }

        self.try_sync();
        Ok(())
    }

    /// Whether the latest frames currently satisfy the skew bound.
    pub fn is_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }

    /// The most recent synchronized frame set, if one exists.
    ///
    /// `None` signals "no data yet" and is expected during normal
    /// operation whenever a feed lags. A returned set satisfies
    /// `skew <= sync_threshold` at the moment of construction, and no
    /// frame in it is older than the retention window relative to the
    /// session clock.
    pub fn synced_frames(&self) -> Option<SyncedFrameSet<T>> {
        if !self.is_synced() {
            return None;
        }

        let mut frames = HashMap::with_capacity(self.camera_ids.len());
        for id in &self.camera_ids {
            let buf = lock(&self.buffers[id]);
            let frame = buf.back()?.clone();
            frames.insert(id.clone(), frame);
        }

        let (min_ts, max_ts) = timestamp_spread(frames.values().map(|f| f.timestamp))?;
        let skew = max_ts - min_ts;
        // Re-check under the frames actually captured; a racing
        // insertion may have moved a feed outside the bound.
        if skew > self.config.sync_threshold_s() {
            return None;
        }

        // Eviction runs on insertion, so silent feeds keep their last
        // frames buffered; a set assembled from them is stale data,
        // not a synchronized observation.
        if self.now() - max_ts > self.config.retention_window_s {
            return None;
        }

        Some(SyncedFrameSet {
            frames,
            timestamp: max_ts,
            skew,
        })
    }

    fn try_sync(&self) {
        let mut latest = Vec::with_capacity(self.camera_ids.len());
        for id in &self.camera_ids {
            let buf = lock(&self.buffers[id]);
            match buf.back() {
                Some(frame) => latest.push(frame.timestamp),
                None => {
                    self.synced.store(false, Ordering::Release);
                    return;
                }
            }
        }

        let in_sync = match timestamp_spread(latest.into_iter()) {
            Some((min_ts, max_ts)) => max_ts - min_ts <= self.config.sync_threshold_s(),
            None => false,
        };
        self.synced.store(in_sync, Ordering::Release);
        if !in_sync {
            log::trace!("frame feeds out of sync");
        }
    }

    fn now(&self) -> Real {
        self.started.elapsed().as_secs_f64()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn newest_timestamp<T>(buf: &VecDeque<Frame<T>>) -> Real {
    buf.iter().map(|f| f.timestamp).fold(Real::MIN, Real::max)
}

fn timestamp_spread(timestamps: impl Iterator<Item = Real>) -> Option<(Real, Real)> {
    timestamps.fold(None, |acc, ts| match acc {
        None => Some((ts, ts)),
        Some((lo, hi)) => Some((lo.min(ts), hi.max(ts))),
    })
}
