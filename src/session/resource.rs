use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::acquire::acquirer::AcquiredBytes;
use crate::assets::decode::Bitmap;

#[derive(Debug, Default)]
struct Counters {
    next_id: AtomicU64,
    issued: AtomicUsize,
    released: AtomicUsize,
}

/// Shared bookkeeping for [`AcquiredResource`] handles.
///
/// Clones observe the same counters, so a caller can keep one around to check how many handles a
/// session has issued and released.
#[derive(Clone, Debug, Default)]
pub struct ResourceTracker {
    counters: Arc<Counters>,
}

impl ResourceTracker {
    /// Fresh tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles issued so far.
    pub fn issued(&self) -> usize {
        self.counters.issued.load(Ordering::SeqCst)
    }

    /// Handles released so far (each handle counts once).
    pub fn released(&self) -> usize {
        self.counters.released.load(Ordering::SeqCst)
    }

    /// Handles issued and not yet released.
    pub fn live(&self) -> usize {
        self.issued().saturating_sub(self.released())
    }

    /// Take ownership of acquired bytes as a tracked handle.
    pub fn issue(&self, payload: AcquiredBytes) -> AcquiredResource {
        let id = self.counters.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.issued.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(id, via = %payload.path.uri, "resource issued");
        AcquiredResource {
            id,
            payload: Some(payload),
            bitmap: None,
            tracker: self.clone(),
        }
    }
}

/// Owned, revocable handle to acquired image bytes and their decoded bitmap.
///
/// Releasing drops the payload and is idempotent; dropping an unreleased handle releases it.
#[derive(Debug)]
pub struct AcquiredResource {
    id: u64,
    payload: Option<AcquiredBytes>,
    bitmap: Option<Bitmap>,
    tracker: ResourceTracker,
}

impl AcquiredResource {
    /// Tracker-unique id (starting at 1).
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Acquired bytes, `None` once released.
    pub fn payload(&self) -> Option<&AcquiredBytes> {
        self.payload.as_ref()
    }

    /// Decoded bitmap, if decoding succeeded and the handle is still live.
    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.bitmap.as_ref()
    }

    pub(crate) fn attach_bitmap(&mut self, bitmap: Bitmap) {
        if self.payload.is_some() {
            self.bitmap = Some(bitmap);
        }
    }

    /// `true` after [`AcquiredResource::release`].
    pub fn is_released(&self) -> bool {
        self.payload.is_none()
    }

    /// Give up the bytes and bitmap. Returns `false` if already released.
    pub fn release(&mut self) -> bool {
        if self.payload.take().is_none() {
            return false;
        }
        self.bitmap = None;
        self.tracker.counters.released.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(id = self.id, "resource released");
        true
    }
}

impl Drop for AcquiredResource {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/resource.rs"]
mod tests;
