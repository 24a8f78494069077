//! Single-flight guard for exports.

use crate::error::{ReportError, Result};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct ExportLock {
    busy: AtomicBool,
}

/// Releases the lock when dropped, including on early error returns.
#[derive(Debug)]
pub struct ExportGuard<'a> {
    lock: &'a ExportLock,
}

impl ExportLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock, or fail with `ExportInProgress` if it is held.
    pub fn try_acquire(&self) -> Result<ExportGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ExportGuard { lock: self })
            .map_err(|_| ReportError::ExportInProgress)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        self.lock.busy.store(false, Ordering::Release);
    }
}
