use std::sync::atomic::{AtomicBool, Ordering};

/// Single-flight flag for feed cycles.
///
/// The flag is released when the permit drops, including when the cycle
/// future is cancelled by a timeout.
#[derive(Debug, Default)]
pub struct RunGuard {
    running: AtomicBool,
}

pub struct RunPermit<'a> {
    guard: &'a RunGuard,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<RunPermit<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunPermit { guard: self })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Drop for RunPermit<'_> {
    fn drop(&mut self) {
        self.guard.running.store(false, Ordering::Release);
    }
}
