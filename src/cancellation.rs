use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Number of transitions between two cancellation checks inside one trajectory.
pub const CHECK_INTERVAL: usize = 1024;

/// A cloneable flag used to stop a running analysis from another thread.
///
/// The analysis polls the flag between trajectories, every [`CHECK_INTERVAL`] steps of a
/// trajectory, and once per probabilistic iteration. A cancelled analysis still returns
/// the partial result computed so far, marked as truncated.
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> CancellationFlag {
        CancellationFlag::default()
    }

    /// Request cancellation. All clones of this flag observe the request.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use crate::cancellation::CancellationFlag;

    #[test]
    fn clones_share_state() {
        let flag = CancellationFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
        let handle = std::thread::spawn(move || other.is_cancelled());
        assert!(handle.join().unwrap());
    }
}
