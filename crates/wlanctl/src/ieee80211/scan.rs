//! Scan request coalescing.
//!
//! Scan requests and the state machine's scan cycle share the
//! [`ScanLockFlags`] of the interface. Requests that arrive while a cycle is
//! running mark it for restart; every requester then waits on one
//! completion signal.

use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use super::driver::StateMachine;
use super::state::InterfaceState;
use super::types::{ConnState, ScanLockFlags};

/// What the state machine should do when a scan cycle finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEnd {
    /// A request arrived during the cycle; run another one.
    Restart,
    /// Scan finished and waiters were released.
    Complete,
}

/// Completion signal shared by all scan requesters of one interface.
#[derive(Debug)]
pub struct ScanCoordinator {
    done: watch::Sender<u64>,
}

impl Default for ScanCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanCoordinator {
    pub fn new() -> Self {
        let (done, _) = watch::channel(0);
        Self { done }
    }

    /// Register a scan request.
    ///
    /// Must be called with the interface state locked. The returned receiver
    /// is subscribed before the lock is released so a cycle that ends right
    /// after cannot be missed.
    pub fn request(&self, ic: &mut InterfaceState, sm: &dyn StateMachine) -> watch::Receiver<u64> {
        if !ic.scan_lock.contains(ScanLockFlags::REQUEST) {
            if ic.scan_lock.contains(ScanLockFlags::LOCKED) {
                ic.scan_lock.insert(ScanLockFlags::RESUME);
            }
            ic.scan_lock.insert(ScanLockFlags::REQUEST);
            if ic.state != ConnState::Scan {
                sm.new_state(ic, ConnState::Scan);
            }
            debug!(iface = %ic.name, lock = ic.scan_lock.bits(), "scan requested");
        } else {
            debug!(iface = %ic.name, "joining pending scan");
        }
        self.done.subscribe()
    }

    /// Wait for the end of the scan cycle.
    ///
    /// Returns `false` when the timeout expired first.
    pub async fn wait(mut rx: watch::Receiver<u64>, timeout: Duration) -> bool {
        match tokio::time::timeout(timeout, rx.changed()).await {
            Ok(_) => true,
            Err(_) => {
                debug!(?timeout, "scan wait timed out");
                false
            }
        }
    }

    /// Mark the start of a scan cycle.
    pub fn begin(ic: &mut InterfaceState) {
        ic.scan_lock.insert(ScanLockFlags::LOCKED);
        ic.scan_lock.remove(ScanLockFlags::RESUME);
    }

    /// Mark the end of a scan cycle.
    pub fn end(&self, ic: &mut InterfaceState) -> ScanEnd {
        if ic.scan_lock.contains(ScanLockFlags::RESUME) {
            ic.scan_lock.remove(ScanLockFlags::RESUME);
            debug!(iface = %ic.name, "scan restarting");
            return ScanEnd::Restart;
        }

        ic.scan_lock = ScanLockFlags::EMPTY;
        self.done.send_modify(|generation| *generation += 1);
        debug!(iface = %ic.name, waiters = self.waiters(), "scan complete");
        ScanEnd::Complete
    }

    /// Number of requesters currently waiting.
    pub fn waiters(&self) -> usize {
        self.done.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ieee80211::fixtures::{RecordingStateMachine, test_state};

    #[test]
    fn test_request_enters_scan_state() {
        let mut ic = test_state();
        let sm = RecordingStateMachine::new();
        let scan = ScanCoordinator::new();

        let _rx = scan.request(&mut ic, &sm);
        assert!(ic.scan_lock.contains(ScanLockFlags::REQUEST));
        assert!(!ic.scan_lock.contains(ScanLockFlags::RESUME));
        assert_eq!(ic.state, ConnState::Scan);
        assert_eq!(sm.transitions(), vec![ConnState::Scan]);
        assert_eq!(scan.waiters(), 1);
    }

    #[test]
    fn test_request_during_cycle_sets_resume() {
        let mut ic = test_state();
        let sm = RecordingStateMachine::new();
        let scan = ScanCoordinator::new();

        ScanCoordinator::begin(&mut ic);
        let _a = scan.request(&mut ic, &sm);
        let _b = scan.request(&mut ic, &sm);

        assert!(ic.scan_lock.contains(ScanLockFlags::RESUME));
        assert_eq!(sm.transitions().len(), 1);
        assert_eq!(scan.waiters(), 2);

        assert_eq!(scan.end(&mut ic), ScanEnd::Restart);
        assert!(ic.scan_lock.contains(ScanLockFlags::REQUEST));

        ScanCoordinator::begin(&mut ic);
        assert_eq!(scan.end(&mut ic), ScanEnd::Complete);
        assert!(ic.scan_lock.is_empty());
    }

    #[test]
    fn test_already_scanning_skips_transition() {
        let mut ic = test_state();
        ic.state = ConnState::Scan;
        let sm = RecordingStateMachine::new();
        let scan = ScanCoordinator::new();

        let _rx = scan.request(&mut ic, &sm);
        assert!(sm.transitions().is_empty());
    }

    #[tokio::test]
    async fn test_wait_released_by_end() {
        let mut ic = test_state();
        let sm = RecordingStateMachine::new();
        let scan = ScanCoordinator::new();

        let rx = scan.request(&mut ic, &sm);
        scan.end(&mut ic);
        assert!(ScanCoordinator::wait(rx, Duration::from_secs(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out() {
        let mut ic = test_state();
        let sm = RecordingStateMachine::new();
        let scan = ScanCoordinator::new();

        let rx = scan.request(&mut ic, &sm);
        assert!(!ScanCoordinator::wait(rx, Duration::from_secs(10)).await);
    }
}
