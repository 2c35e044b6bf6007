//! Wait gate for blocking retrieval.
//!
//! Consumers take a [`Ticket`] *before* looking at the store and then wait
//! until the gate moves past it. Producers bump the epoch after inserting, so
//! an insertion that races with a consumer's empty check is never missed.

use std::time::Instant;

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
struct GateState {
    /// Bumped on every successful insertion
    epoch: u64,
    /// Bumped on every interrupt
    interrupts: u64,
    closed: bool,
    waiting: usize,
}

/// Snapshot of the gate taken before checking the store.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Ticket {
    epoch: u64,
    interrupts: u64,
    pub(crate) closed: bool,
}

/// Why a wait ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Wake {
    /// A new address may be available
    Signalled,
    /// The cache was cleared
    Closed,
    /// The wait was interrupted
    Interrupted,
    /// The deadline passed
    TimedOut,
}

pub(crate) struct WaitGate {
    state: Mutex<GateState>,
    condvar: Condvar,
}

impl WaitGate {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(GateState::default()),
            condvar: Condvar::new(),
        }
    }

    pub(crate) fn ticket(&self) -> Ticket {
        let state = self.state.lock();
        Ticket {
            epoch: state.epoch,
            interrupts: state.interrupts,
            closed: state.closed,
        }
    }

    /// Blocks until the gate moves past `ticket` or `deadline` passes.
    ///
    /// Returns immediately if that already happened.
    pub(crate) fn wait(&self, ticket: Ticket, deadline: Option<Instant>) -> Wake {
        let mut state = self.state.lock();
        state.waiting += 1;

        let wake = loop {
            if state.closed {
                break Wake::Closed;
            }
            if state.interrupts != ticket.interrupts {
                break Wake::Interrupted;
            }
            if state.epoch != ticket.epoch {
                break Wake::Signalled;
            }
            match deadline {
                Some(deadline) => {
                    if self.condvar.wait_until(&mut state, deadline).timed_out() {
                        break Wake::TimedOut;
                    }
                }
                None => self.condvar.wait(&mut state),
            }
        };

        state.waiting -= 1;
        wake
    }

    /// Wakes every waiter to re-check the store.
    pub(crate) fn signal(&self) {
        let mut state = self.state.lock();
        state.epoch = state.epoch.wrapping_add(1);
        self.condvar.notify_all();
    }

    /// Wakes every current waiter with [`Wake::Interrupted`].
    pub(crate) fn interrupt(&self) -> usize {
        let mut state = self.state.lock();
        state.interrupts = state.interrupts.wrapping_add(1);
        self.condvar.notify_all();
        state.waiting
    }

    /// Closes the gate for good and wakes every waiter.
    ///
    /// Returns false if it was already closed.
    pub(crate) fn close(&self) -> bool {
        let mut state = self.state.lock();
        let was_open = !state.closed;
        state.closed = true;
        self.condvar.notify_all();
        was_open
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Threads currently blocked in [`WaitGate::wait`].
    pub(crate) fn waiting(&self) -> usize {
        self.state.lock().waiting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn wait_for_waiters(gate: &WaitGate, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while gate.waiting() < count {
            assert!(Instant::now() < deadline, "waiters never blocked");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_signal_before_wait_is_not_lost() {
        let gate = WaitGate::new();
        let ticket = gate.ticket();
        gate.signal();
        assert_eq!(gate.wait(ticket, None), Wake::Signalled);
    }

    #[test]
    fn test_signal_wakes_all_waiters() {
        let gate = Arc::new(WaitGate::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gate = gate.clone();
                let ticket = gate.ticket();
                thread::spawn(move || gate.wait(ticket, None))
            })
            .collect();

        wait_for_waiters(&gate, 4);
        gate.signal();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Wake::Signalled);
        }
        assert_eq!(gate.waiting(), 0);
    }

    #[test]
    fn test_close_wakes_waiters() {
        let gate = Arc::new(WaitGate::new());
        let waiter = {
            let gate = gate.clone();
            let ticket = gate.ticket();
            thread::spawn(move || gate.wait(ticket, None))
        };

        wait_for_waiters(&gate, 1);
        assert!(gate.close());
        assert!(!gate.close());

        assert_eq!(waiter.join().unwrap(), Wake::Closed);
        assert!(gate.ticket().closed);
    }

    #[test]
    fn test_interrupt_only_affects_current_waiters() {
        let gate = Arc::new(WaitGate::new());
        let waiter = {
            let gate = gate.clone();
            let ticket = gate.ticket();
            thread::spawn(move || gate.wait(ticket, None))
        };

        wait_for_waiters(&gate, 1);
        assert_eq!(gate.interrupt(), 1);
        assert_eq!(waiter.join().unwrap(), Wake::Interrupted);

        // A ticket taken after the interrupt is unaffected
        let ticket = gate.ticket();
        let deadline = Instant::now() + Duration::from_millis(20);
        assert_eq!(gate.wait(ticket, Some(deadline)), Wake::TimedOut);
    }

    #[test]
    fn test_deadline() {
        let gate = WaitGate::new();
        let start = Instant::now();
        let wake = gate.wait(gate.ticket(), Some(start + Duration::from_millis(30)));
        assert_eq!(wake, Wake::TimedOut);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
