// Deterministic transport and scheduler doubles

use super::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct TransportLog {
    pub opened: Vec<(Generation, StateRequest)>,
    pub sent: Vec<(Generation, String)>,
    pub closed: Vec<Generation>,
    pub fail_open: bool,
    pub fail_send: bool,
}

/// Records every call; opens and sends succeed unless told otherwise
#[derive(Clone, Default)]
pub struct RecordingTransport {
    pub log: Rc<RefCell<TransportLog>>,
}

impl RecordingTransport {
    pub fn open_count(&self) -> usize {
        self.log.borrow().opened.len()
    }

    pub fn last_generation(&self) -> Generation {
        self.log
            .borrow()
            .opened
            .last()
            .map(|(generation, _)| *generation)
            .expect("no connection opened")
    }
}

impl Transport for RecordingTransport {
    fn open(&mut self, generation: Generation, request: &StateRequest) -> Result<(), TransportError> {
        let mut log = self.log.borrow_mut();
        log.opened.push((generation, request.clone()));
        if log.fail_open {
            return Err(TransportError("refused".to_string()));
        }
        Ok(())
    }

    fn send(&mut self, generation: Generation, text: String) -> Result<(), TransportError> {
        let mut log = self.log.borrow_mut();
        if log.fail_send {
            return Err(TransportError("broken pipe".to_string()));
        }
        log.sent.push((generation, text));
        Ok(())
    }

    fn close(&mut self, generation: Generation) {
        self.log.borrow_mut().closed.push(generation);
    }
}

#[derive(Debug, Default)]
pub struct SchedulerLog {
    next_id: u64,
    pub pending: Vec<(TimerHandle, Duration)>,
    pub scheduled: usize,
    pub cancelled: Vec<TimerHandle>,
}

/// Timers only fire when the test says so
#[derive(Clone, Default)]
pub struct ManualScheduler {
    pub log: Rc<RefCell<SchedulerLog>>,
}

impl ManualScheduler {
    pub fn pending(&self) -> Vec<TimerHandle> {
        self.log
            .borrow()
            .pending
            .iter()
            .map(|(handle, _)| *handle)
            .collect()
    }

    pub fn scheduled(&self) -> usize {
        self.log.borrow().scheduled
    }

    /// Expire every pending timer
    pub fn fire_all(&self) -> Vec<ConnectionEvent> {
        self.log
            .borrow_mut()
            .pending
            .drain(..)
            .map(|(handle, _)| ConnectionEvent::RetryDue(handle))
            .collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        let mut log = self.log.borrow_mut();
        log.next_id += 1;
        let handle = TimerHandle::new(log.next_id);
        log.pending.push((handle, delay));
        log.scheduled += 1;
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        let mut log = self.log.borrow_mut();
        log.pending.retain(|(pending, _)| *pending != handle);
        log.cancelled.push(handle);
    }
}
