use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use silk::{AnimationHandle, FrameRequester};

#[derive(Default)]
struct QueueState {
    next: u64,
    pending: VecDeque<AnimationHandle>,
}

/// Frame requests backed by the window's redraw events.
///
/// Each request queues a handle and asks the window for a redraw; the event
/// loop drains the queue when `RedrawRequested` arrives. Cancelled handles are
/// removed so they are never delivered.
#[derive(Clone)]
pub struct RedrawQueue {
    state: Rc<RefCell<QueueState>>,
    wake: Rc<dyn Fn()>,
}

impl RedrawQueue {
    pub fn new(wake: impl Fn() + 'static) -> Self {
        Self {
            state: Rc::new(RefCell::new(QueueState::default())),
            wake: Rc::new(wake),
        }
    }

    /// Takes every handle due for delivery in request order.
    pub fn drain(&self) -> Vec<AnimationHandle> {
        self.state.borrow_mut().pending.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().pending.is_empty()
    }
}

impl FrameRequester for RedrawQueue {
    fn request_frame(&mut self) -> AnimationHandle {
        let handle = {
            let mut state = self.state.borrow_mut();
            state.next += 1;
            let handle = AnimationHandle(state.next);
            state.pending.push_back(handle);
            handle
        };
        (self.wake)();
        handle
    }

    fn cancel_frame(&mut self, handle: AnimationHandle) {
        self.state
            .borrow_mut()
            .pending
            .retain(|pending| *pending != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn requests_wake_the_window_and_drain_in_order() {
        let wakes = Rc::new(Cell::new(0));
        let counter = wakes.clone();
        let mut queue = RedrawQueue::new(move || counter.set(counter.get() + 1));

        let first = queue.request_frame();
        let second = queue.request_frame();
        assert_eq!(wakes.get(), 2);
        assert_ne!(first, second);
        assert_eq!(queue.drain(), vec![first, second]);
        assert!(queue.is_empty());
    }

    #[test]
    fn cancelled_handles_are_never_delivered() {
        let mut queue = RedrawQueue::new(|| {});
        let keep = queue.request_frame();
        let cancelled = queue.request_frame();
        queue.cancel_frame(cancelled);
        queue.cancel_frame(cancelled);
        assert_eq!(queue.drain(), vec![keep]);
    }
}
