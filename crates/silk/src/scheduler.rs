//! Cancellable frame loop driven by the host's frame-presentation callback.
//!
//! The loop never owns a thread or a timer. The host hands out an
//! [`AnimationHandle`] per requested frame and later calls back with it; the
//! loop only does work for the single handle it is currently waiting on, which
//! makes callbacks that were already queued when [`RenderLoop::cancel`] ran
//! harmless.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

/// Identifies one outstanding "call me before the next repaint" request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationHandle(pub u64);

/// Host primitive that invokes the renderer once before the next repaint.
pub trait FrameRequester {
    fn request_frame(&mut self) -> AnimationHandle;
    fn cancel_frame(&mut self, handle: AnimationHandle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoopError {
    #[error("render loop can only start from idle (currently {0:?})")]
    NotIdle(LoopState),
}

/// What happened to a frame callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// The work ran and the next frame was requested.
    Rendered { elapsed: f32 },
    /// Stale handle or loop not running; nothing was done.
    Ignored,
}

/// `Idle → Running → Cancelled` state machine around a frame requester.
#[derive(Debug)]
pub struct RenderLoop {
    state: LoopState,
    time_origin: Option<Instant>,
    last_elapsed: Duration,
    pending: Option<AnimationHandle>,
    frames: u64,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
            time_origin: None,
            last_elapsed: Duration::ZERO,
            pending: None,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn pending(&self) -> Option<AnimationHandle> {
        self.pending
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// Captures `now` as the time origin and requests the first frame.
    pub fn start<F: FrameRequester>(
        &mut self,
        frames: &mut F,
        now: Instant,
    ) -> Result<(), LoopError> {
        if self.state != LoopState::Idle {
            return Err(LoopError::NotIdle(self.state));
        }
        self.state = LoopState::Running;
        self.time_origin = Some(now);
        self.pending = Some(frames.request_frame());
        debug!(handle = ?self.pending, "render loop started");
        Ok(())
    }

    /// Runs one frame if `handle` is the outstanding request and the loop is
    /// still running.
    ///
    /// `work` receives the elapsed seconds; once it returns, the next frame is
    /// requested unless `work` asked to stop by returning `false`, in which case
    /// the loop cancels itself.
    pub fn on_frame<F, W>(
        &mut self,
        frames: &mut F,
        handle: AnimationHandle,
        now: Instant,
        work: W,
    ) -> FrameOutcome
    where
        F: FrameRequester,
        W: FnOnce(f32) -> bool,
    {
        if self.state != LoopState::Running || self.pending != Some(handle) {
            trace!(?handle, state = ?self.state, "ignoring stale frame callback");
            return FrameOutcome::Ignored;
        }
        self.pending = None;

        let elapsed = self.elapsed_at(now);
        let keep_going = work(elapsed.as_secs_f32());
        self.frames = self.frames.saturating_add(1);

        if keep_going && self.state == LoopState::Running {
            self.pending = Some(frames.request_frame());
        } else {
            self.cancel(frames);
        }
        FrameOutcome::Rendered {
            elapsed: elapsed.as_secs_f32(),
        }
    }

    /// Stops the loop for good. Safe to call any number of times.
    pub fn cancel<F: FrameRequester>(&mut self, frames: &mut F) {
        if let Some(handle) = self.pending.take() {
            frames.cancel_frame(handle);
        }
        if self.state != LoopState::Cancelled {
            debug!(frames = self.frames, "render loop cancelled");
            self.state = LoopState::Cancelled;
        }
    }

    fn elapsed_at(&mut self, now: Instant) -> Duration {
        let origin = *self.time_origin.get_or_insert(now);
        let elapsed = now.saturating_duration_since(origin).max(self.last_elapsed);
        self.last_elapsed = elapsed;
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Frames {
        next: u64,
        outstanding: Vec<AnimationHandle>,
        requested: usize,
    }

    impl FrameRequester for Frames {
        fn request_frame(&mut self) -> AnimationHandle {
            self.next += 1;
            self.requested += 1;
            let handle = AnimationHandle(self.next);
            self.outstanding.push(handle);
            handle
        }

        fn cancel_frame(&mut self, handle: AnimationHandle) {
            self.outstanding.retain(|pending| *pending != handle);
        }
    }

    #[test]
    fn elapsed_never_runs_backwards() {
        let mut frames = Frames::default();
        let mut render_loop = RenderLoop::new();
        let origin = Instant::now();
        render_loop.start(&mut frames, origin).unwrap();

        let handle = render_loop.pending().unwrap();
        let first =
            render_loop.on_frame(&mut frames, handle, origin + Duration::from_millis(20), |_| true);
        assert_eq!(first, FrameOutcome::Rendered { elapsed: 0.02 });

        // A host clock that jitters backwards must not rewind the animation.
        let handle = render_loop.pending().unwrap();
        let second =
            render_loop.on_frame(&mut frames, handle, origin + Duration::from_millis(10), |_| true);
        assert_eq!(second, FrameOutcome::Rendered { elapsed: 0.02 });
    }

    #[test]
    fn work_can_stop_the_loop() {
        let mut frames = Frames::default();
        let mut render_loop = RenderLoop::new();
        let origin = Instant::now();
        render_loop.start(&mut frames, origin).unwrap();
        let handle = render_loop.pending().unwrap();
        render_loop.on_frame(&mut frames, handle, origin, |_| false);
        assert_eq!(render_loop.state(), LoopState::Cancelled);
        assert!(render_loop.pending().is_none());
        assert_eq!(frames.requested, 1);
    }

    #[test]
    fn cancelled_loop_cannot_restart() {
        let mut frames = Frames::default();
        let mut render_loop = RenderLoop::new();
        render_loop.cancel(&mut frames);
        assert_eq!(
            render_loop.start(&mut frames, Instant::now()),
            Err(LoopError::NotIdle(LoopState::Cancelled))
        );
        assert_eq!(frames.requested, 0);
    }
}
