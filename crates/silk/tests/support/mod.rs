#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use silk::{
    AnimationHandle, FrameError, FrameRequester, RenderingContext, StageKind, Uniforms, Viewport,
};

/// Everything observable that happened to the fakes, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Compiled(StageKind),
    Linked,
    BufferCreated,
    Viewport(Viewport),
    Draw(Uniforms),
    ReleasedProgram,
    ReleasedStage(StageKind),
    ReleasedBuffer,
    ContextDropped,
    FrameRequested(AnimationHandle),
    FrameCancelled(AnimationHandle),
}

#[derive(Debug, Default)]
pub struct Ledger {
    pub events: Vec<Event>,
    pub live_stages: usize,
    pub live_programs: usize,
    pub live_buffers: usize,
    pub link_calls: usize,
    pub pending_frames: Vec<AnimationHandle>,
    next_handle: u64,
}

impl Ledger {
    pub fn live_objects(&self) -> usize {
        self.live_stages + self.live_programs + self.live_buffers
    }

    pub fn draws(&self) -> Vec<Uniforms> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Draw(uniforms) => Some(*uniforms),
                _ => None,
            })
            .collect()
    }

    pub fn viewports(&self) -> Vec<Viewport> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Viewport(viewport) => Some(*viewport),
                _ => None,
            })
            .collect()
    }

    pub fn frames_requested(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, Event::FrameRequested(_)))
            .count()
    }

    pub fn position(&self, wanted: &Event) -> Option<usize> {
        self.events.iter().position(|event| event == wanted)
    }
}

/// Shared ledger handed to both fakes so their events interleave.
#[derive(Clone, Default)]
pub struct Harness {
    pub ledger: Rc<RefCell<Ledger>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> RecordingContext {
        RecordingContext {
            ledger: self.ledger.clone(),
            fail_link: false,
            fail_allocation: false,
            draw_errors: VecDeque::new(),
        }
    }

    pub fn frames(&self) -> ManualFrames {
        ManualFrames {
            ledger: self.ledger.clone(),
        }
    }

    /// Plays the host: hands out the oldest pending frame callback.
    pub fn fire(&self) -> Option<AnimationHandle> {
        let mut ledger = self.ledger.borrow_mut();
        if ledger.pending_frames.is_empty() {
            None
        } else {
            Some(ledger.pending_frames.remove(0))
        }
    }

    pub fn pending_frames(&self) -> usize {
        self.ledger.borrow().pending_frames.len()
    }
}

pub struct MockStage {
    kind: StageKind,
}

pub struct MockProgram;

pub struct MockBuffer;

/// `RenderingContext` that records every call and can be told to fail.
///
/// Compilation fails for any source containing `SYNTAX ERROR`.
pub struct RecordingContext {
    ledger: Rc<RefCell<Ledger>>,
    pub fail_link: bool,
    pub fail_allocation: bool,
    pub draw_errors: VecDeque<FrameError>,
}

impl RenderingContext for RecordingContext {
    type Stage = MockStage;
    type Program = MockProgram;
    type Buffer = MockBuffer;

    fn compile_stage(&mut self, stage: StageKind, source: &str) -> Result<MockStage, String> {
        if source.contains("SYNTAX ERROR") {
            return Err(format!("0:1: '{stage}' : syntax error"));
        }
        let mut ledger = self.ledger.borrow_mut();
        ledger.live_stages += 1;
        ledger.events.push(Event::Compiled(stage));
        Ok(MockStage { kind: stage })
    }

    fn link_program(&mut self, vertex: &MockStage, fragment: &MockStage) -> Result<MockProgram, String> {
        assert_eq!(vertex.kind, StageKind::Vertex);
        assert_eq!(fragment.kind, StageKind::Fragment);
        let mut ledger = self.ledger.borrow_mut();
        ledger.link_calls += 1;
        if self.fail_link {
            return Err("varying mismatch".into());
        }
        ledger.live_programs += 1;
        ledger.events.push(Event::Linked);
        Ok(MockProgram)
    }

    fn create_vertex_buffer(&mut self, vertices: &[[f32; 2]]) -> Result<MockBuffer, String> {
        assert_eq!(vertices.len(), 4);
        if self.fail_allocation {
            return Err("out of memory".into());
        }
        let mut ledger = self.ledger.borrow_mut();
        ledger.live_buffers += 1;
        ledger.events.push(Event::BufferCreated);
        Ok(MockBuffer)
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.ledger.borrow_mut().events.push(Event::Viewport(viewport));
    }

    fn draw(
        &mut self,
        _program: &MockProgram,
        _geometry: &MockBuffer,
        vertex_count: u32,
        uniforms: Uniforms,
    ) -> Result<(), FrameError> {
        assert_eq!(vertex_count, 4);
        if let Some(err) = self.draw_errors.pop_front() {
            return Err(err);
        }
        self.ledger.borrow_mut().events.push(Event::Draw(uniforms));
        Ok(())
    }

    fn release_program(&mut self, _program: MockProgram) {
        let mut ledger = self.ledger.borrow_mut();
        ledger.live_programs -= 1;
        ledger.events.push(Event::ReleasedProgram);
    }

    fn release_stage(&mut self, stage: MockStage) {
        let mut ledger = self.ledger.borrow_mut();
        ledger.live_stages -= 1;
        ledger.events.push(Event::ReleasedStage(stage.kind));
    }

    fn release_buffer(&mut self, _buffer: MockBuffer) {
        let mut ledger = self.ledger.borrow_mut();
        ledger.live_buffers -= 1;
        ledger.events.push(Event::ReleasedBuffer);
    }
}

impl Drop for RecordingContext {
    fn drop(&mut self) {
        self.ledger.borrow_mut().events.push(Event::ContextDropped);
    }
}

/// `FrameRequester` whose callbacks only fire when the test says so.
pub struct ManualFrames {
    ledger: Rc<RefCell<Ledger>>,
}

impl FrameRequester for ManualFrames {
    fn request_frame(&mut self) -> AnimationHandle {
        let mut ledger = self.ledger.borrow_mut();
        ledger.next_handle += 1;
        let handle = AnimationHandle(ledger.next_handle);
        ledger.pending_frames.push(handle);
        ledger.events.push(Event::FrameRequested(handle));
        handle
    }

    fn cancel_frame(&mut self, handle: AnimationHandle) {
        let mut ledger = self.ledger.borrow_mut();
        ledger.pending_frames.retain(|pending| *pending != handle);
        ledger.events.push(Event::FrameCancelled(handle));
    }
}
