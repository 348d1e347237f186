//! Window collaborator
//!
//! The engine never talks to a windowing library directly. It polls a
//! [`WindowSource`] for events once per frame and asks it to present when
//! the frame is drawn. [`HeadlessWindow`] replays scripted events for tests
//! and offscreen runs.

use std::collections::VecDeque;

use crate::application::AppEvent;
use crate::render::RenderResult;

/// Source of window events and owner of the presentation surface
pub trait WindowSource {
    /// Events received since the previous poll
    fn poll_events(&mut self) -> Vec<AppEvent>;

    /// Whether the window wants to close
    fn should_close(&self) -> bool;

    /// Framebuffer size in pixels
    fn framebuffer_size(&self) -> (u32, u32);

    /// Show the frame that was just drawn
    fn present(&mut self) -> RenderResult<()>;
}

/// Window without a surface that replays queued events
///
/// Each poll delivers one queued batch. The window asks to close after a
/// fixed number of presented frames, or when a
/// [`AppEvent::WindowCloseRequested`] is delivered.
#[derive(Debug)]
pub struct HeadlessWindow {
    size: (u32, u32),
    batches: VecDeque<Vec<AppEvent>>,
    frame_limit: Option<u64>,
    presented: u64,
    close_requested: bool,
}

impl HeadlessWindow {
    /// Create a headless window of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            batches: VecDeque::new(),
            frame_limit: None,
            presented: 0,
            close_requested: false,
        }
    }

    /// Close after `frames` presented frames
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Queue a batch of events for a future poll
    pub fn push_events(&mut self, events: impl IntoIterator<Item = AppEvent>) {
        self.batches.push_back(events.into_iter().collect());
    }

    /// Number of frames presented so far
    pub fn presented_frames(&self) -> u64 {
        self.presented
    }
}

impl WindowSource for HeadlessWindow {
    fn poll_events(&mut self) -> Vec<AppEvent> {
        let events = self.batches.pop_front().unwrap_or_default();
        for event in &events {
            match *event {
                AppEvent::WindowResized { width, height } => self.size = (width, height),
                AppEvent::WindowCloseRequested => self.close_requested = true,
                _ => {}
            }
        }
        events
    }

    fn should_close(&self) -> bool {
        self.close_requested || self.frame_limit.is_some_and(|limit| self.presented >= limit)
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn present(&mut self) -> RenderResult<()> {
        self.presented += 1;
        Ok(())
    }
}
