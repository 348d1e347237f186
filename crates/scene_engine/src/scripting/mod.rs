//! Script scheduling
//!
//! Scripts are explicit state machines: each frame the [`ScriptHost`]
//! resumes every runnable script once, and the script answers with a
//! [`ScriptStep`] saying whether to wait, finish or fail. Scripts reach the
//! scene and camera only through the [`ScriptContext`] handed to them, so
//! there is no global registry to look things up in.

mod builtin;
mod host;

use thiserror::Error;

use crate::render::Camera;
use crate::scene::SceneGraph;

pub use builtin::{Oscillator, Spinner};
pub use host::ScriptHost;

/// What a script wants after being resumed
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    /// Suspend for this many seconds; `0.0` resumes on the next frame
    Wait(f32),
    /// Finished normally
    Done,
    /// Finished with an error
    Fail(String),
}

/// Lifecycle state of a loaded script
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptState {
    /// Resumed on the next tick
    Running,
    /// Held by [`ScriptHost::pause`] until [`ScriptHost::resume`]
    Paused,
    /// Suspended until the host clock reaches `resume_at`
    Waiting {
        /// Host time in seconds at which the script becomes runnable
        resume_at: f32,
    },
    /// Finished or stopped; never resumed again
    Stopped,
    /// Returned [`ScriptStep::Fail`]; never resumed again
    Failed(String),
}

impl ScriptState {
    /// Whether the script may still be resumed at some point
    pub fn is_alive(&self) -> bool {
        matches!(self, Self::Running | Self::Paused | Self::Waiting { .. })
    }

    /// Short label for logs and inspectors
    pub fn label(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Waiting { .. } => "waiting",
            Self::Stopped => "stopped",
            Self::Failed(_) => "failed",
        }
    }
}

/// Everything a script may touch while resumed
pub struct ScriptContext<'a> {
    /// Scene being animated
    pub graph: &'a mut SceneGraph,
    /// Active camera
    pub camera: &'a mut Camera,
    /// Host clock in seconds
    pub time: f32,
    /// Seconds since the previous frame
    pub delta_time: f32,
}

/// A unit of per-frame behaviour
pub trait Script {
    /// Run until the next suspension point
    fn resume(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptStep;
}

impl<F> Script for F
where
    F: FnMut(&mut ScriptContext<'_>) -> ScriptStep,
{
    fn resume(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptStep {
        self(ctx)
    }
}

/// Script control errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    /// No script is loaded under this name
    #[error("No script named '{0}'")]
    NotFound(String),

    /// The requested transition is not allowed from the current state
    #[error("Cannot {action} script '{name}' while it is {state}")]
    InvalidTransition {
        /// Script name
        name: String,
        /// Attempted operation
        action: &'static str,
        /// Current state label
        state: &'static str,
    },
}

/// Result type for script control operations
pub type ScriptResult<T> = Result<T, ScriptError>;
