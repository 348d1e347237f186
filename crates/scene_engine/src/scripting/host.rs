//! Script host

use std::collections::BTreeMap;

use crate::foundation::time::Stopwatch;
use crate::render::Camera;
use crate::scene::SceneGraph;

use super::{Script, ScriptContext, ScriptError, ScriptResult, ScriptState, ScriptStep};

struct ScriptEntry {
    script: Box<dyn Script>,
    state: ScriptState,
}

/// Owns named scripts and resumes them once per frame
///
/// Scripts are visited in name order. Once a tick has used up its time
/// budget the remaining scripts are left for the next frame, and the next
/// tick starts where this one stopped. At least one script runs per tick,
/// so a zero budget resumes scripts one at a time in rotation.
pub struct ScriptHost {
    scripts: BTreeMap<String, ScriptEntry>,
    budget_ms: f32,
    resume_from: Option<String>,
}

impl ScriptHost {
    /// Create a host with a per-tick time budget in milliseconds
    pub fn new(budget_ms: f32) -> Self {
        Self {
            scripts: BTreeMap::new(),
            budget_ms: budget_ms.max(0.0),
            resume_from: None,
        }
    }

    /// Per-tick time budget in milliseconds
    pub fn budget_ms(&self) -> f32 {
        self.budget_ms
    }

    /// Load `script` as `name` in the running state, replacing any script of the same name
    pub fn load(&mut self, name: impl Into<String>, script: impl Script + 'static) {
        let name = name.into();
        let entry = ScriptEntry {
            script: Box::new(script),
            state: ScriptState::Running,
        };
        if self.scripts.insert(name.clone(), entry).is_some() {
            log::info!("Reloaded script '{name}'");
        } else {
            log::info!("Loaded script '{name}'");
        }
    }

    /// Unload a script
    pub fn remove(&mut self, name: &str) -> ScriptResult<()> {
        self.scripts
            .remove(name)
            .map(|_| log::debug!("Removed script '{name}'"))
            .ok_or_else(|| ScriptError::NotFound(name.to_string()))
    }

    /// Hold a running or waiting script
    ///
    /// A pending wait is dropped; the script resumes on the first tick after
    /// [`resume`](Self::resume).
    pub fn pause(&mut self, name: &str) -> ScriptResult<()> {
        let entry = self.entry_mut(name)?;
        match entry.state {
            ScriptState::Running | ScriptState::Waiting { .. } => {
                entry.state = ScriptState::Paused;
                Ok(())
            }
            ScriptState::Paused => Ok(()),
            ref other => Err(invalid(name, "pause", other)),
        }
    }

    /// Release a paused script
    pub fn resume(&mut self, name: &str) -> ScriptResult<()> {
        let entry = self.entry_mut(name)?;
        match entry.state {
            ScriptState::Paused => {
                entry.state = ScriptState::Running;
                Ok(())
            }
            ScriptState::Running | ScriptState::Waiting { .. } => Ok(()),
            ref other => Err(invalid(name, "resume", other)),
        }
    }

    /// Stop a script for good; it stays loaded for inspection
    pub fn stop(&mut self, name: &str) -> ScriptResult<()> {
        let entry = self.entry_mut(name)?;
        if entry.state.is_alive() {
            entry.state = ScriptState::Stopped;
            log::debug!("Stopped script '{name}'");
        }
        Ok(())
    }

    /// Loaded script names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.scripts.keys().map(String::as_str).collect()
    }

    /// State of a script
    pub fn state(&self, name: &str) -> Option<&ScriptState> {
        self.scripts.get(name).map(|entry| &entry.state)
    }

    /// Number of scripts that may still be resumed
    pub fn running_count(&self) -> usize {
        self.scripts.values().filter(|entry| entry.state.is_alive()).count()
    }

    /// Number of loaded scripts
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Whether no scripts are loaded
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Resume every runnable script once
    ///
    /// Returns how many scripts were resumed. Script failures are logged and
    /// recorded in their state.
    pub fn tick(&mut self, now: f32, delta_time: f32, graph: &mut SceneGraph, camera: &mut Camera) -> usize {
        let mut order: Vec<String> = self.scripts.keys().cloned().collect();
        if let Some(start) = self.resume_from.take() {
            let split = order.partition_point(|name| *name < start);
            order.rotate_left(split);
        }

        let stopwatch = Stopwatch::start_new();
        let mut resumed = 0;

        for (index, name) in order.iter().enumerate() {
            if resumed > 0 && stopwatch.elapsed_millis() >= self.budget_ms {
                log::debug!(
                    "Script budget of {:.2} ms exhausted, deferring {} script(s)",
                    self.budget_ms,
                    order.len() - index
                );
                self.resume_from = Some(name.clone());
                break;
            }

            let Some(entry) = self.scripts.get_mut(name) else {
                continue;
            };
            let runnable = match entry.state {
                ScriptState::Running => true,
                ScriptState::Waiting { resume_at } => now >= resume_at,
                _ => false,
            };
            if !runnable {
                continue;
            }

            let mut ctx = ScriptContext {
                graph: &mut *graph,
                camera: &mut *camera,
                time: now,
                delta_time,
            };
            entry.state = match entry.script.resume(&mut ctx) {
                ScriptStep::Wait(seconds) => ScriptState::Waiting {
                    resume_at: now + seconds.max(0.0),
                },
                ScriptStep::Done => {
                    log::debug!("Script '{name}' finished");
                    ScriptState::Stopped
                }
                ScriptStep::Fail(reason) => {
                    log::error!("[Script][{name}] Error: {reason}");
                    ScriptState::Failed(reason)
                }
            };
            resumed += 1;
        }

        resumed
    }

    fn entry_mut(&mut self, name: &str) -> ScriptResult<&mut ScriptEntry> {
        self.scripts
            .get_mut(name)
            .ok_or_else(|| ScriptError::NotFound(name.to_string()))
    }
}

impl Default for ScriptHost {
    fn default() -> Self {
        Self::new(crate::config::ScriptConfig::default().budget_ms)
    }
}

fn invalid(name: &str, action: &'static str, state: &ScriptState) -> ScriptError {
    ScriptError::InvalidTransition {
        name: name.to_string(),
        action,
        state: state.label(),
    }
}
