//! Built-in animation scripts

use crate::foundation::math::{constants, Vec3};
use crate::scene::NodeHandle;

use super::{Script, ScriptContext, ScriptStep};

/// Rotates a node at a constant rate, forever
#[derive(Debug, Clone)]
pub struct Spinner {
    node: NodeHandle,
    degrees_per_second: Vec3,
}

impl Spinner {
    /// Spin `node` by `degrees_per_second` around each local axis
    pub fn new(node: NodeHandle, degrees_per_second: Vec3) -> Self {
        Self { node, degrees_per_second }
    }

    /// Spin `node` around Z only, the usual 2D case
    pub fn planar(node: NodeHandle, degrees_per_second: f32) -> Self {
        Self::new(node, Vec3::new(0.0, 0.0, degrees_per_second))
    }
}

impl Script for Spinner {
    fn resume(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptStep {
        let node = match ctx.graph.node_mut(self.node) {
            Ok(node) => node,
            Err(err) => return ScriptStep::Fail(err.to_string()),
        };
        let rotation = &mut node.transform.rotation;
        *rotation += self.degrees_per_second * ctx.delta_time;
        rotation.apply(|angle| *angle %= 360.0);
        ScriptStep::Wait(0.0)
    }
}

/// Moves a node back and forth along an axis around its starting position
#[derive(Debug, Clone)]
pub struct Oscillator {
    node: NodeHandle,
    offset: Vec3,
    frequency_hz: f32,
    origin: Option<Vec3>,
    elapsed: f32,
}

impl Oscillator {
    /// Oscillate `node` by up to `offset` either side of where it starts
    pub fn new(node: NodeHandle, offset: Vec3, frequency_hz: f32) -> Self {
        Self {
            node,
            offset,
            frequency_hz,
            origin: None,
            elapsed: 0.0,
        }
    }
}

impl Script for Oscillator {
    fn resume(&mut self, ctx: &mut ScriptContext<'_>) -> ScriptStep {
        let node = match ctx.graph.node_mut(self.node) {
            Ok(node) => node,
            Err(err) => return ScriptStep::Fail(err.to_string()),
        };
        let origin = *self.origin.get_or_insert(node.transform.position);
        self.elapsed += ctx.delta_time;
        let phase = 2.0 * constants::PI * self.frequency_hz * self.elapsed;
        node.transform.position = origin + self.offset * phase.sin();
        ScriptStep::Wait(0.0)
    }
}
