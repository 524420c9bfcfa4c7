//! Render projection and the display collaborator.
//!
//! Color is never stored on a robot. [`agent_views`] projects behavioral
//! state into what a renderer needs, and the core never waits on the
//! renderer.

use empathy_agents::Agent;
use empathy_types::{AgentView, display_color};

use crate::perception::Perceiver;

/// Receives one frame of robot views per rendered tick.
pub trait RenderSink: Send {
    /// Whether a frame should be built for `tick`.
    fn wants_frame(&self, _tick: u64) -> bool {
        true
    }

    /// Draw a frame. Must not block the tick loop for long.
    fn render(&mut self, tick: u64, views: &[AgentView]);
}

/// A sink that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl RenderSink for NoOpSink {
    fn wants_frame(&self, _tick: u64) -> bool {
        false
    }

    fn render(&mut self, _tick: u64, _views: &[AgentView]) {}
}

/// Project every robot into a drawable view.
pub fn agent_views(agents: &[Agent], perceiver: &Perceiver, robot_size: f64) -> Vec<AgentView> {
    agents
        .iter()
        .map(|agent| AgentView {
            id: agent.id,
            label: agent.label.clone(),
            pose: agent.pose,
            size: robot_size,
            state: agent.state,
            color: display_color(agent.state, agent.category),
            cone: perceiver.vision_cone(&agent.pose),
        })
        .collect()
}
