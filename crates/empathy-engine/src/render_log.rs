//! Headless render sink that traces robot views.
//!
//! There is no window. Every `every` ticks each robot's pose, state, and
//! display color is emitted at `debug` level, which is enough to replay a
//! run in an external viewer.

use empathy_core::render::RenderSink;
use empathy_types::AgentView;
use tracing::debug;

/// Traces a frame every N ticks.
#[derive(Debug, Clone, Copy)]
pub struct TraceRenderer {
    every: u64,
}

impl TraceRenderer {
    /// Emit a frame every `every` ticks. Zero never emits.
    pub const fn new(every: u64) -> Self {
        Self { every }
    }
}

impl RenderSink for TraceRenderer {
    fn wants_frame(&self, tick: u64) -> bool {
        tick.checked_rem(self.every) == Some(0)
    }

    fn render(&mut self, tick: u64, views: &[AgentView]) {
        for view in views {
            debug!(
                tick,
                agent = %view.label,
                x = view.pose.position.x,
                y = view.pose.position.y,
                heading = view.pose.heading,
                state = ?view.state,
                color = ?view.color,
                "Frame"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_on_multiples_only() {
        let sink = TraceRenderer::new(30);
        assert!(sink.wants_frame(30));
        assert!(sink.wants_frame(60));
        assert!(!sink.wants_frame(31));
        assert!(!TraceRenderer::new(0).wants_frame(0));
    }
}
