//! Perception, decision policy, and tick loop for the Empathy robot simulation.
//!
//! Data flows one way per tick: perception feeds the knowledge store, the
//! knowledge store feeds the decision policy, the policy steers kinematics,
//! and the next tick perceives the result.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter and the wall-clock [`TimeSource`] abstraction.
//! - [`config`] -- Configuration loading from `empathy-config.yaml` into
//!   strongly-typed structs.
//! - [`decision`] -- [`BehaviorPolicy`] trait with empathetic and selfish policies.
//! - [`operator`] -- Run bounds and the external stop signal.
//! - [`perception`] -- Vision-cone sensing of walls, target, and peers.
//! - [`render`] -- [`RenderSink`] collaborator trait.
//! - [`report`] -- Dock and run records plus the [`RunLogger`] collaborator trait.
//! - [`runner`] -- The frame-limited simulation loop.
//! - [`tick`] -- One synchronous tick over every robot.
//!
//! [`TimeSource`]: clock::TimeSource
//! [`BehaviorPolicy`]: decision::BehaviorPolicy
//! [`RenderSink`]: render::RenderSink
//! [`RunLogger`]: report::RunLogger

pub mod clock;
pub mod config;
pub mod decision;
pub mod operator;
pub mod perception;
pub mod render;
pub mod report;
pub mod runner;
pub mod tick;
