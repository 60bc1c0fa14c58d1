//! Headless application layer: host, scripted input and the frame loop

pub mod autopilot;
pub mod host;
pub mod runner;

pub use autopilot::Autopilot;
pub use host::HeadlessHost;
pub use runner::{Session, SessionReport};
