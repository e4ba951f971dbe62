//! In-memory stand-ins for the host: a mock filesystem, a scripted command
//! runner, and ready-made scenarios combining the two.

mod filesystem;
mod runner;
mod scenarios;

pub use filesystem::MockFs;
pub use runner::{MockRunner, Scripted};
pub use scenarios::Scenario;
