//! Per-domain telemetry collectors.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  CachedCollector<C: Collect>                 │
//! │        interval gate · stale-over-error · placeholder        │
//! │  ┌────────┐ ┌──────────┐ ┌─────────┐ ┌─────────┐ ┌───────┐   │
//! │  │ System │ │ Hardware │ │ Network │ │ Storage │ │Process│ … │
//! │  └───┬────┘ └────┬─────┘ └────┬────┘ └────┬────┘ └───┬───┘   │
//! │      └───────────┴──── FallbackChain ─────┴──────────┘       │
//! │                               │                              │
//! │                         Host<F, R>                           │
//! └───────────────────────────────┼──────────────────────────────┘
//!                 ┌───────────────┴───────────────┐
//!          ┌──────▼──────┐                 ┌──────▼───────┐
//!          │ FileSystem  │                 │CommandRunner │
//!          │RealFs/MockFs│                 │System/Mock   │
//!          └─────────────┘                 └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use std::time::Duration;
//! use hostdash_core::collector::{CachedCollector, Host, MockFs, MockRunner, SystemCollector};
//!
//! let host = Host::new(
//!     MockFs::new().with_file("/proc/uptime", "3600.0 100.0"),
//!     MockRunner::new(),
//! );
//! let mut system = CachedCollector::new(SystemCollector::new(host), Duration::from_secs(5));
//! let info = system.collect();
//! assert_eq!(info.data().unwrap().uptime, "up 1 hora, 0 minutos");
//! ```

mod battery;
mod cached;
mod command;
mod device;
mod fallback;
mod hardware;
mod host;
pub mod mock;
mod network;
pub mod parser;
mod process;
mod storage;
mod system;
mod traits;

pub use battery::{BatteryProfile, normalize_supply_temp, probe_battery};
pub use cached::{CachedCollector, Collect, CollectError, CollectFailure, Collected, DomainCollector};
pub use command::{CommandError, CommandRunner, Invocation, SystemRunner};
pub use device::DeviceCollector;
pub use fallback::{FallbackChain, ProbeError, ProbeResult};
pub use hardware::HardwareCollector;
pub use host::Host;
pub use mock::{MockFs, MockRunner, Scenario};
pub use network::{NetworkCollector, SocketProbe, udp_route_ip};
pub use process::ProcessCollector;
pub use storage::StorageCollector;
pub use system::SystemCollector;
pub use traits::{FileSystem, RealFs};
