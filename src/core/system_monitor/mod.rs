//! Host load sampling.
//!
//! Provides CPU, memory and root disk usage percentages on a fixed cadence
//! while installers run.

mod collector;
mod metrics;
pub mod parse;
mod runtime;

pub use collector::{create_source, CommandSource, MetricsSource, NativeSource};
pub use metrics::{used_percent, MetricsBackend, MetricsSnapshot};
pub use runtime::{snapshot_channel, MetricsSampler, SnapshotSender};
