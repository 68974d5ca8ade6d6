//! hvor daemon
//!
//! Keeps a classified page of the calendar in memory and serves it over HTTP.
//!
//! ```text
//! ┌───────────┐  tick  ┌──────────┐ publish ┌───────────────┐  read  ┌─────┐
//! │ Scheduler │───────▶│ Ingestor │────────▶│ SnapshotStore │◀───────│ API │
//! └───────────┘        └──────────┘         └───────────────┘        └─────┘
//! ```
//!
//! The first refresh happens at startup and must succeed; after that the
//! scheduler refreshes on a fixed period and a failure keeps the previous
//! snapshot.

pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod scheduler;
pub mod signals;
pub mod snapshot;
pub mod tokens;

pub use api::{ApiState, build_router};
pub use config::{Cli, FeedConfig, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use ingest::Ingestor;
pub use scheduler::{
    Scheduler, SchedulerConfig, SchedulerHandle, SchedulerPhase, SchedulerState,
    SharedSchedulerState,
};
pub use signals::{ShutdownHandle, ShutdownSignal};
pub use snapshot::{Snapshot, SnapshotStore};
pub use tokens::AccessTokens;
