//! EDL uplink core: durable sequence/secret state and the glue between a
//! host pipeline and the frame codec.
//!
//! # Architecture
//!
//! ```text
//!   outbound                                   inbound
//!   payload ──> CommandFramer ──> frame        raw bytes ──> InboundAdapter
//!                   │    │                                       │
//!        next seq,  │    └── edl_proto::encode      edl_proto::decode (CRC only)
//!        secret     ↓                                            │
//!               Store<B: Bucket>                      invalid / sequence / time
//!                   │                                  stamped on HostPacket
//!          load on start, save on stop
//!                   ↓
//!            MemoryBucket | RedbBucket
//! ```
//!
//! The host owns every component and drives them with plain calls:
//! [`Store::start`] and [`Store::stop`] at service start and shutdown,
//! [`CommandFramer::frame`] per outgoing command, [`InboundAdapter::process`]
//! per received packet. Nothing here spawns threads or schedules work. The
//! only blocking I/O is in `start`/`stop` (plus per-advance writes when
//! [`PersistencePolicy::EveryAdvance`] is configured).
//!
//! # Modules
//!
//! - [`bucket`]: Durable key-value storage (memory, redb)
//! - [`store`]: Sequence counter and shared secret lifecycle
//! - [`outbound`]: Command framing using the store
//! - [`inbound`]: Host packet adapter for received frames
//! - [`mod@env`]: Wall-clock abstraction
//! - [`config`]: Store configuration
//! - [`error`]: Error types

#![forbid(unsafe_code)]

pub mod bucket;
pub mod config;
pub mod env;
pub mod error;
pub mod inbound;
pub mod outbound;
pub mod store;

pub use bucket::{Bucket, MemoryBucket, RedbBucket};
pub use config::{BootstrapPolicy, PersistencePolicy, StoreConfig};
pub use env::{Environment, SystemEnv};
pub use error::{BucketError, ConfigError, CoreError, StoreError};
pub use inbound::{HostPacket, InboundAdapter, InboundPacket};
pub use outbound::CommandFramer;
pub use store::{Store, StoreState};
