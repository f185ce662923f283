//! Jukebox Rotation
//!
//! The queue head engine: decides what plays next on a shared queue.
//!
//! This crate provides:
//! - `RotationEngine`: head resolution, playback-state updates, advance
//! - Replenishment when a queue runs dry (history pick, least-played
//!   fallback, artist radio)
//! - `HeadCache`: per-queue cache keys and TTL policy over any `Cache`
//! - `MemoryCache`: bounded in-process `Cache` with per-entry expiry
//! - `SourceRegistry`: metadata backends behind a bounded timeout
//! - Mutation notifications and the `PlaylistService`
//!
//! # Architecture
//!
//! The engine holds no locks across calls. The cache is an accelerator in
//! front of the database: every miss falls back to `jukebox-storage`, and
//! concurrent misses may replenish twice.
//!
//! # Example
//!
//! ```rust,no_run
//! use jukebox_rotation::{MemoryCache, RotationConfig, RotationEngine, SourceRegistry, TracingPublisher};
//! use std::sync::Arc;
//!
//! # async fn example(pool: sqlx::SqlitePool) -> jukebox_core::Result<()> {
//! let config = RotationConfig::default();
//! let engine = RotationEngine::new(
//!     pool,
//!     SourceRegistry::new(config.source_timeout()),
//!     Arc::new(MemoryCache::new(4096)),
//!     Arc::new(TracingPublisher),
//!     config,
//! );
//!
//! let head = engine.get_head(1, true).await?;
//! println!("Now playing: {}", head.track.name);
//!
//! let next = engine.advance(1).await?;
//! println!("Up next: {}", next.track.name);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod engine;
pub mod notify;
pub mod playlists;
mod replenish;
pub mod sources;

pub use cache::{HeadCache, MemoryCache};
pub use config::{ReplenishStrategy, RotationConfig, UpdateMissPolicy};
pub use engine::RotationEngine;
pub use notify::{BroadcastPublisher, ChannelMessage, Notifier, TracingPublisher};
pub use playlists::PlaylistService;
pub use sources::SourceRegistry;
