//! Release checking
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐  due ids  ┌────────────────┐  get_versions  ┌─────────┐
//! │ Scheduler │──────────▶│ ReleaseChecker │───────────────▶│ Backend │
//! │ blacklist │           └────────────────┘                └─────────┘
//! └───────────┘             │            │
//!                           ▼            ▼
//!                    ┌──────────────┐ ┌──────────┐
//!                    │ ProjectStore │ │ Notifier │
//!                    └──────────────┘ └──────────┘
//! ```
//!
//! # Modules
//!
//! - [`backend`]: Upstream fetch contract and backend registry
//! - [`checker`]: One project's check, persistence and notification
//! - [`scheduler`]: Batches over a bounded pool with a shared rate-limit blacklist
//! - [`store`]: SQLite persistence of projects, version history and runs
//! - [`notify`]: Version change events
//! - [`models`]: Persisted records

pub mod backend;
pub mod checker;
pub mod error;
pub mod models;
pub mod notify;
pub mod scheduler;
pub mod store;
