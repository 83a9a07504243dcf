//! # tripleforge
//!
//! Application layer around `tripleforge-core`: CLI, configuration and the
//! transactional publisher.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 apps/tripleforge (THE BINARY)            │
//! │                                                          │
//! │   ┌─────────────┐   ┌─────────────┐   ┌──────────────┐   │
//! │   │    CLI      │   │   Config    │   │  Publisher   │   │
//! │   │   (clap)    │   │   (toml)    │   │  (reqwest)   │   │
//! │   └──────┬──────┘   └──────┬──────┘   └──────┬───────┘   │
//! │          └─────────────────┼─────────────────┘           │
//! │                            ▼                             │
//! │                  ┌──────────────────┐                    │
//! │                  │ tripleforge-core │                    │
//! │                  │   (THE LOGIC)    │                    │
//! │                  └──────────────────┘                    │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod config;
pub mod publisher;
