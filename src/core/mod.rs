//! # Core Application Logic
//!
//! Vista's business logic. It knows nothing about any specific UI
//! technology and talks to the server only through the `VideoBackend` trait.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • lifecycle (upload)   │
//!                    │  • conversation + chat  │
//!                    │  • update() (reducer)   │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌──────────────┐
//!     │    TUI     │      │    CLI     │      │ VideoBackend │
//!     │  Adapter   │      │ subcommands│      │ (api module) │
//!     │ (ratatui)  │      │            │      │              │
//!     └────────────┘      └────────────┘      └──────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`upload`]: file guards (MIME type, size ceiling)
//! - [`retry`]: fixed-interval polling with an attempt budget
//! - [`session`]: monotonic tracking of one server session
//! - [`lifecycle`]: upload → analyze → ready state machine
//! - [`conversation`]: the single-owner transcript store
//! - [`chat`]: the send-message flow
//! - [`thoughts`]: reasoning panel selection and formatting
//! - [`reveal`]: typewriter effect for answers
//! - [`config`]: layered configuration
//! - [`state`] / [`action`]: the `App` struct and its reducer

pub mod action;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod lifecycle;
pub mod retry;
pub mod reveal;
pub mod session;
pub mod state;
pub mod thoughts;
pub mod upload;
