//! Avatar Gateway - conversational speech gateway for talking avatars
//!
//! This library turns one chat message into one spoken, animated reply:
//! a hosted language model writes the reply, a speech-synthesis service
//! voices it, and a small signal-processing core derives a mouth-open/closed
//! timing track from the audio loudness envelope. The audio and a
//! conversation record are persisted, and the reply is pushed to subscribed
//! avatar clients in real time.
//!
//! # Data flow
//!
//! ```text
//! request text
//!     │
//!     ▼
//! language model ──► reply text ──► speech synthesis ──► waveform
//!                                                           │
//!                         ┌─────────────────────────────────┘
//!                         ▼
//!          envelope ──► threshold ──► lip-sync track
//!                                         │
//!                                         ▼
//!                          object storage + record store + push
//! ```

pub mod api;
pub mod audio;
pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod lipsync;
pub mod model;
pub mod notify;
pub mod storage;
pub mod tts;

pub use chat::{ChatOutcome, ChatPipeline};
pub use config::Config;
pub use db::{DbConn, DbPool, Exchange, ExchangeRepo};
pub use error::{Error, Result};
pub use lipsync::{LipSyncConfig, LipSyncTrack, VisemeEvent, Waveform};
