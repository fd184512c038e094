//! # rf-reel — Reel animation and spin orchestration
//!
//! Drives the visible side of a spin: five independently animated reels,
//! staggered start/stop commands, exact alignment on the committed outcome,
//! and the character bonus that replaces a winning reel.
//!
//! ## Architecture
//!
//! ```text
//! SlotMachine
//!     │
//!     ├── ReelBank ───────────── OutcomeEngine (rf-slot)
//!     │     │  timeline: Start(i) … Stop(i, targets)
//!     │     └── Reel × N
//!     │           └── InstanceRing (SymbolInstance × visible + lookahead)
//!     │
//!     ├── BankEvent channel ──> ColumnWin routing
//!     │
//!     └── BonusPresenter ──> SkeletonRenderer (external)
//!
//! AssetCatalog (external, injected) ──> SymbolTextures / SkeletonData
//! ```
//!
//! Everything runs on one thread, advanced by [`SlotMachine::tick`] (or
//! [`ReelBank::tick`]) once per rendered frame.

pub mod assets;
pub mod bank;
pub mod bonus;
pub mod config;
pub mod error;
pub mod event;
pub mod instance;
pub mod layout;
pub mod machine;
pub mod motion;
pub mod reel;
pub mod timing;

pub use assets::*;
pub use bank::*;
pub use bonus::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use instance::*;
pub use layout::*;
pub use machine::*;
pub use motion::*;
pub use reel::*;
pub use timing::*;
