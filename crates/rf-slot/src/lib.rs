//! # rf-slot — Symbol catalog and outcome engine
//!
//! Everything that decides *what* lands on the reels, independent of how the
//! reels are animated:
//!
//! - **Symbol Catalog**: symbol id → display asset, sampling weight, payout value
//! - **Outcome Engine**: weighted-random grid generation and deterministic
//!   evaluation of a fixed grid into paylines and column-win triggers
//! - **Spin Result**: the immutable record handed back to the caller
//!
//! ## Architecture
//!
//! ```text
//! SlotConfig (grid + symbol definitions)
//!     │
//!     v
//! SymbolCatalog ──weighted_sample()──> OutcomeEngine::generate_grid()
//!                                           │
//!                                           v
//!                                      Grid (reels × rows)
//!                                           │
//!                                           v
//!                              OutcomeEngine::evaluate() → Evaluation
//!                                           │
//!                                           v
//!                                       SpinResult
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod outcome;
pub mod spin;

pub use catalog::*;
pub use config::*;
pub use error::*;
pub use outcome::*;
pub use spin::*;
