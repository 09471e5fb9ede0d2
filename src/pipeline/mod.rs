//! Request-processing pipeline.
//!
//! # Data Flow
//! ```text
//! request
//!     → stage.rs GATES[0]: authenticate   ── reject → 401 ─┐
//!     → stage.rs GATES[1]: rate limit     ── reject → 429 ─┤
//!     → audit (wraps) → catalog handler                    │
//!         → ErrorTranslator (handler failures → envelope)  │
//!     → SecurityHeaders ◀──────────────────────────────────┘
//!     → response
//! ```
//!
//! # Design Decisions
//! - The gate order is data (`GATES`), not framework inference
//! - Gates short-circuit; nothing is retried
//! - Header injection is the last step on every exit path

pub mod runner;
pub mod stage;

pub use runner::{run_pipeline, Pipeline};
pub use stage::{Gate, PipelineState, GATES};
