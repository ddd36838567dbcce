//! # Groove-Alarm
//!
//! The alarm side of GrooveWake: minute-of-day time arithmetic, UI-facing
//! events, and the three-state alarm machine.
//!
//! ## Alarm flow
//!
//! ```text
//!            dance (1 min per second)
//!   Setup ────────────────────────────► target advances, clamped 11:59 PM
//!     │ set_alarm (target past midnight)
//!     ▼
//!   Waiting ──── 1 Hz clock tick, minute-of-day >= target ────► Ringing
//!     │ cancel                                                    │
//!     ▼                                                           │
//!   Setup ◄──────────── 10 accumulated seconds of dancing ────────┘
//! ```

pub mod clock;
pub mod events;
pub mod machine;

pub use clock::*;
pub use events::*;
pub use machine::*;
