//! The knockout engine: players are ranked by their best time on each map,
//! and the slowest are eliminated at the end of it, until one remains.
//!
//! Everything in here is synchronous and free of I/O. Timestamps are
//! passed in by the caller.

pub use display::*;
pub use elimination::*;
pub use player::*;
pub use ranking::*;
pub use standings::*;
pub use state::*;
pub use threshold::*;

mod display;
mod elimination;
mod player;
mod ranking;
mod standings;
mod state;
mod threshold;
