pub use calls::*;
pub use events::*;
pub use stdio::*;
pub use structs::*;

mod calls;
mod events;
mod stdio;
mod structs;
