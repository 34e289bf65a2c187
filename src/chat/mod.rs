pub use command::*;
pub use message::*;

mod command;
mod message;
