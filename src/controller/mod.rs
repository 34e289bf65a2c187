pub use facade::Controller;
pub(self) use chat::*;
pub(self) use knockout::*;
pub(self) use player::*;
pub use widget::SpectateError;
pub(self) use widget::WidgetController;

mod chat;
mod facade;
mod knockout;
mod player;
mod widget;
