//! A Time Attack knockout controller: players race against the clock on
//! every map, and the slowest are eliminated until one player remains.
//!
//! The match logic in [`knockout`] is free of I/O. The [`controller`] feeds
//! it with events of the host game server, and sends chat messages, widgets
//! and reports in return.

pub mod chat;
pub mod config;
pub mod constants;
pub mod controller;
pub mod knockout;
pub mod report;
pub mod server;
pub mod widget;
