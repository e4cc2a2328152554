//! Accept loop and worker bookkeeping.

pub mod listener;

pub use listener::Listener;
