//! Unix-specific platform implementations

mod signals;

pub use signals::UnixSignals;
