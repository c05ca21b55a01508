//! Plugin module - orchestrates synthesis during the packaging lifecycle

mod package;
pub(crate) mod service;

pub use package::{ForwardingOutcome, SkipReason};
pub use service::{TimberPlugin, PACKAGE_HOOK};
