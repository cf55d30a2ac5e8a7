//! Application-wide constants

/// A poll needs at least this many non-blank options.
pub const MIN_POLL_OPTIONS: usize = 2;

/// Default username displayed for unauthenticated users
pub const GUEST_USERNAME: &str = "Guest";

/// Shown in place of authored content whose author account is gone.
pub const DELETED_USERNAME: &str = "[deleted user]";
