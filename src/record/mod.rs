//! Recording: the recorder state machine, hold timing and cancellation.

pub(crate) mod cancel;
pub(crate) mod clock;
pub(crate) mod recorder;
pub(crate) mod timeline;
