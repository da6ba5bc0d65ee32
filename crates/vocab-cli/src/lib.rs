//! Library side of the `vocab` operator console.

pub mod commands;
pub mod logging;
