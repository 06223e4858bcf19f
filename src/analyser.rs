//! Table operations and the staged pipeline built on them.

pub mod lifecycle;
pub mod logic;
