//! Scene effects driven by the host's frame callback

pub mod pulse;
