pub mod config;
pub mod solve;
pub mod typewriter;
