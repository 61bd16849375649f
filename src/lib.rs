// Library target shared by the binary, the integration tests in tests/ and
// the criterion benches. The binary entry point is main.rs.

pub mod browser;
pub mod commands;
pub mod config;
pub mod session;
pub mod store;
pub mod timing;
pub mod typing;
pub mod ui;
