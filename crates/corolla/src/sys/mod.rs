pub mod desktop;
pub mod runtime;
pub mod server;
