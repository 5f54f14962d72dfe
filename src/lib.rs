pub mod actuator;
pub mod config;
pub mod gesture;
pub mod logging;
pub mod pose;
pub mod processor;
pub mod protocol;
pub mod session;
pub mod server;

#[cfg(test)]
mod test_support;
