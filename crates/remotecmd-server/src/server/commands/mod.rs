//! Commands the server registers next to the `/help` and `/status`
//! built-ins.

pub mod cpu;
pub mod say;
pub mod sleep;
pub mod time;

use crate::server::config::ServerConfig;
use remotecmd::{Result, ServiceBuilder};

/// Registers the built-ins plus every server command.
///
/// # Errors
///
/// Fails if two commands share a name.
pub fn register_all(builder: ServiceBuilder, config: &ServerConfig) -> Result<ServiceBuilder> {
    builder
        .with_builtins()?
        .register(time::operation())?
        .register(cpu::operation())?
        .register(say::operation(config.say_program.clone()))?
        .register(sleep::operation(config.max_sleep_secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;
    use remotecmd::Service;

    fn config() -> ServerConfig {
        ServerConfig {
            server_addr: "localhost:0".into(),
            say_program: "cat".into(),
            max_sleep_secs: 60,
            shutdown_timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn registers_every_command_sorted() {
        let service = register_all(Service::builder(), &config()).unwrap().build();
        let names: Vec<_> = service
            .registry()
            .operations()
            .iter()
            .map(|op| op.name().to_owned())
            .collect();
        assert_eq!(
            names,
            ["/cpu", "/help", "/say", "/sleep", "/status", "/time"]
        );
    }
}
