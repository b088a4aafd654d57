use anyhow::bail;
use clap::Parser;
use core::time::Duration;

/// Speech program used when none is configured.
pub const DEFAULT_SAY_PROGRAM: &str = if cfg!(target_os = "macos") {
    "say"
} else {
    "espeak"
};

/// Runtime configuration for the `remotecmd-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is honored), with defaults suitable for a local deployment.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "remotecmd-server",
    version,
    about = "An HTTP service exposing tracked remote commands"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Example: "localhost:4000" or "0.0.0.0:8080"
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("localhost:4000"))]
    pub server_addr: String,

    /// Program that `/say` pipes its text into.
    ///
    /// The program reads the text on stdin. Defaults to `say` on macOS and
    /// `espeak` elsewhere.
    ///
    /// Environment variable: `SAY_PROGRAM`
    #[arg(long, env = "SAY_PROGRAM", default_value_t = String::from(DEFAULT_SAY_PROGRAM))]
    pub say_program: String,

    /// Upper bound, in seconds, accepted by `/sleep`.
    ///
    /// Requests above the bound are rejected before they are tracked.
    ///
    /// Environment variable: `MAX_SLEEP_SECS`
    #[arg(long, env = "MAX_SLEEP_SECS", default_value_t = 3600)]
    pub max_sleep_secs: u64,

    /// Seconds to wait for running commands to finish on shutdown.
    ///
    /// Commands still running after the timeout are abandoned.
    ///
    /// Environment variable: `SHUTDOWN_TIMEOUT`
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 3)]
    pub shutdown_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub say_program: String,
    pub max_sleep_secs: u64,
    pub shutdown_timeout: Duration,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.server_addr.trim().is_empty() {
            bail!("SERVER_ADDR must not be empty");
        }

        if args.say_program.trim().is_empty() {
            bail!("SAY_PROGRAM must not be empty");
        }

        if args.max_sleep_secs == 0 {
            bail!("MAX_SLEEP_SECS must be greater than 0");
        }

        Ok(Self {
            server_addr: args.server_addr,
            say_program: args.say_program,
            max_sleep_secs: args.max_sleep_secs,
            shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CliArgs {
        CliArgs {
            server_addr: "localhost:4000".into(),
            say_program: DEFAULT_SAY_PROGRAM.into(),
            max_sleep_secs: 3600,
            shutdown_timeout: 3,
        }
    }

    #[test]
    fn accepts_defaults() {
        let config = ServerConfig::try_from(args()).unwrap();
        assert_eq!(config.server_addr, "localhost:4000");
        assert_eq!(config.max_sleep_secs, 3600);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(3));
    }

    #[test]
    fn rejects_empty_address() {
        let err = ServerConfig::try_from(CliArgs {
            server_addr: "  ".into(),
            ..args()
        })
        .unwrap_err();
        assert!(err.to_string().contains("SERVER_ADDR"));
    }

    #[test]
    fn rejects_empty_say_program() {
        let err = ServerConfig::try_from(CliArgs {
            say_program: String::new(),
            ..args()
        })
        .unwrap_err();
        assert!(err.to_string().contains("SAY_PROGRAM"));
    }

    #[test]
    fn rejects_zero_sleep_bound() {
        let err = ServerConfig::try_from(CliArgs {
            max_sleep_secs: 0,
            ..args()
        })
        .unwrap_err();
        assert!(err.to_string().contains("MAX_SLEEP_SECS"));
    }

    #[test]
    fn parses_flags() {
        let args = CliArgs::try_parse_from([
            "remotecmd-server",
            "--server-addr",
            "127.0.0.1:9000",
            "--max-sleep-secs",
            "10",
        ])
        .unwrap();
        assert_eq!(args.server_addr, "127.0.0.1:9000");
        assert_eq!(args.max_sleep_secs, 10);
    }
}
