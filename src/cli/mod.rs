use crate::http::{HttpChecker, DEFAULT_MAX_REDIRECTS};
use crate::network::{Checker, Protocol, TransportChecker};
use clap::builder::NonEmptyStringValueParser;
use clap::error::ErrorKind as ClapErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "conncheck")]
#[command(about = "Single-shot TCP/UDP port and HTTP(S) connectivity checks")]
#[command(version)]
pub struct Cli {
    #[arg(value_enum, help = "Type of check to run")]
    pub check: CheckType,

    #[arg(short = 'H', long, required = true, value_parser = NonEmptyStringValueParser::new(), help = "Host to check")]
    pub host: String,

    #[arg(short, long, help = "Port to check (required for port checks)")]
    pub port: Option<u16>,

    #[arg(
        short,
        long,
        default_value = "3",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Timeout in seconds"
    )]
    pub timeout: u64,

    #[arg(
        short = 'P',
        long,
        value_enum,
        ignore_case = true,
        default_value = "TCP",
        help = "PORT CHECK ONLY: protocol to check"
    )]
    pub protocol: ProtocolArg,

    #[arg(
        short,
        long,
        default_value = "/",
        help = "HTTP CHECK ONLY: endpoint to check i.e /health"
    )]
    pub endpoint: String,

    #[arg(short = 'S', long, help = "HTTP CHECK ONLY: use HTTPS instead of HTTP")]
    pub ssl: bool,

    #[arg(
        long,
        default_value_t = DEFAULT_MAX_REDIRECTS,
        help = "HTTP CHECK ONLY: redirect hops to follow (0 disables)"
    )]
    pub max_redirects: usize,

    #[arg(long, help = "HTTP CHECK ONLY: ignore proxy environment variables")]
    pub no_proxy: bool,

    #[arg(short, long, help = "Print debug information")]
    pub verbose: bool,

    #[arg(long, help = "Print the result as JSON")]
    pub json: bool,

    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CheckType {
    Http,
    Port,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProtocolArg {
    #[value(name = "TCP")]
    Tcp,
    #[value(name = "UDP")]
    Udp,
}

impl ProtocolArg {
    pub fn to_protocol(self) -> Protocol {
        match self {
            ProtocolArg::Tcp => Protocol::Tcp,
            ProtocolArg::Udp => Protocol::Udp,
        }
    }
}

impl Cli {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Builds the checker selected by `check`.
    ///
    /// Fails with a usage error when a port check has no `--port`.
    pub fn build_checker(&self) -> Result<Box<dyn Checker>, clap::Error> {
        match self.check {
            CheckType::Port => {
                let port = self.port.ok_or_else(|| {
                    Cli::command().error(
                        ClapErrorKind::MissingRequiredArgument,
                        "the port check requires --port <PORT>",
                    )
                })?;
                Ok(Box::new(
                    TransportChecker::new(self.host.clone(), port, self.protocol.to_protocol())
                        .with_timeout(self.timeout()),
                ))
            }
            CheckType::Http => Ok(Box::new(
                HttpChecker::new(self.host.clone(), self.endpoint.clone(), self.port, self.ssl)
                    .with_timeout(self.timeout())
                    .with_max_redirects(self.max_redirects)
                    .with_env_proxy(!self.no_proxy),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Target;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["conncheck", "http", "-H", "example.com"]).unwrap();
        assert_eq!(cli.check, CheckType::Http);
        assert_eq!(cli.timeout, 3);
        assert_eq!(cli.protocol, ProtocolArg::Tcp);
        assert_eq!(cli.endpoint, "/");
        assert_eq!(cli.max_redirects, DEFAULT_MAX_REDIRECTS);
        assert!(cli.port.is_none());
        assert!(!cli.ssl);
        assert!(!cli.verbose);
        assert!(!cli.json);
    }

    #[test]
    fn test_http_checker_from_args() {
        let cli = Cli::try_parse_from([
            "conncheck", "http", "-H", "example.com", "-p", "8080", "-S", "-e", "/health",
        ])
        .unwrap();
        let checker = cli.build_checker().unwrap();
        assert_eq!(
            checker.target(),
            Target::Http {
                url: "https://example.com:8080/health".to_string()
            }
        );
    }

    #[test]
    fn test_port_checker_from_args() {
        let cli = Cli::try_parse_from([
            "conncheck", "port", "--host", "db.local", "--port", "5432", "-P", "udp", "-t", "1",
        ])
        .unwrap();
        assert_eq!(cli.timeout(), Duration::from_secs(1));
        let checker = cli.build_checker().unwrap();
        assert_eq!(
            checker.target(),
            Target::Transport {
                protocol: Protocol::Udp,
                host: "db.local".to_string(),
                port: 5432
            }
        );
    }

    #[test]
    fn test_port_check_requires_port() {
        let cli = Cli::try_parse_from(["conncheck", "port", "-H", "db.local"]).unwrap();
        let err = cli.build_checker().err().unwrap();
        assert_eq!(err.kind(), ClapErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(Cli::try_parse_from(["conncheck", "ping", "-H", "x"]).is_err());
        assert!(Cli::try_parse_from(["conncheck", "port", "-H", "x", "-P", "SCTP"]).is_err());
        assert!(Cli::try_parse_from(["conncheck", "port", "-H", "x", "-p", "70000"]).is_err());
        assert!(Cli::try_parse_from(["conncheck", "port", "-H", "x", "-t", "0"]).is_err());
        assert!(Cli::try_parse_from(["conncheck", "port", "-H", ""]).is_err());
        assert!(Cli::try_parse_from(["conncheck", "http"]).is_err());
    }
}
