use clap::Parser;

/// Wordlens: WebSocket language server that flags vocabulary words and pushes
/// replacement edits to connected editors
#[derive(Parser, Debug, Clone)]
#[command(name = "wordlens")]
#[command(version)]
#[command(about = "WebSocket language server for vocabulary-aware editors", long_about = None)]
pub struct Cli {
    /// Host to bind the WebSocket listener on
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 4000)]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Append logs to this file in addition to stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<std::path::PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["wordlens"]);
        assert_eq!(cli.host, "127.0.0.1");
        assert_eq!(cli.port, 4000);
        assert_eq!(cli.log_level, "info");
        assert!(cli.log_file.is_none());
        assert_eq!(cli.bind_addr(), "127.0.0.1:4000");
    }

    #[test]
    fn test_port_flag() {
        let cli = Cli::parse_from(["wordlens", "--port", "9001"]);
        assert_eq!(cli.port, 9001);
    }

    #[test]
    fn test_log_file_flag() {
        let cli = Cli::parse_from(["wordlens", "--log-file", "/tmp/wordlens.log"]);
        assert_eq!(
            cli.log_file,
            Some(std::path::PathBuf::from("/tmp/wordlens.log"))
        );
    }
}
