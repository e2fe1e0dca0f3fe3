use crate::config::AppConfig;
use crate::domain::model::Domain;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "math-solver")]
#[command(about = "Step-by-step math problem solver backed by hosted language models")]
pub struct CliConfig {
    /// TOML configuration file; values support ${ENV_VAR} substitution
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },

    /// Solve one problem and print the solution
    Solve {
        /// Problem text
        #[arg(long, conflicts_with = "image", required_unless_present = "image")]
        text: Option<String>,

        /// Path to a photo of the problem
        #[arg(long)]
        image: Option<PathBuf>,

        #[arg(long)]
        domain: Option<Domain>,
    },

    /// Print practice problems similar to the given one
    Similar {
        #[arg(long)]
        text: String,

        #[arg(long)]
        domain: Option<Domain>,

        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        count: Option<u8>,
    },

    /// Print the problem text read from an image
    Extract {
        #[arg(long)]
        image: PathBuf,
    },

    /// Print which domain the classifier picks for a text
    Classify {
        #[arg(long)]
        text: String,
    },
}

impl CliConfig {
    /// Defaults, then the config file, then command-line overrides.
    pub fn load_app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                AppConfig::from_file(path)?
            }
            None => AppConfig::default(),
        };

        if let Some(Command::Serve { host, port }) = &self.command {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
        }

        Ok(config)
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve {
            host: None,
            port: None,
        })
    }
}
