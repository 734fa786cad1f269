//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use pcard_core::{config, logging};
use tracing::info;

mod commands;

#[derive(Parser)]
#[command(name = "pcard")]
#[command(version)]
#[command(about = "Google profile card with browser login")]
#[command(
    after_help = "Environment: PCARD_HOME, PCARD_CLIENT_ID, PCARD_REDIRECT_URI, PCARD_NO_BROWSER, PCARD_LOG"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    oauth: OAuthArgs,
}

/// OAuth overrides shared by every command.
#[derive(clap::Args, Debug, Clone, Default)]
struct OAuthArgs {
    /// OAuth client id (overrides PCARD_CLIENT_ID and the config file)
    #[arg(long, global = true, value_name = "ID")]
    client_id: Option<String>,

    /// Redirect URI sent to the provider and listened on for the callback
    #[arg(long, global = true, value_name = "URI")]
    redirect_uri: Option<String>,

    /// Omit redirect_uri from the authorization request
    #[arg(long, global = true, conflicts_with = "redirect_uri")]
    no_redirect_uri: bool,
}

impl OAuthArgs {
    fn apply(&self, config: &mut config::Config) {
        if let Some(client_id) = self.client_id.as_deref().map(str::trim) {
            config.oauth.client_id = client_id.to_string();
        }
        if self.no_redirect_uri {
            config.oauth.redirect_uri.clear();
        } else if let Some(redirect_uri) = self.redirect_uri.as_deref() {
            config.oauth.redirect_uri = redirect_uri.trim().to_string();
        }
    }
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in with Google in the browser and print the profile card
    Login,

    /// Fetch and print the profile for an existing access token
    Profile {
        /// Access token to use
        #[arg(long, env = "PCARD_ACCESS_TOKEN", hide_env_values = true)]
        token: String,

        /// Print the raw profile as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Print the effective configuration (file, environment and flags merged)
    Show,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = match logging::init() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: file logging disabled: {e:#}");
            None
        }
    };

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

/// Loads the config file and layers environment and flag overrides on top.
fn effective_config(oauth: &OAuthArgs) -> Result<config::Config> {
    let mut config = config::Config::load().context("load config")?;
    config.apply_env_overrides();
    oauth.apply(&mut config);
    Ok(config)
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli { command, oauth } = cli;

    // These must work even when the config file is broken.
    if let Some(Commands::Config { command }) = &command {
        match command {
            ConfigCommands::Path => {
                commands::config::path();
                return Ok(());
            }
            ConfigCommands::Init => return commands::config::init(),
            ConfigCommands::Show => {}
        }
    }

    let config = effective_config(&oauth)?;

    // default to the interactive profile screen
    let Some(command) = command else {
        info!("no command given, opening profile screen");
        return crate::modes::run_profile_screen(config.oauth);
    };

    match command {
        Commands::Login => commands::auth::login(&config.oauth).await,
        Commands::Profile { token, json } => {
            commands::profile::show(&config.oauth, &token, json).await
        }
        Commands::Config { .. } => commands::config::show(&config),
    }
}
