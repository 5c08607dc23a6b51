use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input, Password};
use std::path::PathBuf;
use std::time::Duration;

use crate::client::{ClientOptions, Mode};
use crate::output::OutputFormat;
use crate::profile::{self, Profile};

/// Bitwire command line interface
#[derive(Parser, Debug)]
#[command(name = "bitwire", author, version, about, long_about = None, arg_required_else_help = true)]
pub struct CliArgs {
    /// Run against the sandbox API
    #[arg(short, long, global = true)]
    pub sandbox: bool,

    /// Output format
    #[arg(short, long, env = "BITWIRE_FORMAT", value_enum, default_value = "json", global = true)]
    pub format: OutputFormat,

    /// Directory holding production.json / sandbox.json
    #[arg(long, env = "BITWIRE_CONFIG_DIR", global = true)]
    pub config_dir: Option<String>,

    /// Override the API base URL
    #[arg(long, env = "BITWIRE_BASE_URL", hide = true, global = true)]
    pub base_url: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "BITWIRE_HTTP_TIMEOUT", default_value = "30", global = true)]
    pub http_timeout: u64,

    /// HTTP connect timeout in seconds
    #[arg(long, env = "BITWIRE_CONNECT_TIMEOUT", default_value = "10", global = true)]
    pub connect_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Configure Bitwire API access
    Config,

    /// Log in with the stored username and password
    Login,

    /// Refresh the stored access token
    Refresh,

    /// List current rates
    Rates {
        /// Only foreign exchange rates
        #[arg(long, conflicts_with = "btc")]
        fx: bool,

        /// Only bitcoin rates
        #[arg(long)]
        btc: bool,
    },

    /// List banks
    Banks,

    /// List recipients
    Recipients,

    /// List transfers
    Transfers,

    /// Show a single transfer
    Transfer {
        /// Transfer ID
        id: String,
    },

    /// Create a transfer
    Send {
        /// Amount to send
        #[arg(long)]
        amount: String,

        /// Currency of the amount
        #[arg(long)]
        currency: String,

        /// Recipient ID (see `bitwire recipients`)
        #[arg(long)]
        recipient: i64,

        /// Transfer type
        #[arg(long = "type")]
        kind: String,

        /// Memo shown to the recipient
        #[arg(long, default_value = "")]
        memo: String,
    },

    /// Cancel a pending transfer
    Cancel {
        /// Transfer ID
        id: String,
    },

    /// Show account limits
    Limits,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Config => "config",
            Command::Login => "login",
            Command::Refresh => "refresh",
            Command::Rates { .. } => "rates",
            Command::Banks => "banks",
            Command::Recipients => "recipients",
            Command::Transfers => "transfers",
            Command::Transfer { .. } => "transfer",
            Command::Send { .. } => "send",
            Command::Cancel { .. } => "cancel",
            Command::Limits => "limits",
        }
    }
}

/// Runtime settings resolved from CLI arguments and environment
#[derive(Clone, Debug)]
pub struct Config {
    pub mode: Mode,
    pub format: OutputFormat,
    pub config_dir: PathBuf,
    pub base_url: Option<String>,
    pub http_request_timeout: u64,
    pub http_connect_timeout: u64,
    pub log_level: String,
    pub log_json: bool,
}

impl Config {
    /// Build the configuration with priority: CLI > ENV > defaults
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let config_dir = match &args.config_dir {
            Some(dir) => expand_tilde(dir),
            None => profile::default_config_dir()?,
        };

        Ok(Config {
            mode: if args.sandbox {
                Mode::Sandbox
            } else {
                Mode::Production
            },
            format: args.format,
            config_dir,
            base_url: args.base_url.clone().filter(|u| !u.is_empty()),
            http_request_timeout: args.http_timeout,
            http_connect_timeout: args.connect_timeout,
            log_level: args.log_level.clone(),
            log_json: args.log_json,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.http_request_timeout == 0 {
            anyhow::bail!("BITWIRE_HTTP_TIMEOUT must be greater than zero");
        }
        if self.http_connect_timeout == 0 {
            anyhow::bail!("BITWIRE_CONNECT_TIMEOUT must be greater than zero");
        }
        Ok(())
    }

    pub fn profile_path(&self) -> PathBuf {
        profile::profile_path(&self.config_dir, self.mode)
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.http_connect_timeout),
            request_timeout: Duration::from_secs(self.http_request_timeout),
            ..ClientOptions::default()
        }
    }
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

// === Interactive Setup ===

/// Prompt for API access details, keeping existing values as defaults
pub fn run_interactive_setup(mode: Mode, existing: Option<&Profile>) -> Result<Profile> {
    println!();
    println!("Configuring bitwire in {} mode", mode);
    println!();

    let defaults = existing.cloned().unwrap_or_default();

    let username: String = Input::new()
        .with_prompt("Username")
        .with_initial_text(defaults.username.clone())
        .interact_text()
        .context("Failed to read username")?;

    let password: String = Password::new()
        .with_prompt("Password")
        .allow_empty_password(!defaults.password.is_empty())
        .interact()
        .context("Failed to read password")?;
    let password = if password.is_empty() {
        defaults.password.clone()
    } else {
        password
    };

    let client_id: String = Input::new()
        .with_prompt("Client ID")
        .with_initial_text(defaults.client_id.clone())
        .interact_text()
        .context("Failed to read client ID")?;

    let client_secret: String = Password::new()
        .with_prompt("Client secret")
        .allow_empty_password(!defaults.client_secret.is_empty())
        .interact()
        .context("Failed to read client secret")?;
    let client_secret = if client_secret.is_empty() {
        defaults.client_secret.clone()
    } else {
        client_secret
    };

    if username.is_empty() || password.is_empty() {
        anyhow::bail!("Username and password cannot be empty");
    }
    if client_id.is_empty() || client_secret.is_empty() {
        anyhow::bail!("Client ID and client secret cannot be empty");
    }

    // Changed credentials invalidate any stored session
    let keep_session = defaults.username == username
        && defaults.password == password
        && defaults.client_id == client_id
        && defaults.client_secret == client_secret;

    Ok(Profile {
        username,
        password,
        client_id,
        client_secret,
        grant_type: defaults.grant_type.filter(|_| keep_session),
        token: defaults.token.filter(|_| keep_session),
    })
}

/// Ask before overwriting an existing profile
pub fn confirm_overwrite(path: &std::path::Path) -> Result<bool> {
    Confirm::new()
        .with_prompt(format!("Overwrite {}?", path.display()))
        .default(true)
        .interact()
        .context("Failed to read confirmation")
}
