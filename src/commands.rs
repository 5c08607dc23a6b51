// CLI command dispatch
// Maps subcommands onto client operations and persists session changes

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::auth::Token;
use crate::client::{Authed, BitwireClient, Mode};
use crate::config::{confirm_overwrite, run_interactive_setup, Command, Config};
use crate::error::BitwireError;
use crate::models::CreateTransfer;
use crate::output::{self, OutputFormat, TextRender};
use crate::profile::Profile;

/// Exit code for failed operations
pub const EXIT_FAILURE: u8 = 1;

/// Exit code for output rendering failures
pub const EXIT_OUTPUT: u8 = 10;

/// Output could not be rendered
#[derive(Debug, thiserror::Error)]
#[error("Failed to render output: {0}")]
pub struct OutputError(#[from] serde_json::Error);

/// Run one CLI command
pub async fn run(config: &Config, command: &Command) -> Result<()> {
    tracing::debug!("Running `{}` in {} mode", command.name(), config.mode);

    match command {
        Command::Config => configure(config),
        Command::Login => login(config).await,
        Command::Refresh => refresh(config).await,
        Command::Rates { fx, btc } => {
            let client = public_client(config)?;
            if *fx {
                print_out(&client.get_fx_rates().await?, config.format)
            } else if *btc {
                print_out(&client.get_btc_rates().await?, config.format)
            } else {
                print_out(&client.get_all_rates().await?, config.format)
            }
        }
        Command::Banks => {
            let client = public_client(config)?;
            print_out(&client.get_banks().await?, config.format)
        }
        Command::Recipients => {
            let mut session = Session::open(config).await?;
            let result = session.client.get_recipients().await;
            let value = session.finish(result).await?;
            print_out(&value, config.format)
        }
        Command::Transfers => {
            let mut session = Session::open(config).await?;
            let result = session.client.get_transfers().await;
            let value = session.finish(result).await?;
            print_out(&value, config.format)
        }
        Command::Transfer { id } => {
            let mut session = Session::open(config).await?;
            let result = session.client.get_transfer(id).await;
            let value = session.finish(result).await?;
            print_out(&value, config.format)
        }
        Command::Send {
            amount,
            currency,
            recipient,
            kind,
            memo,
        } => {
            let payload = CreateTransfer {
                amount: amount.clone(),
                currency: currency.clone(),
                recipient_id: *recipient,
                memo: memo.clone(),
                kind: kind.clone(),
            };
            let mut session = Session::open(config).await?;
            let result = session.client.create_transfer(&payload).await;
            let value = session.finish(result).await?;
            print_out(&value, config.format)
        }
        Command::Cancel { id } => {
            let mut session = Session::open(config).await?;
            let result = session.client.cancel_transfer(id).await;
            let value = session.finish(result).await?;
            print_out(&value, config.format)
        }
        Command::Limits => {
            let mut session = Session::open(config).await?;
            let result = session.client.get_limits().await;
            let value = session.finish(result).await?;
            print_out(&value, config.format)
        }
    }
}

fn public_client(config: &Config) -> Result<BitwireClient> {
    Ok(BitwireClient::with_options(
        config.mode,
        config.client_options(),
    )?)
}

fn load_profile(config: &Config) -> Result<Profile> {
    let path = config.profile_path();
    Profile::load(&path).with_context(|| {
        format!(
            "No usable {} configuration; run `bitwire{} config` first",
            config.mode,
            if config.mode == Mode::Sandbox {
                " --sandbox"
            } else {
                ""
            }
        )
    })
}

/// Authenticated client bound to the stored profile
struct Session {
    client: BitwireClient,
    profile: Profile,
    path: PathBuf,
}

impl Session {
    /// Resume the stored session, or log in with the stored password
    async fn open(config: &Config) -> Result<Self> {
        let path = config.profile_path();
        let mut profile = load_profile(config)?;
        let client = public_client(config)?;

        let client = if let Some((token, credentials)) = profile.session() {
            tracing::debug!("Resuming stored session");
            client.restore(token, Some(credentials))
        } else if let Some(login) = profile.login_credentials() {
            tracing::debug!("No stored session, logging in");
            let token = client.authenticate(&login).await?;
            profile.update_session(token, &login.refresh_credentials());
            profile.save(&path)?;
            client
        } else {
            anyhow::bail!(
                "API authorization error: no stored session or login in {}",
                path.display()
            );
        };

        Ok(Self {
            client,
            profile,
            path,
        })
    }

    /// Persist a refreshed token, then unwrap the result
    async fn finish<T>(&mut self, result: crate::error::Result<Authed<T>>) -> Result<T> {
        match result {
            Ok(authed) => {
                if let Some(token) = authed.refreshed.clone() {
                    self.store_token(token)?;
                }
                Ok(authed.into_inner())
            }
            Err(e) => {
                // A refresh may have succeeded before the call itself failed
                if let Some(token) = self.client.token().await {
                    if self.profile.token.as_ref() != Some(&token) {
                        if let Err(save_err) = self.store_token(token) {
                            tracing::warn!("Failed to store refreshed token: {:#}", save_err);
                        }
                    }
                }
                Err(e.into())
            }
        }
    }

    fn store_token(&mut self, token: Token) -> Result<()> {
        self.profile.update_token(token);
        self.profile.save(&self.path)?;
        tracing::info!("Stored refreshed token in {}", self.path.display());
        Ok(())
    }
}

fn configure(config: &Config) -> Result<()> {
    let path = config.profile_path();
    let existing = if path.exists() {
        Profile::load(&path).ok()
    } else {
        None
    };

    if existing.is_none() && path.exists() && !confirm_overwrite(&path)? {
        println!("Configuration unchanged");
        return Ok(());
    }

    let profile = run_interactive_setup(config.mode, existing.as_ref())?;
    profile.save(&path)?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

async fn login(config: &Config) -> Result<()> {
    let path = config.profile_path();
    let mut profile = load_profile(config)?;
    let login = profile
        .login_credentials()
        .context("No username/password stored; run `bitwire config` first")?;

    let client = public_client(config)?;
    let token = client.authenticate(&login).await?;
    profile.update_session(token.clone(), &login.refresh_credentials());
    profile.save(&path)?;

    print_out(&token, config.format)
}

async fn refresh(config: &Config) -> Result<()> {
    let path = config.profile_path();
    let mut profile = load_profile(config)?;
    let (token, credentials) = profile
        .session()
        .context("No stored session to refresh; run `bitwire login` first")?;

    let client = public_client(config)?.restore(token, Some(credentials));
    let token = client.refresh_token().await?;
    profile.update_token(token.clone());
    profile.save(&path)?;

    print_out(&token, config.format)
}

fn print_out<T: Serialize + TextRender + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    let rendered = output::render(value, format).map_err(OutputError::from)?;
    println!("{}", rendered.trim_end());
    Ok(())
}

/// Exit code for a failed command
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<OutputError>().is_some() {
        EXIT_OUTPUT
    } else {
        EXIT_FAILURE
    }
}

/// User-facing message for a failed command
pub fn user_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<BitwireError>() {
        Some(e) if e.is_auth_error() => format!(
            "{}\nThe access token has expired or could not be refreshed. \
             Run `bitwire login` to authenticate again.",
            e
        ),
        _ => format!("{:#}", err),
    }
}
