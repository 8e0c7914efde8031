//! Init data CLI commands
//!
//! Provides the operator interface: verify, check-string, sign

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use initguard_core::auth::check_string::build_check_string;
use initguard_core::auth::{
    AuthError, ErrorKind, InitDataSigner, InitDataVerifier, InitPayload, SharedSecret,
    VerifierConfig,
};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

/// Exit code for a payload that parsed but is not trusted
pub const EXIT_UNTRUSTED: i32 = 1;

/// Exit code for a payload that could not be parsed
pub const EXIT_MALFORMED: i32 = 2;

/// Exit code for a missing token or unusable configuration
pub const EXIT_CONFIG: i32 = 3;

#[derive(Parser, Debug)]
pub enum AuthCommand {
    /// Verify init data against the configured bot token
    Verify {
        /// Raw initData string (read from stdin when omitted)
        #[clap(long)]
        init_data: Option<String>,

        /// Override the freshness window in seconds
        #[clap(long)]
        max_age: Option<u64>,

        /// Verify as of this Unix time instead of the wall clock
        #[clap(long)]
        now: Option<i64>,

        /// Print the verdict as JSON
        #[clap(long)]
        json: bool,
    },

    /// Print the data-check-string the host would have signed
    CheckString {
        /// Raw initData string (read from stdin when omitted)
        #[clap(long)]
        init_data: Option<String>,
    },

    /// Produce a signed initData string (for fixtures and local testing)
    Sign {
        /// Field to include, as name=value (repeatable)
        #[clap(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,

        /// auth_date to embed (defaults to now)
        #[clap(long)]
        auth_date: Option<i64>,
    },
}

impl AuthCommand {
    /// Execute the command, returning the process exit code
    ///
    /// Configuration faults get their own exit code so they are never
    /// mistaken for an untrusted verdict.
    pub async fn execute(&self, config_path: Option<&Path>) -> Result<i32> {
        match self.run(config_path).await {
            Ok(code) => Ok(code),
            Err(e) => match exit_code_for(&e) {
                Some(code) => {
                    eprintln!("❌ {e:#}");
                    Ok(code)
                }
                None => Err(e),
            },
        }
    }

    async fn run(&self, config_path: Option<&Path>) -> Result<i32> {
        match self {
            AuthCommand::Verify {
                init_data,
                max_age,
                now,
                json,
            } => {
                let raw = read_init_data(init_data.as_deref()).await?;
                verify(config_path, &raw, *max_age, *now, *json)
            }
            AuthCommand::CheckString { init_data } => {
                let raw = read_init_data(init_data.as_deref()).await?;
                check_string(&raw)
            }
            AuthCommand::Sign { fields, auth_date } => sign(config_path, fields, *auth_date),
        }
    }
}

/// Map an error carrying an [`AuthError`] onto its exit code
pub fn exit_code_for(err: &anyhow::Error) -> Option<i32> {
    let auth_error = err.chain().find_map(|cause| cause.downcast_ref::<AuthError>())?;
    Some(match auth_error.kind() {
        ErrorKind::Configuration => EXIT_CONFIG,
        ErrorKind::MalformedPayload => EXIT_MALFORMED,
    })
}

fn load_config(config_path: Option<&Path>, max_age: Option<u64>) -> Result<VerifierConfig> {
    let mut config = VerifierConfig::load_or_default(config_path)
        .inspect_err(|e| e.log_if_security_critical())
        .context("Failed to load verifier configuration")?;

    if let Some(max_age) = max_age {
        config.max_age_seconds = max_age;
        config.validate()?;
    }
    Ok(config)
}

fn verify(
    config_path: Option<&Path>,
    raw: &str,
    max_age: Option<u64>,
    now: Option<i64>,
    json: bool,
) -> Result<i32> {
    let config = load_config(config_path, max_age)?;
    // Configuration faults abort here, before any payload is looked at
    let verifier = InitDataVerifier::from_config(&config)?;
    debug!(bytes = raw.len(), ?now, "Verifying init data");

    let outcome = match now {
        Some(now) => verifier.verify_at(raw, now),
        None => verifier.verify(raw),
    };

    let result = match outcome {
        Ok(result) => result,
        Err(e) if e.is_malformed_payload() => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "authentic": false,
                        "fresh": false,
                        "reason": e.to_string(),
                    })
                );
            } else {
                println!("❌ Malformed init data");
                println!("   {e}");
            }
            return Ok(EXIT_MALFORMED);
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string(&result)?);
    } else if result.is_trusted() {
        println!("✅ Init data is authentic and fresh");
    } else {
        println!("❌ Init data is not trusted");
        println!("   authentic: {}", result.authentic);
        println!("   fresh:     {}", result.fresh);
        if let Some(reason) = &result.reason {
            println!("   reason:    {reason}");
        }
    }

    Ok(if result.is_trusted() { 0 } else { EXIT_UNTRUSTED })
}

fn check_string(raw: &str) -> Result<i32> {
    let payload = InitPayload::parse(raw).context("Failed to parse init data")?;
    println!("{}", build_check_string(&payload));
    Ok(0)
}

fn sign(
    config_path: Option<&Path>,
    fields: &[(String, String)],
    auth_date: Option<i64>,
) -> Result<i32> {
    let config = load_config(config_path, None)?;
    let secret = SharedSecret::from_env(&config.bot_token_env)?;
    let signer = InitDataSigner::new(&secret, config.key_derivation);

    let auth_date = auth_date.unwrap_or_else(|| chrono::Utc::now().timestamp());
    info!(fields = fields.len(), auth_date, "Signing init data");
    println!("{}", signer.sign(fields, auth_date)?);
    Ok(0)
}

async fn read_init_data(flag: Option<&str>) -> Result<String> {
    if let Some(raw) = flag {
        return Ok(raw.trim().to_string());
    }

    let mut buffer = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buffer)
        .await
        .context("Failed to read init data from stdin")?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("No init data given; pass --init-data or pipe it on stdin"));
    }
    Ok(trimmed.to_string())
}

/// Parse a `name=value` argument
pub fn parse_field(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, _)) if name.is_empty() => Err(format!("Field has an empty name: {arg}")),
        Some((name, value)) => Ok((name.to_string(), value.to_string())),
        None => Err(format!("Expected name=value, got: {arg}")),
    }
}
