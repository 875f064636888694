//! Configuration resolution for cdl-api
//!
//! Each setting is resolved with CLI → ENV → TOML → default priority. A
//! setting present in more than one source is logged as a warning so a stale
//! value in a lower tier does not go unnoticed.

use cdl_common::config::{PipelineSettings, TomlConfig};
use cdl_common::{Error, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_EVOLUTION_URL: &str = "https://evolution-victor.namastex.ai";
pub const DEFAULT_EVOLUTION_INSTANCE: &str = "CDLVilaVelha";

pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_KEY: &str = "SUPABASE_KEY";
pub const ENV_EVOLUTION_URL: &str = "EVOLUTION_URL";
pub const ENV_EVOLUTION_INSTANCE: &str = "EVOLUTION_INSTANCE_NAME";
pub const ENV_EVOLUTION_API_KEY: &str = "EVOLUTION_API_KEY";
pub const ENV_PORT: &str = "CDL_PORT";
pub const ENV_BIND_ADDRESS: &str = "CDL_BIND_ADDRESS";

/// Command-line arguments for cdl-api
#[derive(Parser, Debug, Default)]
#[command(name = "cdl-api")]
#[command(about = "CDL campaign service: contact import and bulk WhatsApp dispatch")]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, env = "CDL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    pub bind_address: Option<String>,

    /// Supabase project URL
    #[arg(long)]
    pub supabase_url: Option<String>,

    /// Supabase service key
    #[arg(long)]
    pub supabase_key: Option<String>,

    /// Evolution API base URL
    #[arg(long)]
    pub evolution_url: Option<String>,

    /// Evolution API instance name
    #[arg(long)]
    pub evolution_instance: Option<String>,

    /// Evolution API key
    #[arg(long)]
    pub evolution_api_key: Option<String>,
}

/// Record store endpoint
#[derive(Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
}

/// WhatsApp gateway endpoint
#[derive(Clone)]
pub struct EvolutionConfig {
    pub url: String,
    pub instance: String,
    pub api_key: String,
}

/// Fully resolved service configuration, built once at startup
#[derive(Clone)]
pub struct ServiceConfig {
    pub bind_address: String,
    pub port: u16,
    pub supabase: SupabaseConfig,
    pub evolution: EvolutionConfig,
    pub pipeline: PipelineSettings,
}

impl ServiceConfig {
    /// Merge CLI, environment and TOML settings
    pub fn resolve(cli: &Cli, toml: &TomlConfig) -> Result<Self> {
        let supabase_url = resolve_setting(
            "Supabase URL",
            cli.supabase_url.as_deref(),
            ENV_SUPABASE_URL,
            toml.supabase_url.as_deref(),
        )
        .ok_or_else(|| missing("Supabase URL", "--supabase-url", ENV_SUPABASE_URL, "supabase_url"))?;

        let supabase_key = resolve_setting(
            "Supabase key",
            cli.supabase_key.as_deref(),
            ENV_SUPABASE_KEY,
            toml.supabase_key.as_deref(),
        )
        .ok_or_else(|| missing("Supabase key", "--supabase-key", ENV_SUPABASE_KEY, "supabase_key"))?;

        let evolution_api_key = resolve_setting(
            "Evolution API key",
            cli.evolution_api_key.as_deref(),
            ENV_EVOLUTION_API_KEY,
            toml.evolution_api_key.as_deref(),
        )
        .ok_or_else(|| {
            missing(
                "Evolution API key",
                "--evolution-api-key",
                ENV_EVOLUTION_API_KEY,
                "evolution_api_key",
            )
        })?;

        let evolution_url = resolve_setting(
            "Evolution URL",
            cli.evolution_url.as_deref(),
            ENV_EVOLUTION_URL,
            toml.evolution_url.as_deref(),
        )
        .unwrap_or_else(|| DEFAULT_EVOLUTION_URL.to_string());

        let evolution_instance = resolve_setting(
            "Evolution instance",
            cli.evolution_instance.as_deref(),
            ENV_EVOLUTION_INSTANCE,
            toml.evolution_instance.as_deref(),
        )
        .unwrap_or_else(|| DEFAULT_EVOLUTION_INSTANCE.to_string());

        let bind_address = resolve_setting(
            "Bind address",
            cli.bind_address.as_deref(),
            ENV_BIND_ADDRESS,
            toml.bind_address.as_deref(),
        )
        .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let port = resolve_port(cli.port, toml.port)?;

        info!("Supabase key: {}", key_prefix(&supabase_key));
        info!("Evolution API key: {}", key_prefix(&evolution_api_key));

        Ok(Self {
            bind_address,
            port,
            supabase: SupabaseConfig {
                url: supabase_url,
                key: supabase_key,
            },
            evolution: EvolutionConfig {
                url: evolution_url,
                instance: evolution_instance,
                api_key: evolution_api_key,
            },
            pipeline: toml.pipeline,
        })
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Validate a setting value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve one string setting, warning when several sources provide it
fn resolve_setting(name: &str, cli: Option<&str>, env_var: &str, toml: Option<&str>) -> Option<String> {
    let env = std::env::var(env_var).ok();

    let candidates = [
        ("command line", cli),
        ("environment", env.as_deref()),
        ("TOML", toml),
    ];

    let present: Vec<(&str, &str)> = candidates
        .iter()
        .filter_map(|(source, value)| value.filter(|v| is_valid_key(v)).map(|v| (*source, v)))
        .collect();

    if present.len() > 1 {
        let sources: Vec<&str> = present.iter().map(|(source, _)| *source).collect();
        warn!(
            "{} found in multiple sources: {}. Using {} (highest priority).",
            name,
            sources.join(", "),
            sources[0]
        );
    }

    present.first().map(|(_, value)| value.trim().to_string())
}

fn resolve_port(cli: Option<u16>, toml: Option<u16>) -> Result<u16> {
    if let Some(port) = cli {
        return Ok(port);
    }

    if let Ok(raw) = std::env::var(ENV_PORT) {
        if is_valid_key(&raw) {
            return raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("{} is not a valid port: {}", ENV_PORT, raw)));
        }
    }

    Ok(toml.unwrap_or(DEFAULT_PORT))
}

fn missing(name: &str, flag: &str, env_var: &str, toml_key: &str) -> Error {
    Error::Config(format!(
        "{} not configured. Please configure using one of:\n\
         1. Command line: {} <value>\n\
         2. Environment: {}=<value>\n\
         3. TOML config: ~/.config/cdl/cdl-api.toml ({} = \"<value>\")",
        name, flag, env_var, toml_key
    ))
}

/// First characters of a credential, for logs
fn key_prefix(key: &str) -> String {
    let prefix: String = key.chars().take(6).collect();
    format!("{}...", prefix)
}
