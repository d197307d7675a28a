//! Industry Knowledge Folder Command Line Interface
//!
//! Deploys the knowledge token and registry, uploads files for review, and
//! drives the moderation workflow against a local JSON state file.

mod config;
mod state;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::CliConfig;
use ikf_registry::{FileRevision, FileSubmission};
use ikf_token::RewardIssuer;
use ikf_types::{whole_tokens, Address, ContentHash, FileStatus, TokenAmount, ATOMIC_PER_TOKEN};
use serde_json::json;
use state::Deployment;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_TOKEN_LABEL: &str = "knowledge-token";
const DEFAULT_REGISTRY_LABEL: &str = "knowledge-folder";

#[derive(Parser)]
#[command(name = "ikf")]
#[command(about = "Industry Knowledge Folder command line interface", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./ikf.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// State file, overriding the configured `state_path`
    #[arg(long, global = true, value_name = "PATH")]
    state: Option<PathBuf>,

    /// Log level, overriding the configured `log_level`
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Caller identity: a 64-hex-char address or a label
    #[arg(long = "as", global = true, default_value = "deployer")]
    caller: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the token and the registry, and authorize the registry to mint
    Init {
        /// Administrator and token owner (defaults to the caller)
        #[arg(long)]
        admin: Option<String>,
        /// Initial token supply in whole tokens, credited to the admin
        #[arg(long, default_value_t = 1_000_000)]
        supply: u64,
        /// Token identity (address or label)
        #[arg(long, default_value = DEFAULT_TOKEN_LABEL)]
        token: String,
        /// Registry identity (address or label)
        #[arg(long, default_value = DEFAULT_REGISTRY_LABEL)]
        registry: String,
        /// Overwrite an existing state file
        #[arg(long)]
        force: bool,
    },
    /// Submit a file, or revise it if the name is already registered
    Upload {
        /// File to fingerprint
        path: PathBuf,
        /// Registered filename (defaults to the path as given)
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: String,
        /// Metadata payload; a JSON description is generated when omitted
        #[arg(long)]
        metadata: Option<String>,
        /// Description used in generated metadata
        #[arg(long)]
        description: Option<String>,
        /// Approve a fresh upload with this reward (whole tokens); caller must be admin
        #[arg(long, value_name = "TOKENS")]
        approve: Option<u64>,
    },
    /// Approve a pending file and reward its owner (admin)
    Approve {
        filename: String,
        /// Reward in whole tokens
        #[arg(long)]
        reward: u64,
    },
    /// Reject a pending file (admin)
    Reject {
        filename: String,
        #[arg(long)]
        reason: String,
    },
    /// Show a file record
    Show { filename: String },
    /// List filenames by category, owner or status
    List {
        #[arg(long, conflicts_with_all = ["owner", "status"])]
        category: Option<String>,
        #[arg(long, conflicts_with = "status")]
        owner: Option<String>,
        /// pending, approved or rejected
        #[arg(long)]
        status: Option<FileStatus>,
    },
    /// Registry counters
    Stats,
    /// Reward token balance
    Balance { account: String },
    /// Registry events
    Events {
        #[arg(long, default_value_t = 0)]
        since: u64,
    },
    /// Transfer the administrator role (admin)
    ChangeAdmin { new_admin: String },
    /// Deploy an additional token owned by the caller
    DeployToken {
        token: String,
        #[arg(long, default_value_t = 0)]
        supply: u64,
    },
    /// Authorize a minter on a token (token owner)
    AddMinter {
        #[arg(long)]
        token: String,
        minter: String,
    },
    /// Bind the registry to another deployed token (admin)
    SetIssuer { token: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(state) = &cli.state {
        config.state_path = state.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    init_logging(&config);

    let caller = parse_identity(&cli.caller)?;
    run(cli.command, &caller, &config)
}

fn init_logging(config: &CliConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "compact" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}

fn run(command: Commands, caller: &Address, config: &CliConfig) -> Result<()> {
    let path = config.state_path.as_path();

    if let Commands::Init {
        admin,
        supply,
        token,
        registry,
        force,
    } = &command
    {
        if path.exists() && !force {
            bail!(
                "state file {} already exists (use --force to overwrite)",
                path.display()
            );
        }
        let admin = match admin {
            Some(admin) => parse_identity(admin)?,
            None => *caller,
        };
        let deployment = Deployment::init(
            admin,
            parse_identity(token)?,
            parse_identity(registry)?,
            whole_tokens(*supply),
            config.limits(),
        )?;
        deployment.save(path)?;
        info!("Deployed registry {}", deployment.registry.address());
        print_json(&json!({
            "admin": admin,
            "token": deployment.registry.reward_issuer(),
            "registry": deployment.registry.address(),
            "initial_supply": format_tokens(whole_tokens(*supply)),
        }))?;
        return Ok(());
    }

    let mutates = command.mutates_state();
    let mut deployment = Deployment::load(path)?;
    let outcome = execute(command, caller, &mut deployment);
    // Failed registry operations leave state untouched, so saving is always safe
    // and keeps the effects of an upload whose follow-up approval failed.
    if mutates {
        deployment.save(path)?;
    }
    outcome
}

impl Commands {
    fn mutates_state(&self) -> bool {
        !matches!(
            self,
            Commands::Show { .. }
                | Commands::List { .. }
                | Commands::Stats
                | Commands::Balance { .. }
                | Commands::Events { .. }
        )
    }
}

fn execute(command: Commands, caller: &Address, deployment: &mut Deployment) -> Result<()> {
    let registry = &deployment.registry;

    match command {
        Commands::Init { .. } => bail!("state is already initialized"),
        Commands::Upload {
            path,
            name,
            category,
            metadata,
            description,
            approve,
        } => {
            let content =
                fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
            let filename = name.unwrap_or_else(|| path.to_string_lossy().into_owned());
            let content_hash = ContentHash::of(&content);
            let size = content.len() as u64;
            let metadata =
                metadata.unwrap_or_else(|| generated_metadata(&path, description.as_deref()));

            if registry.exists(&filename) {
                if approve.is_some() {
                    bail!("{filename} is already registered; approve it with `ikf approve`");
                }
                let existing = registry.file(&filename)?;
                if existing.category != category {
                    warn!(
                        "{} stays under {}; category is fixed at creation",
                        filename, existing.category
                    );
                }
                registry.update(
                    caller,
                    FileRevision {
                        filename: filename.clone(),
                        content_hash,
                        size,
                        metadata,
                    },
                )?;
                println!("Updated {filename} ({size} bytes, {content_hash})");
            } else {
                registry.create(
                    caller,
                    FileSubmission {
                        filename: filename.clone(),
                        content_hash,
                        size,
                        category,
                        metadata,
                    },
                )?;
                println!("Uploaded {filename} ({size} bytes, {content_hash})");

                if let Some(reward) = approve {
                    registry.approve(caller, &filename, whole_tokens(reward))?;
                    println!("Approved {filename}, rewarded {reward} tokens");
                }
            }
        }
        Commands::Approve { filename, reward } => {
            registry.approve(caller, &filename, whole_tokens(reward))?;
            println!("Approved {filename}, rewarded {reward} tokens");
        }
        Commands::Reject { filename, reason } => {
            registry.reject(caller, &filename, &reason)?;
            println!("Rejected {filename}: {reason}");
        }
        Commands::Show { filename } => {
            let record = registry.file(&filename)?;
            print_json(&record)?;
        }
        Commands::List {
            category,
            owner,
            status,
        } => {
            let names = match (category, owner, status) {
                (Some(category), _, _) => registry.list_by_category(&category),
                (_, Some(owner), _) => registry.list_by_owner(&parse_identity(&owner)?),
                (_, _, Some(status)) => registry.list_by_status(status),
                (None, None, None) => FileStatus::ALL
                    .iter()
                    .flat_map(|status| registry.list_by_status(*status))
                    .collect(),
            };
            print_json(&names)?;
        }
        Commands::Stats => {
            let stats = registry.stats();
            let token = deployment.bound_token()?;
            print_json(&json!({
                "admin": registry.admin(),
                "reward_issuer": registry.reward_issuer(),
                "total_files": stats.total_files,
                "total_pending_files": stats.total_pending_files,
                "total_approved_files": stats.total_approved_files,
                "total_rejected_files": stats.total_rejected_files,
                "total_tokens_rewarded": format_tokens(stats.total_tokens_rewarded),
                "token_supply": format_tokens(token.total_supply()),
                "categories": registry.categories(),
            }))?;
        }
        Commands::Balance { account } => {
            let account = parse_identity(&account)?;
            let balance = registry.balance_of(&account);
            print_json(&json!({
                "account": account,
                "token": registry.reward_issuer(),
                "balance": format_tokens(balance),
                "atomic": balance.to_string(),
            }))?;
        }
        Commands::Events { since } => {
            print_json(&registry.events_since(since))?;
        }
        Commands::ChangeAdmin { new_admin } => {
            let new_admin = parse_identity(&new_admin)?;
            registry.change_admin(caller, new_admin)?;
            println!("Admin changed to {new_admin}");
        }
        Commands::DeployToken { token, supply } => {
            let address = parse_identity(&token)?;
            deployment.deploy_token(*caller, address, whole_tokens(supply))?;
            println!("Deployed token {address} owned by {caller}");
        }
        Commands::AddMinter { token, minter } => {
            let token = deployment.token(&parse_identity(&token)?)?;
            let minter = parse_identity(&minter)?;
            token.add_minter(caller, minter)?;
            println!("Authorized {minter} to mint on {}", token.address());
        }
        Commands::SetIssuer { token } => {
            let token = deployment.token(&parse_identity(&token)?)?;
            registry.set_reward_issuer(caller, token.clone())?;
            println!("Registry now rewards through {}", token.address());
        }
    }

    Ok(())
}

/// A 64-hex-char address (optionally `0x`-prefixed) or a label hashed into one.
///
/// Anything that looks like hex must be a well-formed address, so a mistyped
/// address fails instead of naming a fresh identity.
fn parse_identity(value: &str) -> Result<Address> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("identity cannot be empty");
    }
    let prefixed = trimmed.starts_with("0x") || trimmed.starts_with("0X");
    if prefixed || trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        return Address::from_hex(trimmed)
            .with_context(|| format!("{trimmed} is not a valid address"));
    }
    Ok(Address::from_label(trimmed))
}

fn generated_metadata(path: &Path, description: Option<&str>) -> String {
    let format = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default();
    let description = description.map(str::to_string).unwrap_or_else(|| {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    json!({
        "description": description,
        "format": format,
        "lastUpdated": chrono::Utc::now().to_rfc3339(),
    })
    .to_string()
}

/// Render atomic units as a decimal token amount, e.g. `12.5`.
fn format_tokens(amount: TokenAmount) -> String {
    let whole = amount / ATOMIC_PER_TOKEN;
    let frac = amount % ATOMIC_PER_TOKEN;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{frac:018}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
