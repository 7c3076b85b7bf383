use clap::{Args, Parser, Subcommand, ValueEnum};
use nkjwt::ClaimKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::encode::IssueOptions;
use commands::validate::Preset;
use config::NkjwtConfig;

#[derive(Parser, Debug)]
#[command(name = "nkjwt", version, about = "Issue, inspect and validate nkey-signed JWTs")]
struct Cli {
    /// Path to nkjwt.yaml (defaults to ./nkjwt.yaml when present)
    #[arg(long, global = true, env = "NKJWT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Key management
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },

    /// Issue a signed token
    Encode {
        #[command(subcommand)]
        cmd: EncodeCommand,
    },

    /// Print a token's claims as JSON without checking the signature
    Decode {
        /// Token, or path to a file containing it
        token: String,
    },

    /// Check a token's signature against its issuer (exit status 1 on failure)
    Verify {
        /// Token, or path to a file containing it
        token: String,
    },

    /// Validate a token, or several tokens as a root-first chain
    Validate {
        /// Tokens (or paths), ordered operator, account, user
        #[arg(required = true)]
        tokens: Vec<String>,

        /// Enable every check with no clock skew
        #[arg(long, conflicts_with = "permissive")]
        strict: bool,

        /// Disable every check
        #[arg(long)]
        permissive: bool,
    },

    /// Write a user token and seed as a .creds file
    Creds {
        /// User token, or path to a file containing it
        #[arg(long)]
        jwt: String,

        /// User seed (SU...), or path to a file containing it
        #[arg(long)]
        seed: Option<String>,

        /// Output file (prints to stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate a new keypair
    Generate {
        /// Kind of key to generate
        #[arg(long, value_enum)]
        kind: KindArg,

        /// Directory to write <kind>.seed and <kind>.pub into
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum EncodeCommand {
    /// Self-signed operator token
    Operator {
        #[command(flatten)]
        issue: IssueArgs,

        /// Additional operator signing key (repeatable)
        #[arg(long = "signing-key")]
        signing_keys: Vec<String>,
    },

    /// Account token signed by an operator seed
    Account {
        /// Account public key (A...)
        #[arg(long)]
        subject: String,

        #[command(flatten)]
        issue: IssueArgs,

        /// Account signing key (repeatable)
        #[arg(long = "signing-key")]
        signing_keys: Vec<String>,
    },

    /// User token signed by an account seed
    User {
        /// User public key (U...)
        #[arg(long)]
        subject: String,

        #[command(flatten)]
        issue: IssueArgs,

        /// Account the user belongs to, when signed by an account signing key
        #[arg(long)]
        issuer_account: Option<String>,
    },
}

#[derive(Args, Debug)]
struct IssueArgs {
    /// Signing seed, or path to a file containing it
    #[arg(long)]
    seed: Option<String>,

    /// Human-readable name
    #[arg(long)]
    name: Option<String>,

    /// Lifetime, e.g. "24h", "7d", "30m"
    #[arg(long, conflicts_with = "expires_at")]
    expires: Option<String>,

    /// Absolute expiry as a unix timestamp
    #[arg(long)]
    expires_at: Option<i64>,

    /// Output file (prints to stdout when omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Operator,
    Account,
    User,
}

impl From<KindArg> for ClaimKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Operator => ClaimKind::Operator,
            KindArg::Account => ClaimKind::Account,
            KindArg::User => ClaimKind::User,
        }
    }
}

impl IssueArgs {
    fn resolve(self, config: &NkjwtConfig) -> anyhow::Result<(String, IssueOptions)> {
        let seed = commands::resolve_seed(self.seed, &config.keys)?;
        let expires = commands::resolve_expiry(self.expires.as_deref(), self.expires_at)?;
        Ok((
            seed,
            IssueOptions {
                name: self.name,
                expires,
                output: self.output,
            },
        ))
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = NkjwtConfig::load(cli.config.as_deref())?;

    match cli.cmd {
        Command::Keys { cmd } => match cmd {
            KeysCommand::Generate { kind, output } => {
                commands::keys::generate(kind.into(), output)?
            }
        },

        Command::Encode { cmd } => match cmd {
            EncodeCommand::Operator {
                issue,
                signing_keys,
            } => {
                let (seed, opts) = issue.resolve(&config)?;
                commands::encode::operator(&seed, signing_keys, opts)?
            }
            EncodeCommand::Account {
                subject,
                issue,
                signing_keys,
            } => {
                let (seed, opts) = issue.resolve(&config)?;
                commands::encode::account(&subject, &seed, signing_keys, opts)?
            }
            EncodeCommand::User {
                subject,
                issue,
                issuer_account,
            } => {
                let (seed, opts) = issue.resolve(&config)?;
                commands::encode::user(&subject, &seed, issuer_account, opts)?
            }
        },

        Command::Decode { token } => commands::decode::run(&token)?,

        Command::Verify { token } => commands::verify::verify(&token)?,

        Command::Validate {
            tokens,
            strict,
            permissive,
        } => {
            let preset = match (strict, permissive) {
                (true, _) => Preset::Strict,
                (_, true) => Preset::Permissive,
                _ => Preset::Config,
            };
            let opts = commands::validate::options_for(preset, config.validation);
            commands::validate::validate(&tokens, &opts)?
        }

        Command::Creds { jwt, seed, output } => {
            let seed = commands::resolve_seed(seed, &config.keys)?;
            commands::creds::creds(&jwt, &seed, output)?
        }
    }

    Ok(())
}
