use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use uc_sdk::{Channel, ProofType};

#[derive(Parser)]
#[command(
    name = "unichain",
    about = "UNI-CHAIN: hash-chained produce ledger and constraint proofs",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Node configuration file. Missing file means defaults.
    #[arg(short, long, global = true, default_value = "unichain.toml")]
    pub config: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ChannelArg {
    Economic,
    Quality,
}

impl From<ChannelArg> for Channel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Economic => Channel::Economic,
            ChannelArg::Quality => Channel::Quality,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ProofTypeArg {
    Quality,
    Economic,
    Route,
}

impl From<ProofTypeArg> for ProofType {
    fn from(arg: ProofTypeArg) -> Self {
        match arg {
            ProofTypeArg::Quality => ProofType::Quality,
            ProofTypeArg::Economic => ProofType::Economic,
            ProofTypeArg::Route => ProofType::Route,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a default config and create the data directory
    Init(InitArgs),
    /// Economic channel operations
    Economic {
        #[command(subcommand)]
        action: AppendAction,
    },
    /// Quality channel operations
    Quality {
        #[command(subcommand)]
        action: AppendAction,
    },
    /// Inspect ledger records
    Ledger {
        #[command(subcommand)]
        action: LedgerAction,
    },
    /// Recompute every hash and link of one or both channels
    Verify(VerifyArgs),
    /// Generate, list, and audit constraint proofs
    Proof {
        #[command(subcommand)]
        action: ProofAction,
    },
    /// Show a batch's full history across both channels
    Trail(TrailArgs),
    /// Print the canonical encoding of a flat JSON object
    Canon(CanonArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize. Defaults to the current directory.
    pub path: Option<PathBuf>,
    #[arg(long)]
    pub force: bool,
}

#[derive(Subcommand)]
pub enum AppendAction {
    /// Append a transaction read from a JSON file (`{"submittedBy": .., "tx": ..}`)
    Append {
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum LedgerAction {
    /// List records of one channel, oldest first
    List(ListArgs),
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long)]
    pub channel: ChannelArg,
    #[arg(long)]
    pub batch: Option<String>,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Verify only this channel.
    #[arg(long)]
    pub channel: Option<ChannelArg>,
}

#[derive(Subcommand)]
pub enum ProofAction {
    /// Evaluate a payload read from a JSON file (`{"subject": .., "payload": ..}`)
    Generate {
        #[arg(short, long)]
        file: PathBuf,
        /// Store the proof in the registry.
        #[arg(long)]
        record: bool,
        /// Store the proof even if a constraint failed, as unverified.
        #[arg(long, requires = "record")]
        keep_failed: bool,
    },
    /// List recorded proofs, newest first
    List(ProofListArgs),
    /// Check a recorded proof against its original payload
    Recompute {
        #[arg(long)]
        id: String,
        /// JSON file holding the original payload.
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Args)]
pub struct ProofListArgs {
    #[arg(long)]
    pub batch: Option<String>,
    #[arg(long = "type")]
    pub proof_type: Option<ProofTypeArg>,
    #[arg(long)]
    pub verified: Option<bool>,
    #[arg(long)]
    pub subject: Option<String>,
}

#[derive(Args)]
pub struct TrailArgs {
    #[arg(long)]
    pub batch: String,
}

#[derive(Args)]
pub struct CanonArgs {
    #[arg(short, long)]
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init() {
        let cli = Cli::try_parse_from(["unichain", "init"]).unwrap();
        assert!(matches!(cli.command, Command::Init(_)));
        assert_eq!(cli.config, PathBuf::from("unichain.toml"));
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn parse_economic_append() {
        let cli =
            Cli::try_parse_from(["unichain", "economic", "append", "--file", "sale.json"]).unwrap();
        match cli.command {
            Command::Economic {
                action: AppendAction::Append { file },
            } => assert_eq!(file, PathBuf::from("sale.json")),
            _ => panic!("expected economic append"),
        }
    }

    #[test]
    fn parse_ledger_list_with_batch() {
        let cli = Cli::try_parse_from([
            "unichain", "ledger", "list", "--channel", "quality", "--batch", "TOM-1",
        ])
        .unwrap();
        match cli.command {
            Command::Ledger {
                action: LedgerAction::List(args),
            } => {
                assert_eq!(Channel::from(args.channel), Channel::Quality);
                assert_eq!(args.batch.as_deref(), Some("TOM-1"));
            }
            _ => panic!("expected ledger list"),
        }
    }

    #[test]
    fn parse_proof_generate_and_list() {
        let cli = Cli::try_parse_from([
            "unichain", "--format", "json", "proof", "generate", "-f", "p.json", "--record",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(
            cli.command,
            Command::Proof {
                action: ProofAction::Generate {
                    record: true,
                    keep_failed: false,
                    ..
                }
            }
        ));

        let cli = Cli::try_parse_from([
            "unichain", "proof", "list", "--type", "route", "--verified", "false",
        ])
        .unwrap();
        match cli.command {
            Command::Proof {
                action: ProofAction::List(args),
            } => {
                assert_eq!(args.proof_type.map(ProofType::from), Some(ProofType::Route));
                assert_eq!(args.verified, Some(false));
            }
            _ => panic!("expected proof list"),
        }
    }

    #[test]
    fn keep_failed_requires_record() {
        assert!(Cli::try_parse_from([
            "unichain", "proof", "generate", "-f", "p.json", "--keep-failed",
        ])
        .is_err());
    }

    #[test]
    fn parse_verify_all_channels() {
        let cli = Cli::try_parse_from(["unichain", "verify", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Verify(VerifyArgs { channel: None })));
    }
}
