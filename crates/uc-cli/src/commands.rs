use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uc_crypto::CanonicalPayload;
use uc_proof::{Claim, Evaluation, Violation};
use uc_sdk::{
    ActorId, ActorRef, BatchId, ChainReport, Channel, Digest, EconomicFilter, EconomicTx,
    LedgerEntry, ProofFilter, ProofId, ProofPayload, ProofRecord, ProofType, QualityFilter,
    QualityTx, Recorded, Unichain,
};
use uc_store::FileRecordStore;

use crate::cli::*;
use crate::config::NodeConfig;

/// A ledger append read from disk.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Submission<T> {
    submitted_by: ActorRef,
    tx: T,
}

/// A proof request read from disk.
#[derive(Deserialize)]
struct Attestation {
    subject: ActorRef,
    payload: ProofPayload,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProofView<'a> {
    #[serde(flatten)]
    record: &'a ProofRecord,
    proof_hash: Digest,
    #[serde(skip_serializing_if = "Option::is_none")]
    duplicate: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EvaluationView<'a> {
    proof_type: ProofType,
    subject: &'a ActorRef,
    batch_id: Option<&'a BatchId>,
    commitment: Digest,
    verified: bool,
    claim: &'a Claim,
    violation: Option<&'a Violation>,
}

impl<'a> From<&'a Evaluation> for EvaluationView<'a> {
    fn from(e: &'a Evaluation) -> Self {
        Self {
            proof_type: e.proof_type,
            subject: &e.subject,
            batch_id: e.batch_id.as_ref(),
            commitment: e.commitment,
            verified: e.is_verified(),
            claim: &e.claim,
            violation: e.violation.as_ref(),
        }
    }
}

struct Node {
    chain: Unichain<FileRecordStore>,
    format: OutputFormat,
}

impl Node {
    fn open(config_path: &Path, format: OutputFormat) -> anyhow::Result<Self> {
        let config = NodeConfig::load(config_path)?;
        let data_dir = config.resolve_data_dir(config_path);
        let chain = Unichain::open_dir(&data_dir, &config.unichain())
            .with_context(|| format!("opening data directory {}", data_dir.display()))?;
        Ok(Self { chain, format })
    }

    fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        format,
        config,
        ..
    } = cli;
    let open = || Node::open(&config, format);

    match command {
        Command::Init(args) => cmd_init(args),
        Command::Canon(args) => cmd_canon(args, format),
        Command::Economic {
            action: AppendAction::Append { file },
        } => cmd_append_economic(&open()?, &file),
        Command::Quality {
            action: AppendAction::Append { file },
        } => cmd_append_quality(&open()?, &file),
        Command::Ledger {
            action: LedgerAction::List(args),
        } => cmd_list(&open()?, args),
        Command::Verify(args) => cmd_verify(&open()?, args),
        Command::Proof { action } => match action {
            ProofAction::Generate {
                file,
                record,
                keep_failed,
            } => cmd_proof_generate(&open()?, &file, record, keep_failed),
            ProofAction::List(args) => cmd_proof_list(&open()?, args),
            ProofAction::Recompute { id, file } => cmd_proof_recompute(&open()?, &id, &file),
        },
        Command::Trail(args) => cmd_trail(&open()?, args),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    let root = args.path.unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&root).with_context(|| format!("creating {}", root.display()))?;
    let config_path = root.join("unichain.toml");
    if config_path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", config_path.display());
    }

    let config = NodeConfig::default();
    fs::write(&config_path, config.to_toml()?)
        .with_context(|| format!("writing {}", config_path.display()))?;
    let data_dir = config.resolve_data_dir(&config_path);
    Unichain::open_dir(&data_dir, &config.unichain())?;

    println!(
        "{} Initialized UNI-CHAIN node in {}",
        "✓".green().bold(),
        root.display().to_string().bold()
    );
    println!("  Config: {}", config_path.display());
    println!("  Data:   {}", data_dir.display());
    Ok(())
}

fn print_sealed(entry: &LedgerEntry) {
    println!(
        "{} Sealed {} on the {} channel",
        "✓".green().bold(),
        entry.label().yellow().bold(),
        entry.channel()
    );
    println!("  Hash:      {}", entry.hash().to_hex().cyan());
    println!("  Prev hash: {}", entry.prev_hash().to_hex().dimmed());
    println!("  Time:      {}", entry.timestamp());
    println!("  {}", entry.summary());
}

fn cmd_append_economic(node: &Node, file: &Path) -> anyhow::Result<()> {
    let input: Submission<EconomicTx> = read_json(file)?;
    let record = node.chain.append_economic(input.submitted_by, input.tx)?;
    let entry = LedgerEntry::from(record);
    if node.json() {
        return print_json(&entry);
    }
    print_sealed(&entry);
    Ok(())
}

fn cmd_append_quality(node: &Node, file: &Path) -> anyhow::Result<()> {
    let input: Submission<QualityTx> = read_json(file)?;
    let record = node.chain.append_quality(input.submitted_by, input.tx)?;
    let entry = LedgerEntry::from(record);
    if node.json() {
        return print_json(&entry);
    }
    print_sealed(&entry);
    Ok(())
}

fn cmd_list(node: &Node, args: ListArgs) -> anyhow::Result<()> {
    let channel = Channel::from(args.channel);
    let entries: Vec<LedgerEntry> = match channel {
        Channel::Economic => {
            let mut filter = EconomicFilter::new();
            if let Some(batch) = args.batch.as_deref() {
                filter = filter.batch(batch);
            }
            node.chain
                .query_economic(&filter)?
                .into_iter()
                .map(LedgerEntry::from)
                .collect()
        }
        Channel::Quality => {
            let mut filter = QualityFilter::new();
            if let Some(batch) = args.batch.as_deref() {
                filter = filter.batch(batch);
            }
            node.chain
                .query_quality(&filter)?
                .into_iter()
                .map(LedgerEntry::from)
                .collect()
        }
    };

    if node.json() {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No {channel} records.");
        return Ok(());
    }
    for entry in &entries {
        let batch = entry.batch_id().map(BatchId::as_str).unwrap_or("-");
        println!(
            "{}  {}  {}  {}  {}",
            entry.label().yellow().bold(),
            entry.hash().short_hex().dimmed(),
            entry.timestamp(),
            batch.cyan(),
            entry.submitted_by()
        );
        println!("    {}", entry.summary());
    }
    Ok(())
}

fn cmd_verify(node: &Node, args: VerifyArgs) -> anyhow::Result<()> {
    let reports: Vec<ChainReport> = match args.channel {
        Some(channel) => vec![node.chain.verify_chain(channel.into())?],
        None => node.chain.verify_all()?,
    };

    if node.json() {
        print_json(&reports)?;
    } else {
        for report in &reports {
            match &report.first_failure {
                None => println!(
                    "{} {} chain valid ({} records)",
                    "✓".green().bold(),
                    report.channel,
                    report.record_count
                ),
                Some(failure) => {
                    println!(
                        "{} {} chain {} at {}",
                        "✗".red().bold(),
                        report.channel,
                        "BROKEN".red().bold(),
                        failure.label.yellow().bold()
                    );
                    println!("  Kind:   {:?}", failure.kind);
                    println!("  Detail: {}", failure.detail);
                }
            }
        }
    }

    if reports.iter().all(ChainReport::is_valid) {
        Ok(())
    } else {
        bail!("ledger integrity check failed")
    }
}

fn print_proof(record: &ProofRecord, proof_hash: &Digest) {
    let status = if record.verified {
        "VERIFIED".green().bold()
    } else {
        "UNVERIFIED".red().bold()
    };
    println!(
        "{}  {}  {}  {}",
        record.id.short_id().yellow().bold(),
        record.proof_type.to_string().cyan(),
        status,
        record.created_at
    );
    println!(
        "    Batch: {}  Subject: {}",
        record.batch_id.as_ref().map(BatchId::as_str).unwrap_or("-"),
        record.subject
    );
    println!("    Claim: {}", record.claim.summary());
    println!("    Commitment: {}", record.commitment.short_hex().dimmed());
    println!("    Proof hash: {}", proof_hash.short_hex().dimmed());
}

fn print_recorded(node: &Node, recorded: &Recorded) -> anyhow::Result<()> {
    let record = recorded.record();
    let proof_hash = record.proof_hash()?;
    if node.json() {
        return print_json(&ProofView {
            record,
            proof_hash,
            duplicate: Some(recorded.is_duplicate()),
        });
    }
    if recorded.is_duplicate() {
        println!("{} Proof already recorded", "•".yellow().bold());
    } else {
        println!("{} Proof recorded", "✓".green().bold());
    }
    print_proof(record, &proof_hash);
    Ok(())
}

fn cmd_proof_generate(
    node: &Node,
    file: &Path,
    record: bool,
    keep_failed: bool,
) -> anyhow::Result<()> {
    let input: Attestation = read_json(file)?;
    let evaluation = node.chain.evaluate_proof(&input.subject, &input.payload)?;

    if !record {
        if node.json() {
            print_json(&EvaluationView::from(&evaluation))?;
        } else {
            match evaluation.outcome() {
                Ok(claim) => {
                    println!("{} Constraints satisfied", "✓".green().bold());
                    println!("  Claim: {}", claim.summary());
                }
                Err(violation) => println!("{} {}", "✗".red().bold(), violation),
            }
            println!("  Commitment: {}", evaluation.commitment.to_hex().cyan());
        }
        return match evaluation.violation {
            Some(violation) => Err(violation.into()),
            None => Ok(()),
        };
    }

    let recorded = match evaluation.violation.clone() {
        None => node.chain.record_proof(evaluation.into_record())?,
        Some(violation) if keep_failed => {
            eprintln!("{} recording unverified proof: {}", "warning:".yellow().bold(), violation);
            node.chain.record_proof(evaluation.into_record())?
        }
        Some(violation) => return Err(violation.into()),
    };
    print_recorded(node, &recorded)
}

fn cmd_proof_list(node: &Node, args: ProofListArgs) -> anyhow::Result<()> {
    let filter = ProofFilter {
        batch_id: args.batch.map(BatchId::new),
        proof_type: args.proof_type.map(ProofType::from),
        verified: args.verified,
        subject_id: args.subject.map(ActorId::new),
    };
    let proofs = node.chain.query_proofs(&filter)?;

    if node.json() {
        let views = proofs
            .iter()
            .map(|record| {
                Ok(ProofView {
                    record,
                    proof_hash: record.proof_hash()?,
                    duplicate: None,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        return print_json(&views);
    }
    if proofs.is_empty() {
        println!("No proofs recorded.");
        return Ok(());
    }
    for record in &proofs {
        print_proof(record, &record.proof_hash()?);
    }
    Ok(())
}

fn cmd_proof_recompute(node: &Node, id: &str, file: &Path) -> anyhow::Result<()> {
    let id = ProofId::parse(id).with_context(|| format!("invalid proof id {id:?}"))?;
    let payload: ProofPayload = read_json(file)?;
    let matches = node.chain.recompute_proof(id, &payload)?;

    if node.json() {
        print_json(&serde_json::json!({ "id": id, "matches": matches }))?;
    } else if matches {
        println!("{} Proof {} reproduces from the supplied payload", "✓".green().bold(), id);
    } else {
        println!("{} Proof {} does NOT match the supplied payload", "✗".red().bold(), id);
    }
    if matches {
        Ok(())
    } else {
        bail!("proof {id} failed recomputation")
    }
}

fn cmd_trail(node: &Node, args: TrailArgs) -> anyhow::Result<()> {
    let batch = BatchId::new(args.batch);
    let trail = node.chain.batch_trail(&batch)?;
    let proofs = node
        .chain
        .query_proofs(&ProofFilter::new().batch(batch.clone()))?;

    if node.json() {
        return print_json(&serde_json::json!({ "trail": trail, "proofs": proofs }));
    }
    if trail.is_empty() && proofs.is_empty() {
        println!("No records for batch {}.", batch.as_str().cyan());
        return Ok(());
    }

    println!("Batch {}", batch.as_str().cyan().bold());
    println!(
        "  {} economic, {} quality records; {} units sold",
        trail.economic_count, trail.quality_count, trail.units_sold
    );
    if let Some(score) = trail.latest_quality_score {
        println!("  Latest quality score: {score}");
    }
    if trail.spoilage_detected {
        println!("  {}", "Spoilage detected".red().bold());
    }
    for entry in &trail.entries {
        println!(
            "  {}  {}  {}  {}",
            entry.label.yellow(),
            entry.timestamp,
            entry.hash.short_hex().dimmed(),
            entry.summary
        );
    }
    if !proofs.is_empty() {
        println!("Proofs");
        for record in &proofs {
            print_proof(record, &record.proof_hash()?);
        }
    }
    Ok(())
}

fn cmd_canon(args: CanonArgs, format: OutputFormat) -> anyhow::Result<()> {
    let value: serde_json::Value = read_json(&args.file)?;
    let bytes = CanonicalPayload::from_json_object(&value)?.encode()?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "canonical": bytes.as_str() })),
        OutputFormat::Text => {
            println!("{}", bytes.as_str());
            Ok(())
        }
    }
}
