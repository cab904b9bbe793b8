use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;
use serde_json::Value;

use trimerge_biblio::bibliographic_config;
use trimerge_engine::{merge, FieldFallback, ListUnifyOp, MergeConfig, MergeResult};
use trimerge_types::ConflictKind;

use crate::cli::{Cli, Command, MergeArgs, OutputFormat, Preset};

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Merge(args) => cmd_merge(args),
        Command::Ops => {
            cmd_ops();
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn cmd_merge(args: MergeArgs) -> anyhow::Result<ExitCode> {
    let fallback: FieldFallback = args.fallback.parse()?;
    let list_op: ListUnifyOp = args.list_op.parse()?;
    let config = match args.preset {
        Preset::Bibliographic => bibliographic_config(fallback, list_op),
        Preset::Plain => MergeConfig::new(fallback, list_op),
    };

    let result = merge_files(&args.root, &args.head, &args.update, &config)?;

    match args.format {
        OutputFormat::Json => print_json(&result, args.conflicts_only)?,
        OutputFormat::Text => print_text(&result, args.conflicts_only)?,
    }

    // Scripts gate on the exit status: non-zero means human review is due.
    Ok(if result.has_conflicts() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

fn cmd_ops() {
    println!("Field fallbacks:");
    for op in [FieldFallback::KeepHead, FieldFallback::KeepUpdate] {
        println!("  {}", op);
    }
    println!("List unification operations:");
    for op in [
        ListUnifyOp::KeepOnlyHeadEntities,
        ListUnifyOp::KeepOnlyUpdateEntities,
        ListUnifyOp::KeepHeadAndUpdateHeadFirst,
        ListUnifyOp::KeepHeadAndUpdateUpdateFirst,
        ListUnifyOp::KeepUpdateConflictOnHeadDelete,
    ] {
        println!("  {}", op);
    }
}

/// Load the three record files and merge them.
fn merge_files(
    root: &Path,
    head: &Path,
    update: &Path,
    config: &MergeConfig,
) -> anyhow::Result<MergeResult> {
    let root = load_record(root)?;
    let head = load_record(head)?;
    let update = load_record(update)?;
    Ok(merge(&root, &head, &update, config))
}

fn load_record(path: &Path) -> anyhow::Result<Value> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading record {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing record {}", path.display()))
}

fn print_json(result: &MergeResult, conflicts_only: bool) -> anyhow::Result<()> {
    if conflicts_only {
        println!("{}", serde_json::to_string_pretty(&result.conflicts)?);
    } else {
        println!("{}", serde_json::to_string_pretty(result)?);
    }
    Ok(())
}

fn print_text(result: &MergeResult, conflicts_only: bool) -> anyhow::Result<()> {
    if !conflicts_only {
        println!("{}", serde_json::to_string_pretty(&result.merged)?);
        println!();
    }

    if result.conflicts.is_empty() {
        println!("{} clean merge, no conflicts", "✓".green().bold());
        return Ok(());
    }

    println!(
        "{} {} conflict(s) need review:",
        "!".yellow().bold(),
        result.conflicts.len()
    );
    for conflict in &result.conflicts {
        let kind = match conflict.kind {
            ConflictKind::SetField => conflict.kind.as_str().red().bold(),
            ConflictKind::RemoveField => conflict.kind.as_str().magenta().bold(),
        };
        println!(
            "  {}  {}  {}",
            kind,
            conflict.path.to_string().yellow(),
            serde_json::to_string(&conflict.rejected)?
        );
    }
    Ok(())
}
