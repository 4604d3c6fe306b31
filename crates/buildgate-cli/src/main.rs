//! CLI binary for running vessel admission checks against scenario files.

mod scenario;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use buildgate_pipeline::{
    AdmissionPipeline, AutoApproveOperator, ConsoleOperator, ConsolePrompt, DeclineOperator,
    FacilityChecker, FundsLedger, Operator, PartInspector, TechRegistry,
};
use buildgate_types::{AdmissionOutcome, AdmissionReport};
use clap::{Parser, Subcommand};

use crate::scenario::Scenario;

#[derive(Parser)]
#[command(name = "buildgate", version, about = "Admission checks for the vessel build queue")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Try to admit the scenario's vessel to the build queue
    Admit {
        /// Path to the scenario .json file
        scenario: PathBuf,

        /// Skip the facility requirements check
        #[arg(long)]
        skip_facility: bool,

        /// Skip the part availability check
        #[arg(long)]
        skip_parts: bool,

        /// Skip both funds checks
        #[arg(long)]
        skip_funds: bool,

        /// Accept every unlock offer without asking
        #[arg(long, conflicts_with = "decline")]
        auto_approve: bool,

        /// Decline every unlock offer without asking
        #[arg(long)]
        decline: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show cost and part availability for the scenario's vessel
    Inspect {
        /// Path to the scenario .json file
        scenario: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Admit {
            scenario,
            skip_facility,
            skip_parts,
            skip_funds,
            auto_approve,
            decline,
            json,
        } => {
            let operator: Box<dyn Operator> = if auto_approve {
                Box::new(AutoApproveOperator)
            } else if decline {
                Box::new(DeclineOperator)
            } else {
                Box::new(ConsoleOperator)
            };
            let skips = Skips {
                facility: skip_facility,
                parts: skip_parts,
                funds: skip_funds,
            };
            let admitted = cmd_admit(&scenario, skips, operator.as_ref(), json).await?;
            if !admitted {
                std::process::exit(1);
            }
        }
        Commands::Inspect { scenario } => {
            cmd_inspect(&scenario)?;
        }
    }

    Ok(())
}

struct Skips {
    facility: bool,
    parts: bool,
    funds: bool,
}

async fn cmd_admit(
    path: &Path,
    skips: Skips,
    operator: &dyn Operator,
    json: bool,
) -> anyhow::Result<bool> {
    let scenario = Scenario::load(path)?;
    let world = scenario.world(Arc::new(ConsolePrompt));
    tracing::debug!(
        scenario = %path.display(),
        vessel = %scenario.vessel.name,
        funds = scenario.funds,
        "Loaded scenario"
    );

    let mut config = scenario.validation;
    config.check_facility_requirements &= !skips.facility;
    config.check_part_availability &= !skips.parts;
    config.check_available_funds &= !skips.funds;

    let pipeline = AdmissionPipeline::new(world.services.clone(), config);
    let done = pipeline.admit(scenario.vessel.clone(), operator).await?;
    let report = AdmissionReport::new(done.run_id, &scenario.vessel.name, &done.outcome);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &done.outcome {
            AdmissionOutcome::Admitted(vessel) => {
                println!("\nAdmitted: {} (run {})", vessel.name, done.run_id);
            }
            AdmissionOutcome::Rejected(reason) => {
                println!("\nRejected: {} (run {})", reason, done.run_id);
            }
        }
        println!("Funds remaining: {}", world.ledger.current_balance());
        let purchased = world.research.purchased_parts();
        if !purchased.is_empty() {
            let ids: Vec<&str> = purchased.iter().map(|p| p.as_str()).collect();
            println!("Purchased parts: {}", ids.join(", "));
        }
    }

    Ok(report.admitted)
}

fn cmd_inspect(path: &Path) -> anyhow::Result<()> {
    let scenario = Scenario::load(path)?;
    let world = scenario.world(Arc::new(ConsolePrompt));
    let vessel = &scenario.vessel;

    println!("Vessel: {}", vessel.name);
    println!("Mode: {}", vessel.mode.action_phrase());
    println!("Parts: {}", vessel.part_count());
    println!("Mass: {:.2}t", vessel.total_mass());
    println!("Cost: {}", vessel.total_cost());
    println!("Funds: {}", world.ledger.current_balance());
    println!("Career: {}", scenario.career);

    let locked = world.services.parts.locked_parts(vessel);
    if !locked.is_empty() {
        println!("\nLocked parts:");
        for req in &locked {
            println!("  {}x {} (needs {})", req.count, req.part.title, req.part.tech_required);
        }
    }

    let experimental = world.services.parts.experimental_parts(vessel);
    if !experimental.is_empty() {
        println!("\nExperimental parts:");
        for req in &experimental {
            let state = if world.services.tech.is_researched(&req.part) {
                format!("unlock for {}", req.part.entry_cost)
            } else {
                format!("needs {}", req.part.tech_required)
            };
            println!("  {}x {} ({})", req.count, req.part.title, state);
        }
    }

    let violations = world.services.facility.evaluate(vessel, true);
    if !violations.is_empty() {
        println!("\nFacility violations:");
        for v in &violations {
            println!("  {v}");
        }
    }

    Ok(())
}
