//! Simulate command - preview a routing decision offline.

use anyhow::Result;
use clap::Args;
use gateway_config::ConfigLoader;
use gateway_routing::capabilities::TEXT;
use gateway_routing::{simulate, Capabilities, SimulatedDecision};
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

use crate::output::{self, OutputFormat};

/// Arguments for the simulate command.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Config file (.yaml, .yml, .toml or .json); defaults to $ROUTING_PROFILES_CONFIG
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Model string in <virtual_provider>/<virtual_model> form
    #[arg(short, long)]
    pub model: String,

    /// Request type, e.g. chat or embedding
    #[arg(short = 't', long)]
    pub request_type: Option<String>,

    /// Capability the request carries besides text (repeatable)
    #[arg(short, long = "capability")]
    pub capabilities: Vec<String>,
}

#[derive(Debug, Serialize, Tabled)]
struct CandidateRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Priority")]
    priority: i32,
    #[tabled(rename = "Weight")]
    weight: f64,
}

#[derive(Debug, Serialize, Tabled)]
struct RejectionRow {
    #[tabled(rename = "Reason")]
    reason: String,
    #[tabled(rename = "Targets")]
    count: usize,
}

/// Capabilities for a simulated request: text plus whatever was asked for.
pub fn request_capabilities(extra: &[String]) -> Capabilities {
    std::iter::once(TEXT.to_string())
        .chain(extra.iter().map(|c| c.trim().to_string()).filter(|c| !c.is_empty()))
        .collect()
}

/// Execute the simulate command.
pub async fn execute(args: SimulateArgs, json: bool) -> Result<()> {
    let format = OutputFormat::from_json_flag(json);
    let (_, config) = ConfigLoader::new().load(args.file.as_deref()).await?;

    let capabilities = request_capabilities(&args.capabilities);
    let decision = simulate(
        &config.effective_profiles(),
        &args.model,
        args.request_type.as_deref(),
        &capabilities,
    )?;

    print_decision(&decision, format)
}

fn print_decision(decision: &SimulatedDecision, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return output::json(decision);
    }

    output::section("Decision");
    output::key_value("Profile", &decision.profile.name);
    output::key_value("Strategy", decision.strategy.as_str());
    output::key_value("Primary", decision.primary.as_deref().unwrap_or("(none)"));
    let fallbacks = if decision.fallbacks.is_empty() {
        "(none)".to_string()
    } else {
        decision.fallbacks.join(", ")
    };
    output::key_value("Fallbacks", &fallbacks);

    output::section("Candidates");
    let rows: Vec<CandidateRow> = decision
        .candidates
        .iter()
        .enumerate()
        .map(|(i, c)| CandidateRow {
            rank: i + 1,
            provider: c.provider.clone(),
            model: c.model.clone(),
            priority: c.priority,
            weight: c.weight,
        })
        .collect();
    output::table(&rows);

    if !decision.rejections.is_empty() {
        output::section("Rejected targets");
        let rows: Vec<RejectionRow> = decision
            .rejections
            .iter()
            .map(|(reason, count)| RejectionRow {
                reason: reason.to_string(),
                count,
            })
            .collect();
        output::table(&rows);
    }

    println!();
    for caveat in &decision.caveats {
        output::warning(&format!("Not simulated: {}", caveat.description()));
    }
    Ok(())
}
