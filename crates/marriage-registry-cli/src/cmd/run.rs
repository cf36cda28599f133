use anyhow::Result;
use marriage_registry_client::{ClientConfig, PipelineStep, RunReport};

use crate::output;

pub async fn run(config: ClientConfig) -> Result<()> {
    let pb = super::spinner();

    pb.set_message(format!("connecting to {}", config.rpc_url));
    let client = marriage_registry_client::connect(config).await?;

    let report = client
        .run_pipeline_with(|step| match step {
            PipelineStep::FundPayer => pb.set_message("funding payer"),
            PipelineStep::PrepareProgram => pb.set_message("checking program and registry account"),
            PipelineStep::Increment { registry } => pb.set_message(format!("registering to {registry}")),
            PipelineStep::ReadCounter => pb.set_message("reading counter"),
        })
        .await?;
    pb.finish_and_clear();

    output::print(&report, &human_lines(&report).join("\n"))
}

fn human_lines(report: &RunReport) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Connection to cluster established: {} (solana-core {})",
            report.endpoint, report.node_version
        ),
        format!(
            "Using account {} containing {} SOL to pay for fees",
            report.payer, report.payer_balance_sol
        ),
        format!("Using program {}", report.program_id),
    ];
    if report.registry_created {
        lines.push(format!("Created account {} to register to", report.registry));
    }
    lines.push(format!("Registered to {} in {}", report.registry, report.increment_signature));
    lines.push(report.summary());
    lines
}
