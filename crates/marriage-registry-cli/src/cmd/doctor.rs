use std::path::PathBuf;

use anyhow::Result;
use marriage_registry_client::{payer, ClientConfig, ConfigOverrides};
use serde::Serialize;

use crate::output;

#[derive(Debug, Serialize)]
pub struct Check {
    pub name: String,
    pub ok: bool,
    pub required: bool,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct DoctorOut {
    pub ok: bool,
    pub checks: Vec<Check>,
}

/// Local checks only; nothing here talks to the cluster.
pub async fn run(overrides: ConfigOverrides) -> Result<()> {
    let mut checks = Vec::new();

    let cli_config_path = overrides
        .config_file
        .clone()
        .or_else(|| solana_cli_config::CONFIG_FILE.as_ref().map(PathBuf::from));
    checks.push(match &cli_config_path {
        Some(p) => Check {
            name: "solana-config".to_string(),
            ok: p.exists(),
            required: false,
            detail: p.display().to_string(),
        },
        None => Check {
            name: "solana-config".to_string(),
            ok: false,
            required: false,
            detail: "no config location".to_string(),
        },
    });

    let config = match ClientConfig::resolve(overrides) {
        Ok(cfg) => {
            checks.push(Check {
                name: "config".to_string(),
                ok: true,
                required: true,
                detail: format!("rpc {}", cfg.rpc_url),
            });
            cfg
        }
        Err(e) => {
            checks.push(Check {
                name: "config".to_string(),
                ok: false,
                required: true,
                detail: e.to_string(),
            });
            return report(checks);
        }
    };

    // A missing payer is generated at run time, so it does not fail the check.
    let payer = payer::load_existing(config.keypair_path.as_deref());
    checks.push(Check {
        name: "payer-keypair".to_string(),
        ok: payer.is_ok(),
        required: false,
        detail: match &payer {
            Ok(_) => config
                .keypair_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            Err(e) => format!("{e}; a new payer will be generated"),
        },
    });

    checks.push(Check {
        name: "program-binary".to_string(),
        ok: config.program.so_path.exists(),
        required: false,
        detail: config.program.so_path.display().to_string(),
    });

    let program = config.program.program_id();
    checks.push(Check {
        name: "program-keypair".to_string(),
        ok: program.is_ok(),
        required: true,
        detail: match &program {
            Ok(id) => format!("program id {id}"),
            Err(e) => e.to_string(),
        },
    });

    report(checks)
}

fn report(checks: Vec<Check>) -> Result<()> {
    let ok = checks.iter().all(|c| c.ok || !c.required);
    let human = checks
        .iter()
        .map(|c| {
            let mark = if c.ok { "ok" } else if c.required { "FAIL" } else { "warn" };
            format!("[{mark}] {}: {}", c.name, c.detail)
        })
        .collect::<Vec<_>>()
        .join("\n");
    output::print(&DoctorOut { ok, checks }, &human)?;
    if !ok {
        anyhow::bail!("environment checks failed");
    }
    Ok(())
}
