// main.rs — xsig-interop CLI entry point
//
// Discovery and inspection only: signatures are verified by the embedding
// test suite through verify::Driver, never by this binary.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;

use cli::{BundlesAction, Cli, Commands, ConfigAction};
use xsig_interop::report::{ContextReport, DiscoveryReport};
use xsig_interop::{BundleLoader, HarnessConfig, ValidationContext};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bundles { action } => match action {
            BundlesAction::List { root, config, json } => {
                let failed = cmd_list(&root, config.as_deref(), json)?;
                if failed > 0 {
                    std::process::exit(1);
                }
                Ok(())
            }
            BundlesAction::Inspect { bundle, config } => cmd_inspect(&bundle, config.as_deref()),
        },
        Commands::Config { action } => match action {
            ConfigAction::Default => {
                println!("{}", serde_json::to_string_pretty(&HarnessConfig::default())?);
                Ok(())
            }
        },
    }
}

fn load_config(path: Option<&Path>) -> Result<HarnessConfig> {
    let config = HarnessConfig::load_or_default(path)?;
    if let Some(p) = path {
        eprintln!("[xsig] Configuration: {}", p.display());
    }
    Ok(config)
}

/// List all bundles under `root`. Returns the number of bundles that failed
/// to load.
fn cmd_list(root: &Path, config_path: Option<&Path>, json: bool) -> Result<usize> {
    let config = load_config(config_path)?;
    let loader = BundleLoader::new(&config).context("building bundle loader")?;
    let bundles = loader
        .discover(root)
        .with_context(|| format!("discovering bundles in {}", root.display()))?;

    let report = DiscoveryReport::new(root, config.accumulation, &bundles)
        .context("summarizing validation material")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for bundle in &report.bundles {
            match &bundle.error {
                Some(e) => eprintln!("[xsig] {}: FAILED: {}", bundle.name, e),
                None => eprintln!("[xsig] {}: {} case(s)", bundle.name, bundle.cases.len()),
            }
            for case in &bundle.cases {
                println!(
                    "{}\texpect={}\tanchors={}\tcerts={}\tcrls={}\trevocation={}",
                    case.description,
                    case.expected_form
                        .map(|f| f.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    case.trust_anchors.len(),
                    case.certificates.len(),
                    case.crls.len(),
                    if case.revocation_enabled { "on" } else { "off" },
                );
            }
        }
    }

    let total: usize = report.bundles.iter().map(|b| b.cases.len()).sum();
    let failed = report.failed_bundles();
    eprintln!();
    if failed > 0 {
        eprintln!(
            "❌ {} bundle(s), {} case(s), {} bundle(s) failed to load",
            report.bundles.len(),
            total,
            failed
        );
    } else {
        eprintln!("✅ {} bundle(s), {} case(s)", report.bundles.len(), total);
    }
    Ok(failed)
}

fn cmd_inspect(bundle: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let loader = BundleLoader::new(&config).context("building bundle loader")?;
    let cases = loader
        .load_from(bundle)
        .with_context(|| format!("loading bundle {}", bundle.display()))?;

    if cases.is_empty() {
        eprintln!("[xsig] No signature documents in {}", bundle.display());
        return Ok(());
    }

    let reports = cases
        .iter()
        .map(|case| ContextReport::new(case, &ValidationContext::for_case(case)))
        .collect::<Result<Vec<_>, _>>()
        .context("summarizing validation material")?;
    println!("{}", serde_json::to_string_pretty(&reports)?);

    eprintln!("[xsig] {} case(s) in {}", reports.len(), bundle.display());
    Ok(())
}
