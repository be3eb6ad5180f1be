//! The generation run: resolve settings, render, write, report.
//!
//! Responsibility: translate CLI arguments and configuration into a
//! `GenerateRequest`, call the core service, and display results. No template
//! logic lives here.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, instrument};

use distgen_adapters::{LocalFilesystem, PlaceholderRenderer};
use distgen_core::{
    application::{GenerateRequest, GenerateService},
    domain::{Bindings, MissingVariablePolicy, NETWORK_KEY, Network},
    error::DistgenError,
};

use crate::{
    cli::{GenerateArgs, OutputFormat},
    config::AppConfig,
    error::{CliResult, IntoCli},
    output::OutputManager,
};

/// Printed after the output file has been written.
pub const COMPLETION_MESSAGE: &str = "MerkleDistributor file updated.";

/// Fully resolved settings for one run.
#[derive(Debug)]
struct Settings {
    template: PathBuf,
    output: PathBuf,
    bindings: Bindings,
    policy: MissingVariablePolicy,
}

/// JSON shape of a `--dry-run` result.
#[derive(Debug, Serialize)]
struct DryRunReport<'a> {
    template: &'a PathBuf,
    dry_run: bool,
    bindings: &'a Bindings,
    rendered: &'a str,
    unresolved: &'a [String],
}

/// Execute a generation run.
///
/// 1. Resolve paths, network, bindings and policy (flags over config)
/// 2. Wire the service with the local filesystem and placeholder renderer
/// 3. `--dry-run`: render and print, write nothing
/// 4. Otherwise render and write, then report
#[instrument(skip_all)]
pub fn execute(args: GenerateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let settings = resolve(Flags::from(&args), &config)?;
    debug!(
        template = %settings.template.display(),
        output = %settings.output.display(),
        policy = %settings.policy,
        bindings = ?settings.bindings,
        "Settings resolved"
    );

    let service = GenerateService::new(
        Box::new(LocalFilesystem::new()),
        Box::new(PlaceholderRenderer::with_policy(settings.policy)),
    );

    if args.dry_run {
        let rendered = service
            .render(&settings.template, &settings.bindings)
            .with_cli_context(|| "rendering template")?;

        return match output.format() {
            OutputFormat::Json => Ok(output.json(&DryRunReport {
                template: &settings.template,
                dry_run: true,
                bindings: &settings.bindings,
                rendered: rendered.as_str(),
                unresolved: rendered.unresolved(),
            })?),
            _ => {
                output
                    .raw(rendered.as_str())
                    .with_cli_context(|| "writing rendered output to stdout")?;
                warn_unresolved(&output, rendered.unresolved())
            }
        };
    }

    let report = service
        .generate(&GenerateRequest {
            template_path: settings.template,
            output_path: settings.output,
            bindings: settings.bindings,
        })
        .with_cli_context(|| "generating contract")?;

    info!(
        output = %report.output.display(),
        bytes = report.bytes_written,
        "Contract generated"
    );

    if output.format() == OutputFormat::Json {
        output.json(&report)?;
        return Ok(());
    }

    warn_unresolved(&output, &report.unresolved)?;
    output.success(COMPLETION_MESSAGE)?;

    Ok(())
}

fn warn_unresolved(output: &OutputManager, names: &[String]) -> CliResult<()> {
    if !names.is_empty() {
        output.warning(&format!("Unbound template variables: {}", names.join(", ")))?;
    }
    Ok(())
}

/// The subset of [`GenerateArgs`] that feeds [`resolve`].
#[derive(Debug, Default)]
struct Flags {
    template: Option<PathBuf>,
    output: Option<PathBuf>,
    network: Option<String>,
    defines: Vec<String>,
    policy: Option<MissingVariablePolicy>,
}

impl From<&GenerateArgs> for Flags {
    fn from(args: &GenerateArgs) -> Self {
        Self {
            template: args.template.clone(),
            output: args.output.clone(),
            network: args.network.clone(),
            defines: args.defines.clone(),
            policy: args.on_missing.map(Into::into),
        }
    }
}

/// Merge flags over configuration.
///
/// Bindings are layered as config defines, then `--define`, then the
/// network, so `--network` always decides the value of `network`.
fn resolve(flags: Flags, config: &AppConfig) -> Result<Settings, DistgenError> {
    let network = Network::new(
        flags
            .network
            .unwrap_or_else(|| config.defaults.network.clone()),
    )?;

    let mut bindings = Bindings::new();
    for (key, value) in &config.render.defines {
        bindings = bindings.define(&format!("{key}={value}"))?;
    }
    for assignment in &flags.defines {
        bindings = bindings.define(assignment)?;
    }
    let bindings = bindings.with(NETWORK_KEY, network.as_str());

    Ok(Settings {
        template: flags
            .template
            .unwrap_or_else(|| config.defaults.template.clone()),
        output: flags
            .output
            .unwrap_or_else(|| config.defaults.output.clone()),
        bindings,
        policy: flags.policy.unwrap_or(config.render.on_missing),
    })
}
