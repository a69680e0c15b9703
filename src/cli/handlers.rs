//! Subcommand handlers
//!
//! Each handler returns the process exit code; failures are logged.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, error};

use super::commands::{ClustersArgs, ConvertArgs, ViewArgs};
use super::output::OutputFormatter;
use crate::config::ModmapConfig;
use crate::convert::convert_file;
use crate::software::{software_cluster_view, ClusterView};
use crate::store::read_modulemap;

fn load_config() -> Result<ModmapConfig> {
    let config = ModmapConfig::default();
    config.validate().context("Invalid configuration")?;
    debug!("{}", config);
    Ok(config)
}

fn modulemap_input(input: &Option<PathBuf>, config: &ModmapConfig) -> PathBuf {
    input.clone().unwrap_or_else(|| config.modulemap_path())
}

fn exit_code(result: Result<()>, what: &str) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{} failed: {:#}", what, e);
            1
        }
    }
}

pub fn handle_convert(args: &ConvertArgs, quiet: bool) -> i32 {
    exit_code(run_convert(args, quiet), "Conversion")
}

fn run_convert(args: &ConvertArgs, quiet: bool) -> Result<()> {
    let mut config = load_config()?;
    if let Some(path) = &args.cluster_config {
        config.cluster_config = Some(path.clone());
    }

    let input = args.input.clone().unwrap_or_else(|| config.spider_path());
    let output = args.output.clone().unwrap_or_else(|| config.modulemap_path());
    let cluster_config = config
        .load_cluster_config()
        .context("Failed to load cluster configuration")?;

    let stats = convert_file(&input, &output, &cluster_config)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    if !quiet {
        let formatter = OutputFormatter::new(args.format.into());
        print!("{}", formatter.format_stats(&stats)?);
    }
    Ok(())
}

pub fn handle_view(args: &ViewArgs) -> i32 {
    exit_code(run_view(args), "View")
}

fn run_view(args: &ViewArgs) -> Result<()> {
    let config = load_config()?;
    let input = modulemap_input(&args.input, &config);
    let (_, software) = read_modulemap(&input)?;

    let mut clview = software_cluster_view(software)?;
    if let Some(cluster) = &args.cluster {
        let packages = clview
            .remove(cluster)
            .with_context(|| format!("No software found for cluster {}", cluster))?;
        clview = ClusterView::from([(cluster.clone(), packages)]);
    }

    let formatter = OutputFormatter::new(args.format.into());
    print!("{}", formatter.format_view(&clview)?);
    Ok(())
}

pub fn handle_clusters(args: &ClustersArgs) -> i32 {
    exit_code(run_clusters(args), "Listing clusters")
}

fn run_clusters(args: &ClustersArgs) -> Result<()> {
    let config = load_config()?;
    let input = modulemap_input(&args.input, &config);
    let (clusters, _) = read_modulemap(&input)?;

    let formatter = OutputFormatter::new(args.format.into());
    print!("{}", formatter.format_clusters(&clusters)?);
    Ok(())
}
