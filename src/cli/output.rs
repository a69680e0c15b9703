//! Output formatting for multiple formats
//!
//! JSON, YAML and human-readable text for the results of the `modmap`
//! subcommands.
//!
//! # Example
//!
//! ```ignore
//! use modmap::cli::output::{OutputFormat, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(OutputFormat::Human);
//! println!("{}", formatter.format_view(&clview)?);
//! ```

use anyhow::{Context, Result};
use serde::Serialize;

use crate::clusters::{ClusterMap, ClusterModule};
use crate::convert::ConversionStats;
use crate::software::ClusterView;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the per-cluster software listing
    pub fn format_view(&self, clview: &ClusterView) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.serialize_json(clview, "cluster view"),
            OutputFormat::Yaml => self.serialize_yaml(clview, "cluster view"),
            OutputFormat::Human => Ok(self.format_view_human(clview)),
        }
    }

    /// Formats the cluster identity -> cluster module map
    pub fn format_clusters(&self, clusters: &ClusterMap) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.serialize_json(clusters, "cluster map"),
            OutputFormat::Yaml => self.serialize_yaml(clusters, "cluster map"),
            OutputFormat::Human => Ok(self.format_clusters_human(clusters)),
        }
    }

    /// Formats the summary of a conversion
    pub fn format_stats(&self, stats: &ConversionStats) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.serialize_json(stats, "conversion stats"),
            OutputFormat::Yaml => self.serialize_yaml(stats, "conversion stats"),
            OutputFormat::Human => Ok(self.format_stats_human(stats)),
        }
    }

    fn serialize_json<T: Serialize + ?Sized>(&self, value: &T, what: &str) -> Result<String> {
        serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize {} to JSON", what))
    }

    fn serialize_yaml<T: Serialize + ?Sized>(&self, value: &T, what: &str) -> Result<String> {
        serde_yaml::to_string(value).with_context(|| format!("Failed to serialize {} to YAML", what))
    }

    // Human-readable formatting methods

    fn format_view_human(&self, clview: &ClusterView) -> String {
        let mut output = String::new();

        for (cluster, packages) in clview {
            output.push_str(&format!("Cluster {}\n", cluster));
            output.push_str(RULE);
            output.push_str("\n\n");

            let width = packages.keys().map(|n| n.len()).max().unwrap_or(0);
            for (name, versions) in packages {
                output.push_str(&format!(
                    "  {:<width$}  {}\n",
                    name,
                    versions.join(", "),
                    width = width
                ));
            }
            output.push('\n');
        }

        if output.is_empty() {
            output.push_str("No software found\n");
        }
        output
    }

    fn format_clusters_human(&self, clusters: &ClusterMap) -> String {
        let mut output = String::new();

        output.push_str("Clusters\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        let width = clusters.keys().map(|c| c.len()).max().unwrap_or(0);
        for (cluster, module) in clusters {
            let hidden = ClusterModule::parse(module).map_or(false, |m| m.hidden);
            output.push_str(&format!(
                "  {:<width$}  {}{}\n",
                cluster,
                module,
                if hidden { " (hidden)" } else { "" },
                width = width
            ));
        }

        output.push_str(&format!("\n{} clusters\n", clusters.len()));
        output
    }

    fn format_stats_human(&self, stats: &ConversionStats) -> String {
        let mut output = String::new();

        output.push_str("\u{2713} Modulemap written\n");
        output.push_str(RULE);
        output.push_str("\n\n");
        output.push_str(&format!("Clusters:  {}\n", stats.clusters));
        output.push_str(&format!("Packages:  {}\n", stats.packages));
        output.push_str(&format!("Modules:   {}\n", stats.total_modules));
        output
    }
}
