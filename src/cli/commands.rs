use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Cluster and software maps derived from the Lmod spider cache
#[derive(Parser, Debug)]
#[command(
    name = "modmap",
    about = "Cluster and software maps derived from the Lmod spider cache",
    version,
    author,
    long_about = "modmap reads the JSON dump of the Lmod spider cache, works out which \
                  cluster each module path serves and writes a modulemap: the cluster \
                  modules plus every package version per cluster with its default."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Convert the spider cache dump into a modulemap",
        long_about = "Reads spiderT.json from the cache directory (MODMAP_CACHE_DIR) and \
                      writes modulemap.json next to it.\n\n\
                      Examples:\n  \
                      modmap convert\n  \
                      modmap convert --input spiderT.json --output modulemap.json\n  \
                      modmap convert --cluster-config /etc/modmap/clusters.yaml"
    )]
    Convert(ConvertArgs),

    #[command(
        about = "Show the software available per cluster",
        long_about = "Lists every package per cluster with its versions, the default \
                      version first.\n\n\
                      Examples:\n  \
                      modmap view\n  \
                      modmap view --cluster doduo\n  \
                      modmap view --format json"
    )]
    View(ViewArgs),

    #[command(about = "Show the cluster modules of a modulemap")]
    Clusters(ClustersArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ConvertArgs {
    #[arg(
        short = 'i',
        long,
        value_name = "FILE",
        help = "Spider cache dump (defaults to spiderT.json in the cache directory)"
    )]
    pub input: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Modulemap to write (defaults to modulemap.json in the cache directory)"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        short = 'c',
        long,
        value_name = "FILE",
        help = "YAML cluster configuration with extra module paths"
    )]
    pub cluster_config: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ViewArgs {
    #[arg(
        short = 'i',
        long,
        value_name = "FILE",
        help = "Modulemap to read (defaults to modulemap.json in the cache directory)"
    )]
    pub input: Option<PathBuf>,

    #[arg(long, value_name = "NAME", help = "Only show this cluster")]
    pub cluster: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ClustersArgs {
    #[arg(
        short = 'i',
        long,
        value_name = "FILE",
        help = "Modulemap to read (defaults to modulemap.json in the cache directory)"
    )]
    pub input: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
