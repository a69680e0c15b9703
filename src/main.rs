use modmap::cli::commands::{CliArgs, Commands};
use modmap::cli::handlers::{handle_clusters, handle_convert, handle_view};
use modmap::util::{init_logging, parse_level, LoggingConfig};
use modmap::VERSION;

use clap::Parser;
use tracing::{debug, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging(logging_config_from_args(&args));

    debug!("modmap v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Convert(convert_args) => handle_convert(convert_args, args.quiet),
        Commands::View(view_args) => handle_view(view_args),
        Commands::Clusters(clusters_args) => handle_clusters(clusters_args),
    };

    std::process::exit(exit_code);
}

fn logging_config_from_args(args: &CliArgs) -> LoggingConfig {
    let mut config = LoggingConfig::from_env();
    if let Some(level_str) = &args.log_level {
        config.level = parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }
    config
}
