use clap::{ArgAction, Parser, Subcommand};
use commands::{catalog, config, manifest, registrations, serve};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "addonmux")]
#[command(about = "AddonMux - All of your catalog addons combined into one")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the addon server
    #[command(long_about = "Serve every user's combined manifest and proxy their catalog requests to the registered upstream addons. Runs until Ctrl-C.")]
    Serve {
        /// Listen address, overrides server.bind from the config file
        #[arg(long, value_name = "HOST:PORT")]
        bind: Option<String>,

        /// Also write logs to the daily-rotated log file
        #[arg(long, action = ArgAction::SetTrue)]
        log_file: bool,
    },
    /// Print a user's combined manifest exactly as served
    Manifest {
        user_id: String,
    },
    /// Resolve a composite catalog id and print the proxied items
    Catalog {
        user_id: String,

        /// Content type, e.g. movie or series
        content_type: String,

        /// Composite catalog id from the combined manifest
        composite_id: String,

        /// Extra arguments forwarded upstream, e.g. 'genre=Action&skip=100'
        #[arg(long)]
        extra: Option<String>,
    },
    /// Manage a user's catalog registrations
    Registrations {
        #[command(subcommand)]
        cmd: RegistrationCommands,
    },
    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub(crate) enum RegistrationCommands {
    /// Register an upstream addon by its manifest URL
    #[command(long_about = "Fetch the addon's manifest.json and register it for the user. The display name defaults to the addon's own name and the registration is placed after all existing ones.")]
    Add {
        user_id: String,

        /// Manifest URL of the upstream addon
        manifest_url: String,

        /// Display name shown on the addon's catalogs
        #[arg(long)]
        name: Option<String>,

        /// Shuffle this addon's catalog items and genres
        #[arg(long, action = ArgAction::SetTrue)]
        randomize: bool,

        /// Register without taking part in the combined manifest
        #[arg(long, action = ArgAction::SetTrue)]
        inactive: bool,
    },
    /// List a user's registrations
    List {
        user_id: String,
    },
    /// Remove a registration
    Remove {
        user_id: String,
        addon_id: String,
    },
    /// Mark a registration active
    Enable {
        user_id: String,
        addon_id: String,
    },
    /// Mark a registration inactive
    Disable {
        user_id: String,
        addon_id: String,
    },
    /// Toggle shuffling of a registration's items and genres
    Randomize {
        user_id: String,
        addon_id: String,

        /// Turn shuffling off instead of on
        #[arg(long, action = ArgAction::SetTrue)]
        off: bool,
    },
    /// Change a registration's position
    Reorder {
        user_id: String,
        addon_id: String,
        #[arg(allow_negative_numbers = true)]
        order: i64,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Only the server writes a log file
    let log_path = match &cli.command {
        Commands::Serve { log_file: true, .. } => Some(commands::paths().server_log_file()),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_path)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Serve { bind, .. } => serve::run_serve(bind, &output).await,
        Commands::Manifest { user_id } => manifest::run_manifest(&user_id, &output).await,
        Commands::Catalog {
            user_id,
            content_type,
            composite_id,
            extra,
        } => catalog::run_catalog(&user_id, &content_type, &composite_id, extra.as_deref(), &output).await,
        Commands::Registrations { cmd } => registrations::run_registrations(cmd, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output),
    }
}
