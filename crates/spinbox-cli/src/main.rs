mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, ComponentFlags, GenerateFlags};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "spinbox",
    about = "Scaffold development projects from components and profiles",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root for `add` and `status` (default: auto-detect from .spinbox/)
    #[arg(long, global = true, env = "SPINBOX_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// User configuration directory (default: ~/.spinbox)
    #[arg(long, global = true, env = "SPINBOX_HOME", value_name = "DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project from components or a profile
    Create {
        /// Directory to create the project in
        path: PathBuf,

        #[command(flatten)]
        components: ComponentFlags,

        /// Start from a named profile (see `spinbox profiles`)
        #[arg(long)]
        profile: Option<String>,

        /// Python requirements template (overrides the profile default)
        #[arg(long)]
        template: Option<String>,

        #[command(flatten)]
        generate: GenerateFlags,
    },

    /// Add components to an existing project
    Add {
        #[command(flatten)]
        components: ComponentFlags,

        /// Python requirements template to merge in
        #[arg(long)]
        template: Option<String>,

        #[command(flatten)]
        generate: GenerateFlags,
    },

    /// List profiles, or show one in detail
    Profiles {
        /// Profile name
        name: Option<String>,
    },

    /// Show the project record and detected toolchains
    Status,

    /// Read and change user-level defaults
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ctx = cmd::CliContext {
        root: root::resolve_root(cli.root.as_deref()),
        config_dir: cli.config_dir,
        json: cli.json,
    };

    let result = match cli.command {
        Commands::Create {
            path,
            components,
            profile,
            template,
            generate,
        } => cmd::create::run(&ctx, &path, &components, profile, template, &generate),
        Commands::Add {
            components,
            template,
            generate,
        } => cmd::add::run(&ctx, &components, template, &generate),
        Commands::Profiles { name } => cmd::profiles::run(&ctx, name.as_deref()),
        Commands::Status => cmd::status::run(&ctx),
        Commands::Config { subcommand } => cmd::config::run(&ctx, subcommand),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
