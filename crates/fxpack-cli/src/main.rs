use clap::{Parser, Subcommand};
use fxpack::{
    commands::{build, check, init, release_check, render},
    logger, GlobalOpts,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "fxpack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Resource build pipeline",
    long_about = "fxpack patches package metadata, stamps the build, generates the resource manifest and bundles the sources."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full build: metadata, timestamp, manifest, bundle
    Build {
        /// Skip the bundle stage
        #[arg(long)]
        skip_bundle: bool,
    },
    /// Validate the build configuration and report every problem
    Check,
    /// Print the generated manifest without writing any file
    Render,
    /// Initialize a new build configuration file
    Init {
        /// Optional filename for the configuration (default: fxpack.toml)
        file: Option<String>,
        /// Overwrite an existing file without asking
        #[arg(short, long)]
        force: bool,
    },
    /// Check whether a newer release has been published
    ReleaseCheck(release_check::ReleaseCheckCommand),
}

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| logger::verbosity_to_filter().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level()) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing();

    let result = match cli.command {
        Commands::Build { skip_bundle } => build::handle_build(skip_bundle, &cli.global),
        Commands::Check => check::handle_check(&cli.global),
        Commands::Render => render::handle_render(&cli.global),
        Commands::Init { file, force } => init::handle_init(file, force, &cli.global),
        Commands::ReleaseCheck(cmd) => release_check::handle_release_check(cmd, &cli.global),
    };

    if let Err(e) = result {
        logger::error(&format!("{}", e));
        logger::show_log_path();
        std::process::exit(1);
    }
}
