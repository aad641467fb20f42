use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use common::config::{LogFormat, LogSettings, Settings};
use std::process;
use tracing_subscriber::EnvFilter;

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match log.format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Plain => subscriber.init(),
    }
}

async fn setup(config_path: Option<&str>, verify_buckets: bool) -> anyhow::Result<()> {
    let mut settings = Settings::new(config_path)
        .with_context(|| format!("Failed to load settings from {:?}", config_path))?;
    if verify_buckets {
        settings.verify_buckets = true;
    }

    init_tracing(&settings.log);

    loader_setup::run_setup_wizard(&settings)
        .await
        .context("Setup failed")?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let matches = Command::new("Loader Setup")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Creates the configuration for the S3 to Vertica batch loader")
        .subcommand(
            Command::new("setup")
                .about("Interactively collect and store a loader configuration")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .value_name("FILE")
                        .help("Sets a custom settings file"),
                )
                .arg(
                    Arg::new("verify-buckets")
                        .long("verify-buckets")
                        .action(ArgAction::SetTrue)
                        .help("Check that the source and manifest buckets are reachable"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("setup", setup_matches)) => {
            let config_path = setup_matches.get_one::<String>("config").map(|s| s.as_str());
            let verify_buckets = setup_matches.get_flag("verify-buckets");

            if let Err(e) = setup(config_path, verify_buckets).await {
                // Rejected answers were already shown at the prompt.
                let rejected = e
                    .downcast_ref::<common::Error>()
                    .is_some_and(common::Error::is_validation);
                if !rejected {
                    eprintln!("Setup error: {:#}", e);
                }
                process::exit(1);
            }
        }
        _ => {
            eprintln!("No subcommand specified. Use --help for usage information.");
            process::exit(1);
        }
    }
}
