//! `igv` - inspect and resolve IGV widget sessions from the shell

mod commands;
mod endpoint;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use endpoint::{EndpointPresigner, DEFAULT_TEMPLATE};
use igv_session::WidgetConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let store_arg = Arg::new("store")
        .long("store")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("JSON file backing the session store");

    Command::new("igv")
        .version(igv_session::VERSION)
        .about("Resolve and inspect IGV widget sessions")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Widget settings (TOML)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("classify")
                .about("Print the canonical identifier of each URI")
                .arg(Arg::new("uri").required(true).num_args(1..).help("URIs to classify")),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve the protected URLs of a load configuration")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Load configuration (JSON)"),
                )
                .arg(
                    Arg::new("template")
                        .long("template")
                        .default_value(DEFAULT_TEMPLATE)
                        .help("Endpoint URL template with {bucket} and {key}"),
                ),
        )
        .subcommand(
            Command::new("session")
                .about("Inspect the persisted session")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Print the stored session").arg(store_arg.clone()))
                .subcommand(
                    Command::new("import")
                        .about("Store a load configuration as the session")
                        .arg(store_arg.clone())
                        .arg(
                            Arg::new("file")
                                .required(true)
                                .value_parser(value_parser!(PathBuf))
                                .help("Load configuration (JSON)"),
                        ),
                )
                .subcommand(Command::new("reset").about("Forget the stored session").arg(store_arg)),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn widget_config(matches: &ArgMatches) -> Result<WidgetConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => WidgetConfig::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(WidgetConfig::default()),
    }
}

fn store_path(args: &ArgMatches) -> Result<&PathBuf> {
    args.get_one::<PathBuf>("store").context("--store is required")
}

async fn run(matches: ArgMatches) -> Result<bool> {
    let settings = widget_config(&matches)?;

    match matches.subcommand() {
        Some(("classify", args)) => {
            let inputs = args.get_many::<String>("uri").into_iter().flatten();
            let (report, all_ok) = commands::classify_all(inputs.map(String::as_str));
            print!("{report}");
            Ok(all_ok)
        }
        Some(("resolve", args)) => {
            let file = args.get_one::<PathBuf>("file").context("missing configuration file")?;
            let template = args
                .get_one::<String>("template")
                .map_or(DEFAULT_TEMPLATE, String::as_str);
            let resolved = commands::resolve_file(file, EndpointPresigner::new(template)?).await?;
            println!("{}", serde_json::to_string_pretty(&resolved)?);
            Ok(true)
        }
        Some(("session", args)) => match args.subcommand() {
            Some(("show", args)) => {
                let store = commands::open_session(store_path(args)?, &settings);
                println!("{}", commands::show_session(&store)?);
                Ok(true)
            }
            Some(("import", args)) => {
                let store = commands::open_session(store_path(args)?, &settings);
                let file = args.get_one::<PathBuf>("file").context("missing configuration file")?;
                commands::import_session(&store, file)?;
                Ok(true)
            }
            Some(("reset", args)) => {
                let store = commands::open_session(store_path(args)?, &settings);
                commands::reset_session(&store)?;
                Ok(true)
            }
            _ => anyhow::bail!("unknown session command"),
        },
        _ => anyhow::bail!("unknown command"),
    }
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json-logs"));

    match run(matches).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
