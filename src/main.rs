use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;
use weathersite::display::{self, LOADING, NO_DATA};
use weathersite::{
    RunOutcome, SearchSession, SuggestOutcome, WeatherSiteConfig, WeatherSiteError, logging,
};

/// Search a place by name and show its multi-day weather forecast
#[derive(Debug, Parser)]
#[command(name = "weathersite", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List place suggestions for a query
    Suggest { query: String },
    /// Search a place and print its forecast
    Forecast {
        query: String,
        /// Index of the suggestion to select
        #[arg(long, default_value_t = 0)]
        pick: usize,
        /// Print the forecast bundle as JSON
        #[arg(long)]
        json: bool,
    },
    /// Type queries and pick suggestions interactively
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = WeatherSiteConfig::load_from_path(cli.config.clone())?;
    logging::init(&config.logging, cli.verbose)?;
    debug!("Using config: {:?}", cli.config);

    let session = weathersite::session_from_config(&config)?;
    let icon_base_url = config.display.icon_base_url.as_str();

    match cli.command {
        Command::Suggest { query } => suggest(&session, &query).await,
        Command::Forecast { query, pick, json } => {
            forecast(&session, &query, pick, json, icon_base_url).await
        }
        Command::Interactive => interactive(&session, icon_base_url).await,
    }
}

async fn suggest(session: &SearchSession, query: &str) -> Result<()> {
    lookup(session, query).await?;

    let suggestions = session.suggestions();
    if suggestions.is_empty() {
        println!("No places found for '{query}'");
    } else {
        print!("{}", display::render_suggestions(&suggestions));
    }
    Ok(())
}

async fn forecast(
    session: &SearchSession,
    query: &str,
    pick: usize,
    json: bool,
    icon_base_url: &str,
) -> Result<()> {
    lookup(session, query).await?;

    let suggestions = session.suggestions();
    let Some(suggestion) = suggestions.get(pick) else {
        bail!(
            WeatherSiteError::validation(format!(
                "No suggestion #{pick} for '{query}' ({} found)",
                suggestions.len()
            ))
            .user_message()
        );
    };

    if let RunOutcome::Failed { stage, error, .. } = session.select(suggestion).await {
        debug!("{stage} failed: {error}");
        bail!(error.user_message());
    }

    let Some(bundle) = session.bundle() else {
        println!("{NO_DATA}");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
    } else {
        println!("{}", suggestion.description);
        print!("{}", display::render_bundle(&bundle, icon_base_url, None));
    }
    Ok(())
}

/// Run the suggestion stage, turning its failures into errors
async fn lookup(session: &SearchSession, query: &str) -> Result<()> {
    match session.on_input(query).await {
        SuggestOutcome::Failed(error) => bail!(error.user_message()),
        SuggestOutcome::Cleared => bail!(WeatherSiteError::EmptyInput.user_message()),
        _ => Ok(()),
    }
}

const HELP: &str = "Type a place to search, a number to pick a suggestion.
Commands: :clear  :day N  :help  :quit";

async fn interactive(session: &SearchSession, icon_base_url: &str) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut expanded: Option<usize> = None;

    println!("{HELP}");
    println!("{NO_DATA}");

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim_end_matches(['\r', '\n']);

        match line.trim() {
            ":quit" | ":q" => break,
            ":help" => println!("{HELP}"),
            ":clear" => {
                session.clear();
                println!("(cleared)");
            }
            command if command.starts_with(":day") => {
                let index = command.trim_start_matches(":day").trim().parse::<usize>().ok();
                expanded = if index == expanded { None } else { index };
                print_bundle(session, icon_base_url, expanded);
            }
            text => {
                let suggestions = session.suggestions();
                if let Some(suggestion) = text.parse::<usize>().ok().and_then(|i| suggestions.get(i)) {
                    expanded = None;
                    if let RunOutcome::Failed { error, .. } = session.select(suggestion).await {
                        eprintln!("{}", error.user_message());
                    }
                    print_bundle(session, icon_base_url, expanded);
                    continue;
                }

                if !line.is_empty() {
                    println!("{LOADING}");
                }
                match session.on_input(line).await {
                    SuggestOutcome::Failed(error) => eprintln!("{}", error.user_message()),
                    SuggestOutcome::Cleared => println!("(cleared)"),
                    _ => print!("{}", display::render_suggestions(&session.suggestions())),
                }
            }
        }
    }
    Ok(())
}

fn print_bundle(session: &SearchSession, icon_base_url: &str, expanded: Option<usize>) {
    match session.bundle() {
        Some(bundle) => print!("{}", display::render_bundle(&bundle, icon_base_url, expanded)),
        None => println!("{NO_DATA}"),
    }
}
