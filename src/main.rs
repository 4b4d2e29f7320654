use std::error::Error;
use std::fs::File;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use folio::EntityKind;
use folio::browser::input::{Command, HELP, parse_command};
use folio::browser::render::{self, DEFAULT_WIDTH};
use folio::browser::Browser;
use folio::catalog::{CatalogSource, OpenLibrary, SortKey};
use folio::core::Action;
use folio::core::config::{self, CliOverrides, ResolvedConfig};
use folio::core::state::Status;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "folio", about = "Search and browse the Open Library catalog")]
struct Args {
    /// Catalog base URL (overrides config and FOLIO_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Quiescence window before a search is sent, in milliseconds
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Run one search and print the collected pages
    Search {
        #[arg(value_enum)]
        kind: EntityKind,
        query: String,
        #[arg(short, long, value_enum)]
        sort: Option<SortKey>,
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// Interactive search session on stdin
    Browse {
        #[arg(value_enum)]
        kind: EntityKind,
    },
    /// Show the detail view for a key
    Show {
        #[arg(value_enum)]
        kind: EntityKind,
        key: String,
    },
}

impl CliCommand {
    fn kind(&self) -> EntityKind {
        match self {
            CliCommand::Search { kind, .. }
            | CliCommand::Browse { kind }
            | CliCommand::Show { kind, .. } => *kind,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - stdout is reserved for results
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let level = if args.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Debug
    };
    if let Ok(log_file) = File::create("folio.log") {
        let _ = WriteLogger::init(level, log_config, log_file);
    }

    let file_config = config::load_config()?;
    let overrides = CliOverrides {
        base_url: args.base_url.clone(),
        debounce_ms: args.debounce_ms,
    };
    let config = config::resolve(&file_config, &overrides);
    log::info!("Folio starting up against {}", config.base_url);

    let kind = args.command.kind();
    if !config.permits(kind) {
        eprintln!("Access to {kind} is not permitted for this account.");
        std::process::exit(2);
    }

    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;
    let catalog = Arc::new(OpenLibrary::with_client(Some(config.base_url.clone()), client));

    match args.command {
        CliCommand::Search {
            kind,
            query,
            sort,
            pages,
        } => search(&config, catalog, kind, &query, sort, pages).await,
        CliCommand::Browse { kind } => browse(&config, catalog, kind).await?,
        CliCommand::Show { kind, key } => show(&config, &catalog, kind, &key).await,
    }
    Ok(())
}

fn new_browser(
    config: &ResolvedConfig,
    catalog: Arc<OpenLibrary>,
    kind: EntityKind,
    sort: Option<SortKey>,
) -> Browser {
    let source: Arc<dyn CatalogSource> = catalog;
    Browser::new(
        kind,
        config.engine_settings(kind),
        sort.unwrap_or_else(|| config.default_sort(kind)),
        source,
    )
}

fn print_listing(browser: &Browser) {
    for line in render::list_lines(browser.session(), DEFAULT_WIDTH) {
        println!("{line}");
    }
    println!("{}", render::status_line(browser.session()));
}

async fn search(
    config: &ResolvedConfig,
    catalog: Arc<OpenLibrary>,
    kind: EntityKind,
    query: &str,
    sort: Option<SortKey>,
    pages: u32,
) {
    let mut browser = new_browser(config, catalog, kind, sort);
    browser.dispatch(Action::SetQuery(query.to_string()));
    browser.settle().await;

    while browser.session().accepted_page < pages && browser.session().status == Status::Idle {
        let before = browser.session().page;
        browser.scroll_to_end();
        if browser.session().page == before {
            break;
        }
        browser.settle().await;
    }
    print_listing(&browser);
}

async fn browse(
    config: &ResolvedConfig,
    catalog: Arc<OpenLibrary>,
    kind: EntityKind,
) -> std::io::Result<()> {
    let mut browser = new_browser(config, Arc::clone(&catalog), kind, None);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Searching {kind}. :help for commands.");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Command::Query(text) => {
                        browser.dispatch(Action::SetQuery(text));
                        if !browser.is_busy() {
                            print_listing(&browser);
                        }
                    }
                    Command::Sort(sort) => {
                        browser.dispatch(Action::SetSort(sort));
                    }
                    Command::More => {
                        browser.scroll_to_end();
                        if !browser.is_busy() {
                            println!("{}", render::status_line(browser.session()));
                        }
                    }
                    Command::Retry => {
                        browser.dispatch(Action::Retry);
                    }
                    Command::Open(row) => {
                        match browser.dispatch(Action::Select(row - 1)) {
                            Some(key) => show(config, &catalog, kind, &key).await,
                            None => println!("No row {row}."),
                        }
                    }
                    Command::Help => println!("{HELP}"),
                    Command::Quit => break,
                    Command::Invalid(message) => println!("{message}"),
                }
            }
            Some(action) = browser.next_action() => {
                let settles = matches!(action, Action::PageLoaded(_) | Action::PageFailed { .. });
                browser.dispatch(action);
                if settles && !browser.is_busy() {
                    print_listing(&browser);
                }
            }
        }
    }
    Ok(())
}

async fn show(config: &ResolvedConfig, catalog: &OpenLibrary, kind: EntityKind, key: &str) {
    let text = match kind {
        EntityKind::Books => catalog
            .book_details(key)
            .await
            .map(|details| render::book_details(&details, &config.covers_url, DEFAULT_WIDTH)),
        EntityKind::Authors => catalog
            .author_details(key)
            .await
            .map(|details| render::author_details(&details, &config.covers_url, DEFAULT_WIDTH)),
    };
    match text {
        Ok(text) => println!("{text}"),
        Err(e) => {
            log::warn!("Details for {} failed: {}", key, e);
            println!("Unable to load {key}: {e}");
        }
    }
}
