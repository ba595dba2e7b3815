use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mdnovel::catalog::CatalogRules;
use mdnovel::config::Config;
use mdnovel::reader::{Library, ReadingSession};
use mdnovel::source::Source;
use mdnovel::state::AppState;
use mdnovel::stats;

#[derive(Parser)]
#[command(name = "mdnovel", version, about = "Markdown novel reader server")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Print the ordered chapter catalog and exit
    #[arg(long)]
    catalog: bool,

    /// Print a word-count report and exit
    #[arg(long)]
    stats: bool,

    /// Word-count threshold for --stats (default: reader.low_word_threshold)
    #[arg(long, requires = "stats")]
    threshold: Option<usize>,

    /// Only report chapters whose folder contains this text
    #[arg(long, requires = "stats")]
    folder: Option<String>,

    /// Render a chapter, and the ones following it, to stdout and exit
    #[arg(long, value_name = "PATH")]
    read: Option<String>,

    /// Number of chapters to render with --read
    #[arg(long, default_value_t = 1, requires = "read")]
    count: usize,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Error loading config: {e}");
        std::process::exit(1);
    });

    // Setup tracing/logging
    let filter =
        EnvFilter::try_new(&config.server.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let source = Source::from_config(&config.source).unwrap_or_else(|e| {
        tracing::error!("Failed to set up source: {e}");
        std::process::exit(1);
    });
    tracing::info!("Source: {}", source.describe());

    let rules = CatalogRules::from(&config.catalog);
    let library = Library::load(source, rules).await.unwrap_or_else(|e| {
        tracing::error!("Failed to load catalog: {e}");
        std::process::exit(1);
    });

    if cli.catalog {
        print_catalog(&library).await;
        return;
    }

    if cli.stats {
        let threshold = cli.threshold.unwrap_or(config.reader.low_word_threshold);
        let report = stats::collect_stats(
            &library,
            threshold,
            cli.folder.as_deref(),
            config.reader.prefetch_concurrency,
        )
        .await;
        print!("{}", report.render_table());
        return;
    }

    if let Some(ref path) = cli.read {
        if let Err(e) = read_chapters(&library, path, cli.count).await {
            tracing::error!("{e}");
            std::process::exit(1);
        }
        return;
    }

    // Server mode
    if config.reader.prefetch_titles {
        library
            .prefetch_titles(config.reader.prefetch_concurrency)
            .await;
    }

    let addr = SocketAddr::new(
        config.server.host.parse().unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid host '{}', falling back to 0.0.0.0",
                config.server.host
            );
            std::net::Ipv4Addr::UNSPECIFIED.into()
        }),
        config.server.port,
    );

    tracing::info!("mdnovel v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Listening on {addr}");

    let state = AppState::new(config, library);
    let app = mdnovel::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind to {addr}: {e}");
            std::process::exit(1);
        });

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    });
}

async fn print_catalog(library: &Library<Source>) {
    let catalog = library.catalog().await;
    for group in catalog.groups("") {
        println!("{}", group.folder);
        for entry in group.entries {
            println!("  {}\t{}", entry.title, entry.path);
        }
    }
    println!("{} chapters", catalog.len());
}

/// Render `path` and up to `count - 1` following chapters, appending
/// them the way a scrolling reader would.
async fn read_chapters(
    library: &Library<Source>,
    path: &str,
    count: usize,
) -> Result<(), mdnovel::reader::ReaderError> {
    let (index, total) = {
        let catalog = library.catalog().await;
        let index = catalog
            .position(path)
            .ok_or_else(|| mdnovel::reader::ReaderError::NotInCatalog(path.to_string()))?;
        (index, catalog.len())
    };

    let mut session = ReadingSession::new();
    let ticket = session.open(index);
    let chapter = library.load_chapter(path).await?;
    if session.complete_open(ticket) {
        println!("<!-- {} -->\n{}", chapter.title, chapter.html);
    }

    while session.loaded().len() < count {
        let Some((ticket, next)) = session.begin_append(total) else {
            break;
        };
        let Some(next_path) = library.path_at(next).await else {
            session.abort_append(ticket);
            break;
        };
        match library.load_chapter(&next_path).await {
            Ok(chapter) => {
                if session.finish_append(ticket, next) {
                    println!("<!-- {} -->\n{}", chapter.title, chapter.html);
                }
            }
            Err(e) => {
                session.abort_append(ticket);
                tracing::warn!("Stopped after {} chapters: {e}", session.loaded().len());
                break;
            }
        }
    }
    Ok(())
}
