use std::error::Error;
use std::path::PathBuf;

use atty::Stream;
use clap::{Parser, Subcommand};
use reo_rs::markup::{to_markdown, to_plain};
use reo_rs::query::normalize_selection;
use reo_rs::{CommandBackend, Palette, ReoConfig, Resolution, Resolver, ResultKind, Session};
use serde_json::json;
use termimad::{FmtText, MadSkin, terminal_size};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "reo-rs",
    about = "Define words with WordNet, eSpeak and your own custom definitions",
    version
)]
pub struct Cli {
    /// Emit JSON instead of rendered text.
    #[arg(long, global = true)]
    json: bool,

    /// Use the dark theme's colors.
    #[arg(long, global = true)]
    dark: bool,

    /// Give up on each external lookup after this many milliseconds.
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Directory of custom definitions, one file per term.
    #[arg(long, global = true)]
    custom_dir: Option<PathBuf>,

    /// Directory holding the `wn3.0` / `wn3.1` word lists.
    #[arg(long, global = true)]
    word_list_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Define one or more words or phrases.
    Define {
        /// Words or phrases to look up.
        #[arg(required = true)]
        queries: Vec<String>,
    },
    /// Define a random WordNet headword.
    Random,
    /// Serve definitions over HTTP.
    #[cfg(feature = "web")]
    Serve {
        /// Address to bind [default: 127.0.0.1:8080].
        #[arg(long)]
        addr: Option<std::net::SocketAddr>,
        /// Answer cross-origin requests from any site.
        #[arg(long)]
        cors: bool,
    },
}

impl Cli {
    fn config(&self) -> ReoConfig {
        let mut config = ReoConfig::from_env();
        if let Some(ms) = self.timeout_ms {
            config.timeout_ms = ms.max(1);
        }
        if let Some(dir) = &self.custom_dir {
            config.custom_dir = dir.clone();
        }
        if let Some(dir) = &self.word_list_dir {
            config.word_list_dir = dir.clone();
        }
        config
    }

    fn palette(&self) -> Palette {
        if self.dark {
            Palette::dark()
        } else {
            Palette::light()
        }
    }
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.command);
    let config = cli.config();
    let palette = cli.palette();
    let resolver = Resolver::new(CommandBackend::from_config(&config), &config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async move {
        match cli.command {
            Command::Define { queries } => {
                handle_define(&resolver, queries, &palette, cli.json).await
            }
            Command::Random => handle_random(&resolver, &palette, cli.json).await,
            #[cfg(feature = "web")]
            Command::Serve { addr, cors } => {
                let defaults = reo_rs::web::WebConfig::default();
                let web_config = reo_rs::web::WebConfig {
                    addr: addr.unwrap_or(defaults.addr),
                    cors,
                };
                reo_rs::web::serve(web_config, resolver).await?;
                Ok(())
            }
        }
    })
}

fn init_tracing(command: &Command) {
    let default = match command {
        #[cfg(feature = "web")]
        Command::Serve { .. } => "info",
        _ => "warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn handle_define(
    resolver: &Resolver<CommandBackend>,
    queries: Vec<String>,
    palette: &Palette,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let mut session = Session::new();
    let mut results = Vec::with_capacity(queries.len());
    for query in queries {
        let query = normalize_selection(&query);
        let resolution = session.resolve(resolver, &query, palette).await;
        if resolution.kind == ResultKind::Exit {
            break;
        }
        results.push((query, resolution));
    }

    if as_json {
        let payload: Vec<_> = results
            .iter()
            .map(|(query, resolution)| json!({ "query": query, "resolution": resolution }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for (index, (_, resolution)) in results.iter().enumerate() {
            if index > 0 {
                println!();
            }
            print_resolution(resolution);
        }
    }

    let rejected = results.iter().filter(|(_, r)| is_rejected(r)).count();
    if !session.has_searched() && rejected == results.len() && rejected > 0 {
        return Err("nothing to look up".into());
    }
    Ok(())
}

async fn handle_random(
    resolver: &Resolver<CommandBackend>,
    palette: &Palette,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let word = resolver.random_word().await?;
    let resolution = resolver.resolve(&word, palette).await;
    if as_json {
        let payload = json!({ "word": word, "resolution": resolution });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_resolution(&resolution);
    }
    Ok(())
}

fn is_rejected(resolution: &Resolution) -> bool {
    matches!(
        resolution.kind,
        ResultKind::EmptyInput | ResultKind::InvalidInput
    )
}

fn print_resolution(resolution: &Resolution) {
    if is_rejected(resolution) {
        eprintln!("{}", resolution.text);
        return;
    }
    if resolution.monospace || !stdout_is_tty() {
        println!("{}", to_plain(&resolution.text));
        return;
    }
    let skin = markdown_skin();
    let markdown = to_markdown(&resolution.text);
    let formatted = FmtText::from(&skin, &markdown, Some(markdown_width()));
    println!("{formatted}");
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}

fn markdown_width() -> usize {
    let (width, _) = terminal_size();
    width.max(60) as usize
}

fn markdown_skin() -> MadSkin {
    MadSkin::default()
}
