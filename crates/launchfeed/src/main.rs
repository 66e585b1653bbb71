//! `launchfeed` - CLI for the launch listing
//!
//! Loads launches page by page and prints them, renders the HTML listing, or
//! lets you scroll through them from the terminal.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use launchfeed::cli::{Cli, Command, ConfigCommand, ListCommand, OutputFormat, RenderCommand};
use launchfeed::feed::{FeedOptions, LoaderState};
use launchfeed::loader::{initial_load, load_pages, PageView};
use launchfeed::render::{render_card_text, render_error_page, render_index, render_table};
use launchfeed::scroll::ScrollMetrics;
use launchfeed::source::{HttpLaunchSource, LaunchSource};
use launchfeed::{init_logging, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // `config` loads the file itself so `validate` can report a broken one
    let config_path = cli.config;
    match cli.command {
        Command::List(list_cmd) => handle_list(&Config::load_from(config_path)?, &list_cmd).await,
        Command::Render(render_cmd) => {
            handle_render(&Config::load_from(config_path)?, &render_cmd).await
        }
        Command::ErrorPage(page_cmd) => write_output(page_cmd.output, &render_error_page()),
        Command::Browse => handle_browse(&Config::load_from(config_path)?).await,
        Command::Config(config_cmd) => handle_config(config_path, config_cmd),
    }
}

fn http_source(config: &Config) -> Arc<dyn LaunchSource> {
    Arc::new(HttpLaunchSource::from_config(config))
}

async fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let snapshot = load_pages(
        http_source(config),
        FeedOptions::from_config(config),
        f64::from(config.scroll.viewport_height),
        cmd.pages,
    )
    .await
    .context("failed to load launches")?;

    match cmd.format {
        OutputFormat::Table => print!("{}", render_table(&snapshot.launches)),
        OutputFormat::Plain => {
            for launch in &snapshot.launches {
                println!("{}", render_card_text(launch));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot.launches)?),
    }
    info!(
        launches = snapshot.launches.len(),
        next_page = snapshot.cursor,
        state = %snapshot.state,
        "Listing complete"
    );
    Ok(())
}

async fn handle_render(config: &Config, cmd: &RenderCommand) -> anyhow::Result<()> {
    let loaded = load_pages(
        http_source(config),
        FeedOptions::from_config(config),
        f64::from(config.scroll.viewport_height),
        cmd.pages,
    )
    .await;

    match loaded {
        Ok(snapshot) => write_output(
            cmd.output.clone(),
            &render_index(&config.render.title, &snapshot.launches),
        ),
        Err(e) => {
            error!(error = %e, "Initial load failed, rendering error page");
            write_output(cmd.output.clone(), &render_error_page())?;
            Err(anyhow::Error::new(e).context("failed to load launches"))
        }
    }
}

async fn handle_browse(config: &Config) -> anyhow::Result<()> {
    let source = http_source(config);
    let options = FeedOptions::from_config(config);
    let viewport_height = f64::from(config.scroll.viewport_height);

    let initial = initial_load(source.as_ref(), options.page_size)
        .await
        .context("failed to load launches")?;
    println!("{}\n", config.render.title);
    for launch in &initial {
        println!("{}", render_card_text(launch));
    }

    let shown = initial.len();
    let view = PageView::mount(source, initial, options);
    if view.snapshot().state == LoaderState::Exhausted {
        println!("-- no more launches --");
    }
    let mut snapshots = view.subscribe();
    let printer = tokio::spawn(async move {
        let mut shown = shown;
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            for launch in snapshot.launches.iter().skip(shown) {
                println!("{}", render_card_text(launch));
            }
            shown = snapshot.launches.len();
            if snapshot.state == LoaderState::Exhausted {
                println!("-- no more launches --");
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().eq_ignore_ascii_case("q") {
            break;
        }
        view.scroll(ScrollMetrics::at_bottom(viewport_height)).await?;
    }

    let snapshot = view.teardown().await?;
    printer.await.context("printer task failed")?;
    info!(
        launches = snapshot.launches.len(),
        failures = snapshot.failures,
        "Browse session ended"
    );
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[API]");
                println!("  Endpoint:           {}", config.api.endpoint);
                println!("  Page size:          {}", config.api.page_size);
                println!("  Timeout (secs):     {}", config.api.timeout_secs);
                println!();
                println!("[Scroll]");
                println!("  Margin:             {}", config.scroll.margin);
                println!("  Viewport height:    {}", config.scroll.viewport_height);
                println!();
                println!("[Feed]");
                println!("  End of feed:        {}", config.feed.end_of_feed);
                println!("  Cursor policy:      {}", config.feed.cursor_policy);
                println!();
                println!("[Render]");
                println!("  Title:              {}", config.render.title);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path.clone()))
                .with_context(|| format!("invalid configuration in {}", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

fn write_output(path: Option<PathBuf>, content: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(&path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "Page written");
        }
        None => print!("{content}"),
    }
    Ok(())
}
