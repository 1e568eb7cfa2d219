use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use sharefeed_conductor::WsTransport;
use sharefeed_manager::{ConnectionStatus, StorageManager};
use sharefeed_server::SharefeedServer;
use sharefeed_service::{draft_for, share_notification, CaptureContext, PageMetadata, ShareContext};
use sharefeed_store::{DemoShareStore, FeedWatcher, JsonFileStore, ShareStore};
use sharefeed_types::{ConnectionSettings, ConnectionSettingsUpdate, RetrievalOptions, ShareRecord};
use tracing::debug;

use crate::cli::*;
use crate::config::SharefeedConfig;

/// Run the parsed command against the configured storage.
pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = SharefeedConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let out = Output { format: cli.format };
    let ctx = build_context(&config)?;

    match cli.command {
        Command::Share(args) => cmd_share(&ctx, &out, args).await,
        Command::List(args) => cmd_list(&ctx, &out, args).await,
        Command::Show(args) => cmd_show(&ctx, &out, args).await,
        Command::Delete(args) => {
            ctx.manager().delete_share(&args.id).await?;
            out.done(&format!("Deleted {}", args.id.yellow()));
            Ok(())
        }
        Command::Status => {
            let status = ctx.connection_status().await?;
            out.status(&status);
            Ok(())
        }
        Command::Mode(args) => match args.mode {
            Some(mode) => {
                ctx.manager().set_mode(mode).await?;
                out.done(&format!("Storage mode set to {}", mode.to_string().cyan()));
                Ok(())
            }
            None => {
                let mode = ctx.manager().settings().mode().await?;
                out.value(&mode, || println!("{}", mode.to_string().cyan()));
                Ok(())
            }
        },
        Command::Reset => {
            ctx.manager().reset_connection();
            out.done("Remote availability will be checked again on the next operation");
            Ok(())
        }
        Command::Settings(args) => cmd_settings(&ctx, &out, args).await,
        Command::Serve(args) => {
            let mut server_config = config.server.clone();
            if let Some(bind) = args.bind {
                server_config.bind_addr = bind;
            }
            println!(
                "ShareFeed server on {} (data: {})",
                server_config.bind_addr.to_string().bold(),
                config.data_dir.display()
            );
            SharefeedServer::new(server_config, ctx).serve().await?;
            Ok(())
        }
    }
}

fn build_context(config: &SharefeedConfig) -> anyhow::Result<ShareContext> {
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating data dir {}", config.data_dir.display()))?;
    let kv = Arc::new(JsonFileStore::in_dir(&config.data_dir));
    debug!(path = %kv.path().display(), "using local store");
    let transport = Arc::new(WsTransport::new().with_host(config.remote.host.clone()));
    let manager = StorageManager::new(kv, transport)
        .with_check_interval(config.check_interval_ms)
        .with_default_settings(config.remote.settings());
    Ok(ShareContext::new(Arc::new(manager))
        .with_status_timeout(Duration::from_millis(config.status_timeout_ms)))
}

async fn cmd_share(ctx: &ShareContext, out: &Output, args: ShareArgs) -> anyhow::Result<()> {
    let page = PageMetadata {
        url: args.url,
        title: args.title.unwrap_or_default(),
        description: args.description,
        favicon: args.favicon,
        og_image: None,
        selection: None,
    };
    let context = if let Some(link) = args.link {
        CaptureContext::Link { link_url: Some(link) }
    } else if let Some(src) = args.image {
        CaptureContext::Image { src_url: Some(src) }
    } else if let Some(text) = args.selection {
        CaptureContext::Selection { text: Some(text) }
    } else {
        CaptureContext::Page
    };

    let mut draft = draft_for(&context, &page)?;
    draft.feed_id = args.feed;
    draft.tags = args.tags;
    let record = ctx.manager().share(draft).await?;

    out.value(&record, || {
        let (title, body) = share_notification(&record);
        println!("{} {}: {}", "✓".green().bold(), title, body);
        println!("  Id: {}", record.id.yellow());
    });
    Ok(())
}

async fn cmd_list(ctx: &ShareContext, out: &Output, args: ListArgs) -> anyhow::Result<()> {
    let mut options = RetrievalOptions::all().limit(args.limit);
    if let Some(feed) = args.feed {
        options = options.feed(feed);
    }
    if let Some(after) = args.after {
        options = options.after(after);
    }

    let store: Arc<dyn ShareStore> = if args.demo {
        Arc::new(DemoShareStore::new())
    } else {
        ctx.manager().active_store().await?
    };

    if !args.watch {
        let records = store.get_shares(&options).await?;
        out.records(&records);
        return Ok(());
    }

    let (_watcher, mut updates) =
        FeedWatcher::spawn(store, options, Duration::from_secs(args.interval.max(1)));
    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(records) => out.records(&records),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => return Ok(()),
            },
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}

async fn cmd_show(ctx: &ShareContext, out: &Output, args: ShowArgs) -> anyhow::Result<()> {
    match ctx.manager().get_share(&args.id).await? {
        Some(record) => {
            out.value(&record, || print_record(&record, true));
            Ok(())
        }
        None => anyhow::bail!("share {} not found", args.id),
    }
}

async fn cmd_settings(ctx: &ShareContext, out: &Output, args: SettingsArgs) -> anyhow::Result<()> {
    let update = ConnectionSettingsUpdate {
        admin_port: args.admin_port,
        app_port: args.app_port,
        enabled: args.enabled(),
    };
    if !update.is_empty() {
        ctx.manager().update_connection_settings(&update).await?;
    }
    let settings = ctx.manager().settings().connection_settings().await?;
    out.value(&settings, || print_settings(&settings));
    Ok(())
}

struct Output {
    format: OutputFormat,
}

impl Output {
    /// JSON when asked for, otherwise whatever `text` prints.
    fn value<T: Serialize>(&self, value: &T, text: impl FnOnce()) {
        match self.format {
            OutputFormat::Json => match serde_json::to_string_pretty(value) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("{} {e}", "error:".red()),
            },
            OutputFormat::Text => text(),
        }
    }

    fn done(&self, message: &str) {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::json!({ "ok": true })),
            OutputFormat::Text => println!("{} {}", "✓".green(), message),
        }
    }

    fn records(&self, records: &[ShareRecord]) {
        self.value(&records, || {
            if records.is_empty() {
                println!("No shares.");
            }
            for record in records {
                print_record(record, false);
            }
        });
    }

    fn status(&self, status: &ConnectionStatus) {
        self.value(status, || {
            println!("Mode: {}", status.mode.to_string().cyan());
            let remote = if status.remote_available {
                "available".green()
            } else {
                "unavailable".red()
            };
            println!("Remote: {remote}");
            match status.active_backend {
                Some(backend) => println!("Active backend: {}", backend.to_string().bold()),
                None => println!("Active backend: {}", "none".red().bold()),
            }
        });
    }
}

fn print_record(record: &ShareRecord, detailed: bool) {
    println!(
        "{}  {}  {}",
        format_time(record.shared_at).dimmed(),
        record.id.yellow(),
        record.title.bold()
    );
    println!("  {}", record.url.blue());
    if !detailed {
        return;
    }
    println!("  Shared by: {}", record.shared_by);
    if let Some(feed) = &record.feed_id {
        println!("  Feed: {}", feed.cyan());
    }
    if !record.tags.is_empty() {
        println!("  Tags: {}", record.tags.join(", "));
    }
    if let Some(description) = &record.description {
        println!("  {description}");
    }
    if let Some(selection) = &record.selection {
        println!("  > {}", selection.italic());
    }
}

fn print_settings(settings: &ConnectionSettings) {
    let port = |p: u16| if p == 0 { "not set".dimmed().to_string() } else { p.to_string() };
    println!("Admin port: {}", port(settings.admin_port));
    println!("App port: {}", port(settings.app_port));
    let enabled = if settings.enabled { "yes".green() } else { "no".red() };
    println!("Enabled: {enabled}");
}

/// Millisecond timestamp as UTC wall time.
fn format_time(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ms.to_string())
}
