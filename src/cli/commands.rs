//! Command handlers.

use super::{Cli, Commands};
use crate::app::ViewModel;
use crate::config::{Config, default_config_path};
use crate::notify::ConsoleNotifier;
use crate::whatsapp::{Backend, ConnectionMonitor, ConnectionState, HttpBackend, QrPayload};
use anyhow::{Context, Result};
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

/// Load config, set up logging and run the selected command.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    let command = cli.command.clone().unwrap_or(Commands::Interactive);

    if let Commands::InitConfig { force } = command {
        let path = cli.config.clone().unwrap_or_else(default_config_path);
        Config::write_default(&path, force)?;
        println!("Wrote {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = Config::load_from(cli.config.as_deref())?;
    config.apply_overrides(&cli)?;

    let _log_guard = crate::logging::init(&config.logging, cli.debug)?;
    tracing::debug!("Using backend at {}", config.backend.base_url);

    let backend: Arc<dyn Backend> = Arc::new(
        HttpBackend::new(&config.backend.base_url, config.request_timeout())
            .context("Failed to build HTTP client")?,
    );

    match command {
        Commands::Send { number, message } => send(backend, &config, number, message).await,
        Commands::Status => status(backend, &config).await,
        Commands::Qr { out } => qr(backend.as_ref(), out.as_deref()).await,
        Commands::Watch => watch(backend, &config).await,
        Commands::Interactive => interactive(backend, &config).await,
        Commands::InitConfig { .. } => Ok(ExitCode::SUCCESS),
    }
}

fn view_model(backend: Arc<dyn Backend>, config: &Config) -> ViewModel {
    ViewModel::new(backend, config.poll_interval(), Arc::new(ConsoleNotifier))
}

async fn send(
    backend: Arc<dyn Backend>,
    config: &Config,
    number: String,
    message: String,
) -> Result<ExitCode> {
    let vm = view_model(backend, config);
    vm.set_number(number);
    vm.set_message(message);

    match vm.submit().await {
        Some(result) if result.is_success() => Ok(ExitCode::SUCCESS),
        _ => Ok(ExitCode::FAILURE),
    }
}

async fn status(backend: Arc<dyn Backend>, config: &Config) -> Result<ExitCode> {
    let monitor = ConnectionMonitor::with_interval(backend, config.poll_interval());
    print_connection(&monitor.poll_once().await);
    Ok(ExitCode::SUCCESS)
}

async fn qr(backend: &dyn Backend, out: Option<&Path>) -> Result<ExitCode> {
    let reply = backend.qr().await.context("Failed to fetch QR code")?;
    let Some(raw) = reply.into_payload() else {
        eprintln!("No QR code available (the backend may already be connected)");
        return Ok(ExitCode::FAILURE);
    };

    let Some(path) = out else {
        println!("{raw}");
        return Ok(ExitCode::SUCCESS);
    };

    let payload = QrPayload::parse(&raw);
    let target = image_path(path, &payload);
    match payload {
        QrPayload::Image { mime, bytes } => {
            std::fs::write(&target, &bytes)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            println!("Wrote {} ({}, {} bytes)", target.display(), mime, bytes.len());
            Ok(ExitCode::SUCCESS)
        }
        QrPayload::Text(_) => {
            anyhow::bail!("QR payload is not an image data URL; run without --out to print it")
        }
    }
}

/// A directory gets `qr.<ext>` inside it; anything else is used as given.
fn image_path(out: &Path, payload: &QrPayload) -> PathBuf {
    match payload.extension() {
        Some(ext) if out.is_dir() => out.join(format!("qr.{ext}")),
        _ => out.to_path_buf(),
    }
}

async fn watch(backend: Arc<dyn Backend>, config: &Config) -> Result<ExitCode> {
    let mut vm = view_model(backend, config);
    let mut connection = vm.subscribe();
    vm.mount();

    print_connection(&connection.borrow_and_update());
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = connection.changed() => {
                if changed.is_err() {
                    break;
                }
                print_connection(&connection.borrow_and_update());
            }
        }
    }

    vm.unmount();
    Ok(ExitCode::SUCCESS)
}

async fn interactive(backend: Arc<dyn Backend>, config: &Config) -> Result<ExitCode> {
    let mut vm = view_model(backend, config);
    let mut connection = vm.subscribe();
    vm.mount();

    print_connection(&connection.borrow_and_update());
    let printer = tokio::spawn(async move {
        while connection.changed().await.is_ok() {
            print_connection(&connection.borrow_and_update());
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let outcome = session(&vm, &mut lines, tokio::signal::ctrl_c()).await;

    printer.abort();
    vm.unmount();
    outcome.map(|()| ExitCode::SUCCESS)
}

/// Prompt and send until EOF or `interrupt` fires. One interrupt future
/// covers the prompts and the send itself, so Ctrl-C is never lost between
/// them.
async fn session<R, I>(vm: &ViewModel, lines: &mut Lines<R>, interrupt: I) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    I: Future,
{
    tokio::pin!(interrupt);

    loop {
        let previous = vm.snapshot().draft.raw_number;
        let label = if previous.is_empty() {
            "Phone number (e.g., 91XXXXXXXXXX): ".to_string()
        } else {
            format!("Phone number [{previous}]: ")
        };

        let Some(number) = prompt(lines, &label, interrupt.as_mut()).await? else {
            return Ok(());
        };
        if !number.is_empty() {
            vm.set_number(number);
        }

        let Some(message) = prompt(lines, "Message: ", interrupt.as_mut()).await? else {
            return Ok(());
        };
        vm.set_message(message);

        println!("Sending...");
        tokio::select! {
            _ = interrupt.as_mut() => {
                eprintln!("Interrupted; the message may or may not have been delivered");
                return Ok(());
            }
            _ = vm.submit() => {}
        }
    }
}

/// `None` on EOF or interrupt.
async fn prompt<R, I>(
    lines: &mut Lines<R>,
    label: &str,
    interrupt: Pin<&mut I>,
) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    I: Future,
{
    print!("{label}");
    std::io::stdout().flush().context("Failed to flush stdout")?;

    tokio::select! {
        _ = interrupt => {
            println!();
            Ok(None)
        }
        line = lines.next_line() => line.context("Failed to read from stdin"),
    }
}

fn print_connection(state: &ConnectionState) {
    if state.is_connected() {
        println!("🟢 WhatsApp Connected");
    } else {
        println!("🔴 WhatsApp Not Connected");
        if state.qr().is_some() {
            println!("Scan QR to connect: run `wasend qr --out .`");
        }
    }
}
