use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

mod app;
mod clipboard;
mod config;
mod descriptor;
mod ftp;
mod input;
mod model;
mod ssh;
mod ui;

use app::App;
use app::backend::NetworkTransport;
use app::cache::RemoteCache;
use app::logging::{CrlfWriter, init_logging};
use clipboard::SystemClipboard;
use descriptor::{DESCRIPTOR_FORMAT, DescriptorError};
use input::{KeyboardTriggers, RawModeGuard};

/// Checks clipboard filenames against an FTP or SFTP directory listing.
#[derive(Debug, Parser)]
#[command(name = "cpbftpchk", version, about)]
struct Cli {
    /// Remote directory as [proto://][username[:password]@]host[/path][:port]
    descriptor: Option<String>,
    /// Settings file, defaults to <config dir>/cpbftpchk/config.json
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Log debug details
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(cli.verbose) {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            if matches!(
                err.downcast_ref::<DescriptorError>(),
                Some(err) if !matches!(err, DescriptorError::Prompt(_))
            ) {
                warn!("format:");
                warn!("    {DESCRIPTOR_FORMAT}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = config::load_settings(cli.config.as_deref())?;
    info!("initializing...");
    let descriptor = descriptor::parse(cli.descriptor.as_deref().unwrap_or_default())?;
    let transport = Arc::new(NetworkTransport::new(settings.connect_timeout()));
    let cache = RemoteCache::new(descriptor, transport);
    let keys = settings.keys.clone();

    let _raw = RawModeGuard::enable()?;
    let mut app = App::new(
        settings,
        cache,
        Box::new(SystemClipboard::default()),
        CrlfWriter::new(io::stdout()),
    );
    let result = app
        .start()
        .and_then(|()| app.run(&mut KeyboardTriggers::new(keys)));
    app.shutdown();
    info!("bye");
    result
}
