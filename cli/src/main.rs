use anyhow::{bail, Context};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::{info, warn};

mod script;
mod session;

use session::Session;

#[derive(Parser)]
#[command(name = "matchbook-cli")]
#[command(about = "Replays an order script against an in-memory order book")]
struct Cli {
    /// Script to replay; reads stdin when omitted
    #[arg(short, long)]
    script: Option<PathBuf>,
    /// Emit one JSON event per command instead of text
    #[arg(long)]
    json: bool,
    /// Stop at the first malformed line instead of skipping it
    #[arg(long)]
    strict: bool,
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .init();

    let input: Box<dyn BufRead> = match &cli.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening script {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout().lock();
    let mut session = Session::new(stdout, cli.json);
    let mut skipped = 0usize;

    for (i, line) in input.lines().enumerate() {
        let line_no = i + 1;
        let line = line.with_context(|| format!("reading line {line_no}"))?;

        match script::parse_line(line_no, &line) {
            Ok(Some(cmd)) => session.execute(cmd).context("writing output")?,
            Ok(None) => {}
            Err(err) if cli.strict => bail!(err),
            Err(err) => {
                warn!(%err, "skipping malformed line");
                skipped += 1;
                session.report_error(err.to_string())?;
            }
        }
    }

    let book = session.book();
    info!(
        resting = book.len(),
        trades = book.trades().len(),
        skipped,
        "script finished"
    );
    session.into_inner().flush()?;
    Ok(())
}
