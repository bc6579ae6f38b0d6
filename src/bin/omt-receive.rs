//! omt-receive - connect to an OMT sender and dump raw frames.
//!
//! Payloads go to stdout (or `--output`), diagnostics to stderr:
//!
//! ```bash
//! omt-receive 192.168.1.20 | ffplay -f rawvideo -pixel_format nv12 -video_size 1280x720 -
//! ```
//!
//! Exit status: 0 on clean end, closed output or Ctrl-C; 1 usage error;
//! 2 connection failure; 3 protocol error; 4 truncated stream; 5 read error.

use std::fs::File;
use std::net::Shutdown;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use omt_receiver::config::{ReceiverConfig, DEFAULT_PORT};
use omt_receiver::error::{EXIT_IO, EXIT_USAGE};
use omt_receiver::session::DEFAULT_PROGRESS_INTERVAL;
use omt_receiver::sink::{FrameSink, WriterSink};
use omt_receiver::{run_session, transport, FrameDecoder};

#[derive(Parser, Debug)]
#[command(name = "omt-receive", version)]
#[command(about = "Receive the raw frame stream from an OMT camera")]
struct Args {
    /// Sender host (phone IP or name)
    host: String,

    /// Sender port
    #[arg(env = "OMT_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Write payloads to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Connect timeout in seconds
    #[arg(long, default_value_t = 10)]
    connect_timeout: u64,

    /// Log a progress line every N frames (0 disables)
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    progress_every: u64,

    /// Reject frames whose payload exceeds this many bytes
    #[arg(long)]
    max_payload: Option<u32>,

    /// Print the final session report as one JSON line on stderr
    #[arg(long)]
    json_report: bool,
}

impl Args {
    fn to_config(&self) -> ReceiverConfig {
        let mut config = ReceiverConfig::new(self.host.clone());
        config.port = self.port;
        config.connect_timeout = Duration::from_secs(self.connect_timeout);
        config.progress_every = self.progress_every;
        config.decoder.max_payload_size = self.max_payload;
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // stdout carries frame data, so all logging goes to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = args.to_config();

    let sink: Box<dyn FrameSink + Send> = match &args.output {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(WriterSink::new(file)),
            Err(e) => {
                tracing::error!("Cannot create {}: {}", path.display(), e);
                return ExitCode::from(EXIT_USAGE);
            }
        },
        None => Box::new(WriterSink::new(std::io::stdout())),
    };

    let stream = match transport::connect(&config).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!("Connect failed: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };
    tracing::info!("Connected to {}", config.addr());

    // Second handle so Ctrl-C can unblock a read in progress
    let shutdown_handle = match stream.try_clone() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!("Cannot clone socket: {}", e);
            return ExitCode::from(EXIT_IO);
        }
    };

    let cancel = Arc::new(AtomicBool::new(false));
    let session_cancel = cancel.clone();
    let decoder_config = config.decoder.clone();
    let progress_every = config.progress_every;

    let mut session = tokio::task::spawn_blocking(move || {
        let mut decoder = FrameDecoder::with_config(stream, decoder_config);
        let mut sink = sink;
        run_session(&mut decoder, &mut sink, progress_every, &session_cancel)
    });

    let joined = tokio::select! {
        joined = &mut session => joined,
        _ = tokio::signal::ctrl_c() => {
            cancel.store(true, Ordering::Release);
            let _ = shutdown_handle.shutdown(Shutdown::Both);
            session.await
        }
    };

    let report = match joined {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Session task failed: {}", e);
            return ExitCode::from(EXIT_IO);
        }
    };

    tracing::info!("Done. Frames received: {}", report.frames);

    if args.json_report {
        match report.to_json() {
            Ok(line) => eprintln!("{}", line),
            Err(e) => tracing::warn!("Cannot serialize report: {}", e),
        }
    }

    ExitCode::from(report.outcome.exit_code())
}
