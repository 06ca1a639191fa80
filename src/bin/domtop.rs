//! domtop - periodic resource monitor for hypervisor domains.
//!
//! Prints one record per interval: a node summary followed by one row per
//! domain, as an aligned table, CSV or JSON.
//!
//! Usage:
//!   domtop --simulate                    # simulated node, text table
//!   domtop --replay session.json -t csv  # replay a recording as CSV
//!   domtop --simulate -t json -c 5       # five JSON documents, then exit
//!   domtop --simulate -s cpu_pct -i 2    # busiest domains first, every 2 s

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::io;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use domtop::collector::{MockBackend, ReplayBackend, StatsBackend};
use domtop::config::{MonitorConfig, interval_from_secs};
use domtop::error::BackendError;
use domtop::fields::{FieldId, IdentMode};
use domtop::render::{DisplaySettings, OutputKind, Sections};
use domtop::table::SortState;
use domtop::{Monitor, StopReason};

/// Resource monitor for hypervisor domains.
#[derive(Parser)]
#[command(name = "domtop", about = "Resource monitor for hypervisor domains", version)]
struct Args {
    /// Seconds between updates (fractions allowed, must be > 0).
    #[arg(short, long, default_value = "1", env = "DOMTOP_INTERVAL", value_parser = parse_interval)]
    interval: Duration,

    /// Repeat the table header before every domain.
    #[arg(short, long)]
    repeat_header: bool,

    /// Number of updates before exiting (0 = run until interrupted).
    #[arg(short = 'c', long = "iteration-count", default_value_t = 0, env = "DOMTOP_ITERATIONS")]
    iterations: u64,

    /// How domains are identified: name, full or id.
    #[arg(short = 'f', long = "identifier", default_value = "name", env = "DOMTOP_IDENTIFIER")]
    ident: IdentMode,

    /// Output type: org (text), csv (delimited) or json (structured).
    #[arg(short = 't', long = "type", default_value = "org", env = "DOMTOP_TYPE")]
    output: OutputKind,

    /// Sort column, by key (cpu_pct) or header (CPU(%)).
    #[arg(short, long, default_value = "name", env = "DOMTOP_SORT")]
    sort: FieldId,

    /// Index of the first domain to show after sorting.
    #[arg(long, default_value_t = 0)]
    first_domain: usize,

    /// Hide per-VCPU times.
    #[arg(long)]
    no_vcpus: bool,

    /// Hide network interface counters.
    #[arg(long)]
    no_networks: bool,

    /// Hide block device counters.
    #[arg(long)]
    no_vbds: bool,

    /// Hide transcendent memory counters.
    #[arg(long)]
    no_tmem: bool,

    /// Replay snapshots recorded in a JSON file.
    #[arg(long, value_name = "PATH", env = "DOMTOP_REPLAY", conflicts_with = "simulate")]
    replay: Option<PathBuf>,

    /// Monitor a simulated node.
    #[arg(long)]
    simulate: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is warn level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            interval: self.interval,
            iterations: self.iterations,
            ident: self.ident,
            output: self.output,
            display: DisplaySettings {
                sort: SortState {
                    field: self.sort,
                    first_domain: self.first_domain,
                },
                repeat_header: self.repeat_header,
                sections: Sections {
                    vcpus: !self.no_vcpus,
                    networks: !self.no_networks,
                    vbds: !self.no_vbds,
                    tmem: !self.no_tmem,
                },
            },
        }
    }

    fn open_backend(&self) -> Result<Box<dyn StatsBackend>, BackendError> {
        if let Some(path) = &self.replay {
            return Ok(Box::new(ReplayBackend::from_path(path)?));
        }
        if self.simulate {
            info!("using simulated node");
            return Ok(Box::new(MockBackend::typical_node()));
        }
        Err(BackendError::Init(
            "no statistics source available (use --replay PATH or --simulate)".to_string(),
        ))
    }
}

/// Parses the update interval in seconds.
fn parse_interval(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid interval '{}': {}", s, e))?;
    interval_from_secs(secs).map_err(|e| e.to_string())
}

/// Initializes the tracing subscriber on stderr; stdout carries only
/// monitor output. Default level is WARN so the table stays readable.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("domtop={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version are reported as errors that go to stdout.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    init_logging(args.verbose, args.quiet);

    let config = args.monitor_config();
    if let Err(e) = config.validate() {
        eprintln!("domtop: {}", e);
        process::exit(1);
    }

    info!("domtop {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={:?}, iterations={}, type={}, sort={}",
        config.interval, config.iterations, config.output, config.display.sort.field
    );

    let backend = match args.open_backend() {
        Ok(backend) => backend,
        Err(e) => {
            error!("{}", e);
            eprintln!("domtop: {}", e);
            process::exit(1);
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set signal handler: {}", e);
    }

    let stdout = io::stdout();
    let mut monitor = Monitor::new(backend, stdout.lock(), config);

    match monitor.run(&running) {
        Ok(StopReason::EndOfData) => info!("end of recording"),
        Ok(reason) => info!("stopped: {:?}", reason),
        Err(e) => {
            eprintln!("domtop: {}", e);
            process::exit(1);
        }
    }
}
