use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bgpkit_parser::engine::{
    DataType, EngineConfig, FilterSpec, HistoricConfig, IpVersion, LiveConfig, ParserBackendKind,
    PrefixFilter, StreamFacade, UpdateType,
};
use clap::Parser;

/// bgpstream streams BGP updates and RIB entries from either a historic
/// archive window or the RIS Live WebSocket feed, per collector and filter.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Opts {
    /// Route collector names to stream from, e.g. `rrc00` or `route-views2`.
    /// May be repeated or comma-separated.
    #[clap(short, long, required = true, value_delimiter = ',')]
    collectors: Vec<String>,

    /// Historic window start, unix timestamp. Omit both this and `--until`
    /// to stream live instead.
    #[clap(long)]
    from: Option<f64>,

    /// Historic window end, unix timestamp (exclusive).
    #[clap(long)]
    until: Option<f64>,

    /// Which MRT data types to pull in historic mode.
    #[clap(long, value_delimiter = ',', default_value = "updates")]
    data_types: Vec<String>,

    /// Parser backend: bgpkit (in-process, default), bgpkit-cli, pybgpstream, bgpdump.
    #[clap(long, default_value = "bgpkit")]
    parser: String,

    /// Directory to persist downloaded archive files in (historic mode only).
    /// Without this, files are fetched to a scratch location and reclaimed
    /// at each chunk boundary.
    #[clap(long)]
    cache_dir: Option<PathBuf>,

    /// Disable preferring `/dev/shm` for scratch downloads.
    #[clap(long)]
    no_ram_fetch: bool,

    /// Maximum concurrent archive downloads.
    #[clap(long, default_value_t = 10)]
    max_concurrent_downloads: usize,

    /// Width, in seconds, of each historic scheduling window.
    #[clap(long, default_value_t = 7200)]
    chunk_time_secs: u64,

    /// Live-mode reordering delay, in seconds.
    #[clap(long, default_value_t = 10.0)]
    jitter_buffer_delay: f64,

    #[clap(flatten)]
    filters: Filters,

    /// Emit newline-delimited JSON instead of the pipe-separated text form.
    #[clap(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct Filters {
    #[clap(short = 'o', long)]
    origin_asn: Option<u32>,
    #[clap(short = 'j', long)]
    peer_ip: Vec<IpAddr>,
    #[clap(short = 'J', long)]
    peer_asn: Option<u32>,
    #[clap(short = 'a', long)]
    as_path: Option<String>,
    #[clap(short = 'p', long)]
    prefix: Option<String>,
    #[clap(short = 's', long)]
    include_super: bool,
    #[clap(short = 'S', long)]
    include_sub: bool,
    #[clap(long = "ipv4")]
    ipv4_only: bool,
    #[clap(long = "ipv6")]
    ipv6_only: bool,
    #[clap(long)]
    announce_only: bool,
    #[clap(long)]
    withdraw_only: bool,
}

fn build_filter_spec(f: &Filters) -> Result<FilterSpec, String> {
    let mut spec = FilterSpec::new();
    spec.origin_asn = f.origin_asn;
    spec.peer_asn = f.peer_asn;
    if f.peer_ip.len() == 1 {
        spec.peer_ip = Some(f.peer_ip[0]);
    } else if !f.peer_ip.is_empty() {
        spec.peer_ips = f.peer_ip.clone();
    }
    spec.as_path = f.as_path.clone();

    match (f.ipv4_only, f.ipv6_only) {
        (true, true) => return Err("--4 and --6 cannot be used together".to_string()),
        (true, false) => spec.ip_version = Some(IpVersion::V4),
        (false, true) => spec.ip_version = Some(IpVersion::V6),
        (false, false) => {}
    }

    match (f.announce_only, f.withdraw_only) {
        (true, true) => return Err("--announce-only and --withdraw-only cannot be used together".to_string()),
        (true, false) => spec.update_type = Some(UpdateType::Announce),
        (false, true) => spec.update_type = Some(UpdateType::Withdraw),
        (false, false) => {}
    }

    if let Some(cidr) = &f.prefix {
        spec.prefix = Some(match (f.include_super, f.include_sub) {
            (false, false) => PrefixFilter::Exact(cidr.clone()),
            (true, false) => PrefixFilter::Super(cidr.clone()),
            (false, true) => PrefixFilter::Sub(cidr.clone()),
            (true, true) => PrefixFilter::SuperSub(cidr.clone()),
        });
    }

    Ok(spec)
}

fn parse_data_types(values: &[String]) -> Result<Vec<DataType>, String> {
    values
        .iter()
        .map(|v| match v.as_str() {
            "ribs" | "rib" => Ok(DataType::Ribs),
            "updates" | "update" => Ok(DataType::Updates),
            other => Err(format!("unknown data type: {other}")),
        })
        .collect()
}

#[tokio::main]
async fn main() {
    let opts: Opts = Opts::parse();
    tracing_subscriber::fmt::init();

    let filters = match build_filter_spec(&opts.filters) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("bgpstream: {e}");
            std::process::exit(2);
        }
    };

    let parser_kind = match ParserBackendKind::from_str(&opts.parser) {
        Ok(k) => k,
        Err(e) => {
            eprintln!("bgpstream: {e}");
            std::process::exit(2);
        }
    };

    let config = match (opts.from, opts.until) {
        (None, None) => {
            let live = LiveConfig::new(opts.collectors.clone(), filters, Some(opts.jitter_buffer_delay));
            match live {
                Ok(cfg) => EngineConfig::Live(cfg),
                Err(e) => {
                    eprintln!("bgpstream: {e}");
                    std::process::exit(2);
                }
            }
        }
        (Some(start), Some(end)) => {
            let data_types = match parse_data_types(&opts.data_types) {
                Ok(dt) => dt,
                Err(e) => {
                    eprintln!("bgpstream: {e}");
                    std::process::exit(2);
                }
            };
            let historic = HistoricConfig::new(
                start,
                end,
                opts.collectors.clone(),
                Some(data_types),
                filters,
                Some(opts.max_concurrent_downloads),
                opts.cache_dir.clone(),
                Some(!opts.no_ram_fetch),
                Some(std::time::Duration::from_secs(opts.chunk_time_secs)),
                parser_kind,
            );
            match historic {
                Ok(cfg) => EngineConfig::Historic(cfg),
                Err(e) => {
                    eprintln!("bgpstream: {e}");
                    std::process::exit(2);
                }
            }
        }
        _ => {
            eprintln!("bgpstream: --from and --until must both be set, or both omitted for live mode");
            std::process::exit(2);
        }
    };

    let interrupted = Arc::new(AtomicBool::new(false));
    let handler_flag = interrupted.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
    }) {
        eprintln!("bgpstream: failed to install signal handler: {e}");
    }

    let mut facade = StreamFacade::open(config);
    let mut saw_fatal_error = false;

    loop {
        if interrupted.load(Ordering::SeqCst) {
            eprintln!("bgpstream: interrupted");
            std::process::exit(130);
        }

        match facade.next().await {
            Some(Ok(element)) => {
                if opts.json {
                    println!("{}", element_to_json(&element));
                } else {
                    println!("{element}");
                }
            }
            Some(Err(e)) => {
                eprintln!("bgpstream: {e}");
                saw_fatal_error = true;
                break;
            }
            None => break,
        }
    }

    let diagnostics = facade.diagnostics();
    if !diagnostics.is_empty() {
        eprintln!(
            "bgpstream: {} fetch failure(s), {} parse failure(s) during this run",
            diagnostics.fetch_failures(),
            diagnostics.parser_failures()
        );
    }

    if saw_fatal_error {
        std::process::exit(3);
    }
    if !diagnostics.is_empty() {
        std::process::exit(4);
    }
}

fn element_to_json(element: &bgpkit_parser::engine::BgpElement) -> String {
    format!(
        "{{\"type\":\"{}\",\"collector\":\"{}\",\"time\":{},\"peer_asn\":{},\"peer_address\":\"{}\",\"prefix\":{},\"as_path\":{},\"next_hop\":{},\"communities\":[{}]}}",
        element.kind,
        element.collector,
        element.time,
        element.peer_asn,
        element.peer_address,
        json_opt_str(element.fields.prefix.as_deref()),
        json_opt_str(element.fields.as_path.as_deref()),
        json_opt_str(element.fields.next_hop.as_deref()),
        element
            .fields
            .communities
            .iter()
            .map(|c| format!("\"{c}\""))
            .collect::<Vec<_>>()
            .join(","),
    )
}

fn json_opt_str(v: Option<&str>) -> String {
    match v {
        Some(s) => format!("\"{s}\""),
        None => "null".to_string(),
    }
}
