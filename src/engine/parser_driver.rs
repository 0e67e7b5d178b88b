/*!
§4.5 ParserDriver: the `ParserBackend` capability shared by all four backends
(§9's "duck-typed polymorphism across parser backends becomes a single
capability interface"), plus the post-parse filter pass applied to whatever a
backend could not honor natively.
*/
use crate::engine::config::ParserBackendKind;
use crate::engine::element::{BgpElement, ElemKind, ElementFields};
use crate::engine::error::{Diagnostic, EngineError};
use crate::engine::filter::{FilterAdapters, FilterSpec, IpVersion, UpdateType};
use crate::models::ElemType;
use crate::BgpkitParser;
use std::io::{BufRead, BufReader};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// §4.5: applies any [`FilterSpec`] field a backend did not consume
/// natively. `ip_version` and `peer_ip`/`peer_ips` are always applied here
/// regardless of backend, since no backend's native grammar expresses them
/// (§4.1).
pub fn post_parse_filter(element: &BgpElement, filters: &FilterSpec) -> bool {
    if let Some(version) = filters.ip_version {
        let is_v6 = element.fields.is_ipv6();
        match version {
            IpVersion::V4 if is_v6 => return false,
            IpVersion::V6 if !is_v6 => return false,
            _ => {}
        }
    }
    if let Some(ip) = filters.peer_ip {
        if element.peer_address != ip {
            return false;
        }
    }
    if !filters.peer_ips.is_empty() && !filters.peer_ips.contains(&element.peer_address) {
        return false;
    }
    if let Some(update_type) = filters.update_type {
        let matches = match update_type {
            UpdateType::Announce => element.kind == ElemKind::Announce,
            UpdateType::Withdraw => element.kind == ElemKind::Withdraw,
        };
        if !matches {
            return false;
        }
    }
    true
}

fn map_elem(elem: crate::models::BgpElem, collector: &str) -> BgpElement {
    let kind = match elem.elem_type {
        ElemType::ANNOUNCE => ElemKind::Announce,
        ElemType::WITHDRAW => ElemKind::Withdraw,
    };
    let communities = elem
        .communities
        .map(|cs| cs.into_iter().map(|c| c.to_string()).collect())
        .unwrap_or_default();
    BgpElement {
        kind,
        collector: collector.to_string(),
        time: elem.timestamp,
        peer_asn: elem.peer_asn.into(),
        peer_address: elem.peer_ip,
        fields: ElementFields {
            prefix: Some(elem.prefix.prefix.to_string()),
            as_path: elem.as_path.map(|p| p.to_string()),
            next_hop: elem.next_hop.map(|h| h.to_string()),
            communities,
        },
    }
}

/// §4.5: parses one local file with the in-process `bgpkit` backend,
/// running the (synchronous) parser on the blocking-task pool. `filters` is
/// pushed into the parser's own native filter list so non-matching records
/// never reach the `Elementor` (§4.1's structured library form), rather than
/// being re-checked after the fact. Returns elements already ordered within
/// the one-second MRT record bucket (§4.6) since the embedded parser yields
/// records in file order, which for MRT archives is monotone at that
/// granularity.
pub async fn parse_with_bgpkit(
    path: PathBuf,
    collector: String,
    filters: FilterSpec,
) -> Result<Vec<BgpElement>, EngineError> {
    tokio::task::spawn_blocking(move || -> Result<Vec<BgpElement>, EngineError> {
        let path_str = path.to_string_lossy().to_string();
        let mut parser = BgpkitParser::new(&path_str)
            .map_err(|e| EngineError::Config(format!("cannot open {path_str}: {e}")))?;
        parser.filters = FilterAdapters::to_native_filters(&filters)?;
        Ok(parser
            .into_elem_iter()
            .map(|elem| map_elem(elem, &collector))
            .collect())
    })
    .await
    .map_err(|e| EngineError::Config(format!("bgpkit parser task panicked: {e}")))?
}

/// §4.5: resolves an external parser binary's absolute path via `PATH`.
/// Raised as `EngineError::Config` at construction time (§7) when missing.
pub fn resolve_binary(kind: ParserBackendKind) -> Result<PathBuf, EngineError> {
    let name = kind
        .binary_name()
        .ok_or_else(|| EngineError::Config("backend has no external binary".to_string()))?;
    which::which(name).map_err(|_| {
        EngineError::Config(format!(
            "external parser binary `{name}` not found on PATH"
        ))
    })
}

/// §4.5: dispatches to the textual contract of the given external backend.
/// `bgpdump` speaks its own pipe-delimited machine-readable format and has
/// no per-call filter flags, so it gets its own parse path; every other
/// external kind (`bgpkit-cli`, and `pybgpstream` as a best-effort
/// placeholder absent an established single-binary textual contract of its
/// own) is driven through the `bgpkit-parser --json` shape.
pub async fn parse_with_external_binary(
    kind: ParserBackendKind,
    binary: &Path,
    file_path: &Path,
    filter_string: &str,
    collector: String,
) -> Result<Vec<BgpElement>, EngineError> {
    match kind {
        ParserBackendKind::Bgpdump => parse_with_bgpdump(binary, file_path, collector).await,
        _ => parse_with_bgpkit_cli(binary, file_path, filter_string, collector).await,
    }
}

/// §4.5: spawns `bgpkit-parser --json [--filter ...] <file>`, matching this
/// crate's own CLI output (`src/bin/main.rs`), and parses its stdout
/// line-by-line as [`BgpElem`] JSON.
async fn parse_with_bgpkit_cli(
    binary: &Path,
    file_path: &Path,
    filter_string: &str,
    collector: String,
) -> Result<Vec<BgpElement>, EngineError> {
    let mut cmd = Command::new(binary);
    cmd.arg(file_path)
        .arg("--json")
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    if !filter_string.is_empty() {
        cmd.arg("--filter").arg(filter_string);
    }

    let output = cmd
        .output()
        .await
        .map_err(|e| EngineError::Config(format!("failed to spawn {}: {e}", binary.display())))?;

    if !output.status.success() {
        return Err(EngineError::Config(format!(
            "{} exited with {}",
            binary.display(),
            output.status
        )));
    }

    let mut elements = Vec::new();
    let reader = BufReader::new(output.stdout.as_slice());
    for line in reader.lines() {
        let line = line.map_err(|e| EngineError::Config(e.to_string()))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<crate::models::BgpElem>(&line) {
            Ok(elem) => elements.push(map_elem(elem, &collector)),
            Err(e) => {
                tracing::debug!(error = %e, line, "skipping unparsable backend output line");
            }
        }
    }
    Ok(elements)
}

/// §4.5: spawns `bgpdump -m -v <file>` and parses its machine-readable
/// pipe-delimited format: `TYPE|TIME|A|PEER_IP|PEER_ASN|PREFIX|AS_PATH|
/// ORIGIN|NEXT_HOP|LOCAL_PREF|MED|COMMUNITY|ATOMIC_AGGREGATE|AGGREGATOR` for
/// announcements/RIB entries (`A`/`B`), and a truncated line ending at
/// `PREFIX` for withdrawals (`W`). `bgpdump` has no filter flags of its own,
/// so every `FilterSpec` field is left to `post_parse_filter` downstream.
async fn parse_with_bgpdump(
    binary: &Path,
    file_path: &Path,
    collector: String,
) -> Result<Vec<BgpElement>, EngineError> {
    let output = Command::new(binary)
        .arg("-m")
        .arg("-v")
        .arg(file_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|e| EngineError::Config(format!("failed to spawn {}: {e}", binary.display())))?;

    if !output.status.success() {
        return Err(EngineError::Config(format!(
            "{} exited with {}",
            binary.display(),
            output.status
        )));
    }

    let mut elements = Vec::new();
    let reader = BufReader::new(output.stdout.as_slice());
    for line in reader.lines() {
        let line = line.map_err(|e| EngineError::Config(e.to_string()))?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_bgpdump_line(&line, &collector) {
            Some(elem) => elements.push(elem),
            None => tracing::debug!(line, "skipping unparsable bgpdump output line"),
        }
    }
    Ok(elements)
}

/// Parses one `bgpdump -m` line into a [`BgpElement`]. Field layout per
/// bgpdump's own `show_routes_mrtformat` machine-readable output.
fn parse_bgpdump_line(line: &str, collector: &str) -> Option<BgpElement> {
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() < 6 {
        return None;
    }
    let time: f64 = fields[1].parse().ok()?;
    let kind = match fields[2] {
        "A" | "B" => ElemKind::Announce,
        "W" => ElemKind::Withdraw,
        _ => return None,
    };
    let peer_address: IpAddr = fields[3].parse().ok()?;
    let peer_asn: u32 = fields[4].parse().ok()?;
    let prefix = fields[5].to_string();

    let (as_path, next_hop, communities) = if kind == ElemKind::Announce && fields.len() > 8 {
        let as_path = (!fields[6].is_empty()).then(|| fields[6].to_string());
        let next_hop = (!fields[8].is_empty()).then(|| fields[8].to_string());
        let communities = fields
            .get(11)
            .map(|c| c.split_whitespace().map(|s| s.to_string()).collect())
            .unwrap_or_default();
        (as_path, next_hop, communities)
    } else {
        (None, None, Vec::new())
    };

    Some(BgpElement {
        kind,
        collector: collector.to_string(),
        time,
        peer_asn,
        peer_address,
        fields: ElementFields {
            prefix: Some(prefix),
            as_path,
            next_hop,
            communities,
        },
    })
}

/// A per-file, file-scoped parse outcome that the `ChunkScheduler` records
/// as a [`Diagnostic::Parser`] rather than aborting the chunk when it fails.
pub async fn parse_file(
    kind: ParserBackendKind,
    path: PathBuf,
    collector: String,
    filters: &FilterSpec,
    filter_string: &str,
) -> Result<Vec<BgpElement>, Diagnostic> {
    let path_str = path.to_string_lossy().to_string();
    let result = match kind {
        ParserBackendKind::Bgpkit => parse_with_bgpkit(path.clone(), collector, filters.clone()).await,
        other => match resolve_binary(other) {
            Ok(binary) => parse_with_external_binary(other, &binary, &path, filter_string, collector)
                .await
                .map(|elems| {
                    elems
                        .into_iter()
                        .filter(|e| post_parse_filter(e, filters))
                        .collect()
                }),
            Err(e) => Err(e),
        },
    };
    result.map_err(|e| Diagnostic::Parser {
        path: path_str,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::filter::PrefixFilter;

    fn elem(prefix: &str, peer: &str) -> BgpElement {
        BgpElement {
            kind: ElemKind::Announce,
            collector: "rrc00".to_string(),
            time: 1.0,
            peer_asn: 100,
            peer_address: peer.parse::<IpAddr>().unwrap(),
            fields: ElementFields {
                prefix: Some(prefix.to_string()),
                as_path: Some("100 200 300".to_string()),
                next_hop: None,
                communities: vec![],
            },
        }
    }

    #[test]
    fn ip_version_filter_rejects_mismatched_family() {
        let mut filters = FilterSpec::new();
        filters.ip_version = Some(IpVersion::V6);
        assert!(!post_parse_filter(&elem("10.0.0.0/8", "192.0.2.1"), &filters));
    }

    #[test]
    fn ip_version_filter_accepts_matching_family() {
        let mut filters = FilterSpec::new();
        filters.ip_version = Some(IpVersion::V4);
        assert!(post_parse_filter(&elem("10.0.0.0/8", "192.0.2.1"), &filters));
    }

    #[test]
    fn peer_ip_filter_rejects_other_peers() {
        let mut filters = FilterSpec::new();
        filters.peer_ip = Some("203.0.113.1".parse().unwrap());
        assert!(!post_parse_filter(&elem("10.0.0.0/8", "192.0.2.1"), &filters));
    }

    #[test]
    fn no_filters_accepts_everything() {
        let filters = FilterSpec::new();
        assert!(post_parse_filter(&elem("10.0.0.0/8", "192.0.2.1"), &filters));
    }

    #[test]
    fn prefix_filter_is_not_applied_post_parse() {
        // prefix filtering is always pushed natively into the backend
        // (§4.1); post_parse_filter intentionally ignores it.
        let mut filters = FilterSpec::new();
        filters.prefix = Some(PrefixFilter::Exact("203.0.113.0/24".to_string()));
        assert!(post_parse_filter(&elem("10.0.0.0/8", "192.0.2.1"), &filters));
    }

    #[test]
    fn bgpdump_line_parses_announcement() {
        let line = "BGP4MP|1700000000|A|192.0.2.1|100|10.0.0.0/8|100 200 300|IGP|192.0.2.254|0|0|65000:1|NAG|";
        let elem = parse_bgpdump_line(line, "rrc00").unwrap();
        assert_eq!(elem.kind, ElemKind::Announce);
        assert_eq!(elem.time, 1700000000.0);
        assert_eq!(elem.peer_asn, 100);
        assert_eq!(elem.peer_address, "192.0.2.1".parse::<IpAddr>().unwrap());
        assert_eq!(elem.fields.prefix.as_deref(), Some("10.0.0.0/8"));
        assert_eq!(elem.fields.as_path.as_deref(), Some("100 200 300"));
        assert_eq!(elem.fields.next_hop.as_deref(), Some("192.0.2.254"));
        assert_eq!(elem.fields.communities, vec!["65000:1".to_string()]);
    }

    #[test]
    fn bgpdump_line_parses_withdrawal_without_path_fields() {
        let line = "BGP4MP|1700000001|W|192.0.2.1|100|10.0.0.0/8";
        let elem = parse_bgpdump_line(line, "rrc00").unwrap();
        assert_eq!(elem.kind, ElemKind::Withdraw);
        assert_eq!(elem.fields.prefix.as_deref(), Some("10.0.0.0/8"));
        assert_eq!(elem.fields.as_path, None);
    }

    #[test]
    fn bgpdump_line_rejects_too_few_fields() {
        assert!(parse_bgpdump_line("BGP4MP|1700000000", "rrc00").is_none());
    }

    #[test]
    fn bgpdump_line_rejects_unknown_message_type() {
        let line = "BGP4MP|1700000000|X|192.0.2.1|100|10.0.0.0/8";
        assert!(parse_bgpdump_line(line, "rrc00").is_none());
    }
}
