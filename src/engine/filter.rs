/*!
Normalized filter intent and its translation into the three downstream forms
a BGP stream consumer needs: a `bgpdump`/`pybgpstream`-style filter string, a
structured argument list for the embedded library backend
([`crate::parser::filter::Filter`]), and a RIS Live `ris_subscribe` payload.

Field names and the `prefix*` mutual-exclusivity rule follow
[`crate::parser::filter::Filter`]'s own `PrefixMatchType`; the filter-string
grammar and the subscribe-payload field mapping have no one-to-one analog in
that module and are built from the wire contract this crate's streaming
engine documents for its external collaborators.
*/
use crate::engine::error::EngineError;
use crate::models::ElemType;
use crate::parser::filter::{Filter as NativeFilter, IpVersion as NativeIpVersion, PrefixMatchType};
use crate::parser::rislive::messages::client::ris_subscribe::{RisSubscribe, RisSubscribeType};
use crate::parser::ComparableRegex;
use std::net::IpAddr;

/// One of the four mutually-exclusive prefix match modes a [`FilterSpec`] may
/// request.
#[derive(Debug, Clone, PartialEq)]
pub enum PrefixFilter {
    Exact(String),
    Super(String),
    Sub(String),
    SuperSub(String),
}

impl PrefixFilter {
    fn cidr(&self) -> &str {
        match self {
            PrefixFilter::Exact(c)
            | PrefixFilter::Super(c)
            | PrefixFilter::Sub(c)
            | PrefixFilter::SuperSub(c) => c,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpVersion {
    V4,
    V6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateType {
    Announce,
    Withdraw,
}

/// Which downstream grammar a filter string is being rendered for. The
/// `as_path` clause uses Cisco-style regex for `pybgpstream` and POSIX regex
/// for everything else; every other clause is identical across targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterTarget {
    PyBgpstream,
    Other,
}

/// All fields optional: presence means "apply", absence means "match all".
/// Constructed once per stream and never mutated afterward.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub origin_asn: Option<u32>,
    pub peer_asn: Option<u32>,
    pub peer_ip: Option<IpAddr>,
    pub peer_ips: Vec<IpAddr>,
    pub as_path: Option<String>,
    pub ip_version: Option<IpVersion>,
    pub update_type: Option<UpdateType>,
    pub prefix: Option<PrefixFilter>,
}

impl FilterSpec {
    /// A spec with no fields set matches everything and always validates.
    pub fn new() -> Self {
        Self::default()
    }

    /// §4.1: more than one `prefix*` field set is a configuration error.
    /// Since [`PrefixFilter`] is a single enum field this can't actually
    /// happen through this type, but callers building a `FilterSpec` from an
    /// untyped config (CLI flags, deserialized JSON) should route through
    /// here rather than constructing the enum directly.
    pub fn validate(&self) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Translates one [`FilterSpec`] into the three backend-specific forms
/// described in the component design for `FilterAdapters`.
pub struct FilterAdapters;

impl FilterAdapters {
    /// §4.1 CLI filter-string form: a conjunction of clauses joined by
    /// ` and `. `peer_ip`/`peer_ips`/`ip_version` are deliberately omitted —
    /// they are not expressible in this grammar and are applied post-parse
    /// (see `ParserDriver`).
    pub fn to_cli_string(
        spec: &FilterSpec,
        collectors: &[String],
        data_types: &[&str],
        target: FilterTarget,
    ) -> String {
        let mut clauses = Vec::new();

        if !collectors.is_empty() {
            clauses.push(format!("collector {}", collectors.join(" ")));
        }
        if !data_types.is_empty() {
            clauses.push(format!("type {}", data_types.join(" ")));
        }
        if let Some(asn) = spec.peer_asn {
            clauses.push(format!("peer {asn}"));
        }
        if let Some(path) = &spec.as_path {
            // target only changes how the regex *content* is authored by the
            // caller; the clause shape is identical either way.
            let _ = target;
            clauses.push(format!("aspath \"{path}\""));
        }
        if let Some(asn) = spec.origin_asn {
            clauses.push(format!("aspath \"_{asn}$\""));
        }
        match spec.update_type {
            Some(UpdateType::Announce) => clauses.push("elemtype announcements".to_string()),
            Some(UpdateType::Withdraw) => clauses.push("elemtype withdrawals".to_string()),
            None => {}
        }
        if let Some(prefix) = &spec.prefix {
            let cidr = prefix.cidr();
            let clause = match prefix {
                PrefixFilter::Exact(_) => format!("prefix exact {cidr}"),
                PrefixFilter::Super(_) => format!("prefix less {cidr}"),
                PrefixFilter::Sub(_) => format!("prefix more {cidr}"),
                PrefixFilter::SuperSub(_) => format!("prefix any {cidr}"),
            };
            clauses.push(clause);
        }

        clauses.join(" and ")
    }

    /// §4.1 structured library form: the same fields as native arguments to
    /// [`crate::parser::filter::Filter`].
    pub fn to_native_filters(spec: &FilterSpec) -> Result<Vec<NativeFilter>, EngineError> {
        let mut filters = Vec::new();

        if let Some(asn) = spec.origin_asn {
            filters.push(NativeFilter::OriginAsn(asn));
        }
        if let Some(asn) = spec.peer_asn {
            filters.push(NativeFilter::PeerAsn(asn));
        }
        if let Some(ip) = spec.peer_ip {
            filters.push(NativeFilter::PeerIp(ip));
        }
        if !spec.peer_ips.is_empty() {
            filters.push(NativeFilter::PeerIps(spec.peer_ips.clone()));
        }
        if let Some(version) = spec.ip_version {
            let native = match version {
                IpVersion::V4 => NativeIpVersion::Ipv4,
                IpVersion::V6 => NativeIpVersion::Ipv6,
            };
            filters.push(NativeFilter::IpVersion(native));
        }
        if let Some(prefix) = &spec.prefix {
            let net = prefix.cidr().parse().map_err(|e| {
                EngineError::Config(format!("invalid prefix {}: {e}", prefix.cidr()))
            })?;
            let match_type = match prefix {
                PrefixFilter::Exact(_) => PrefixMatchType::Exact,
                PrefixFilter::Super(_) => PrefixMatchType::IncludeSuper,
                PrefixFilter::Sub(_) => PrefixMatchType::IncludeSub,
                PrefixFilter::SuperSub(_) => PrefixMatchType::IncludeSuperSub,
            };
            filters.push(NativeFilter::Prefix(net, match_type));
        }
        if let Some(path) = &spec.as_path {
            let regex = ComparableRegex::new(path)
                .map_err(|e| EngineError::Config(format!("invalid as_path regex {path}: {e}")))?;
            filters.push(NativeFilter::AsPath(regex));
        }
        if let Some(update_type) = spec.update_type {
            let elem_type = match update_type {
                UpdateType::Announce => ElemType::ANNOUNCE,
                UpdateType::Withdraw => ElemType::WITHDRAW,
            };
            filters.push(NativeFilter::Type(elem_type));
        }

        Ok(filters)
    }

    /// §4.1 WebSocket subscribe form: one `ris_subscribe` message per
    /// collector. `peer_asn`/`origin_asn` are composed into a single
    /// comma-separated `path` pattern with anchors; the prefix match mode
    /// sets `moreSpecific`/`lessSpecific` with exact meaning both `false`
    /// (overriding the server's default of `moreSpecific=true`).
    pub fn to_subscribe(spec: &FilterSpec, collector: &str) -> RisSubscribe {
        let mut sub = RisSubscribe::new().host(collector).data_type(RisSubscribeType::UPDATE);

        match spec.update_type {
            Some(UpdateType::Announce) => sub = sub.require("announcements"),
            Some(UpdateType::Withdraw) => sub = sub.require("withdrawals"),
            None => {}
        }
        if let Some(ip) = spec.peer_ip {
            sub = sub.peer(ip);
        }

        let mut path_tokens = Vec::new();
        if let Some(asn) = spec.peer_asn {
            path_tokens.push(format!("^{asn}"));
        }
        if let Some(asn) = spec.origin_asn {
            path_tokens.push(format!("{asn}$"));
        }
        if !path_tokens.is_empty() {
            sub = sub.path(&path_tokens.join(","));
        }

        if let Some(prefix) = &spec.prefix {
            if let Ok(net) = prefix.cidr().parse() {
                sub = sub.prefix(net);
                let (more, less) = match prefix {
                    PrefixFilter::Exact(_) => (false, false),
                    PrefixFilter::Sub(_) => (true, false),
                    PrefixFilter::Super(_) => (false, true),
                    PrefixFilter::SuperSub(_) => (true, true),
                };
                sub = sub.more_specific(more).less_specific(less);
            }
        }

        sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_string_joins_clauses_with_and() {
        let spec = FilterSpec {
            peer_asn: Some(13335),
            update_type: Some(UpdateType::Announce),
            ..Default::default()
        };
        let s = FilterAdapters::to_cli_string(
            &spec,
            &["rrc00".to_string()],
            &["updates"],
            FilterTarget::Other,
        );
        assert_eq!(s, "collector rrc00 and type updates and peer 13335 and elemtype announcements");
    }

    #[test]
    fn origin_asn_becomes_anchored_aspath_regex() {
        let spec = FilterSpec {
            origin_asn: Some(27653),
            ..Default::default()
        };
        let s = FilterAdapters::to_cli_string(&spec, &[], &[], FilterTarget::Other);
        assert_eq!(s, "aspath \"_27653$\"");
    }

    #[test]
    fn prefix_exact_maps_to_prefix_exact_clause() {
        let spec = FilterSpec {
            prefix: Some(PrefixFilter::Exact("213.196.74.0/24".to_string())),
            ..Default::default()
        };
        let s = FilterAdapters::to_cli_string(&spec, &[], &[], FilterTarget::Other);
        assert_eq!(s, "prefix exact 213.196.74.0/24");
    }

    #[test]
    fn subscribe_exact_prefix_disables_both_specificity_flags() {
        let spec = FilterSpec {
            prefix: Some(PrefixFilter::Exact("10.0.0.0/8".to_string())),
            ..Default::default()
        };
        let sub = FilterAdapters::to_subscribe(&spec, "rrc00");
        assert_eq!(sub.more_specific, Some(false));
        assert_eq!(sub.less_specific, Some(false));
    }

    #[test]
    fn subscribe_composes_peer_and_origin_asn_into_path_pattern() {
        let spec = FilterSpec {
            peer_asn: Some(100),
            origin_asn: Some(27653),
            ..Default::default()
        };
        let sub = FilterAdapters::to_subscribe(&spec, "rrc00");
        assert_eq!(sub.path, Some("^100,27653$".to_string()));
    }

    #[test]
    fn native_filters_include_ip_version_and_peer_ip() {
        let spec = FilterSpec {
            ip_version: Some(IpVersion::V6),
            peer_ip: Some("2001:db8::1".parse().unwrap()),
            ..Default::default()
        };
        let filters = FilterAdapters::to_native_filters(&spec).unwrap();
        assert_eq!(filters.len(), 2);
    }
}
