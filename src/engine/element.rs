/*!
The normalized record type produced by every stage of the streaming engine,
regardless of whether it originated from an MRT archive file or a RIS Live
WebSocket frame.

[`BgpElement`] intentionally does not reuse [`crate::models::BgpElem`]: the
engine needs a collector identity attached to every record (MRT files and RIS
Live frames both come pre-labeled with a collector, but `BgpElem` has no such
field), and it needs the `as-path`/`communities` fields kept as their textual
projection so the same value can be handed unmodified to the filter and
interop-test layers described by the wire format in this crate's streaming
design.
*/
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::net::IpAddr;

/// One BGP observation: an announcement, a withdrawal, or a RIB entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElemKind {
    Announce,
    Withdraw,
    Rib,
}

impl ElemKind {
    pub fn as_char(&self) -> char {
        match self {
            ElemKind::Announce => 'A',
            ElemKind::Withdraw => 'W',
            ElemKind::Rib => 'R',
        }
    }
}

impl Display for ElemKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// The attribute bag of a [`BgpElement`]. Every field is optional: a RIB
/// entry without a `next-hop`, or a withdrawal with no `as-path`, are both
/// ordinary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementFields {
    pub prefix: Option<String>,
    pub as_path: Option<String>,
    pub next_hop: Option<String>,
    pub communities: Vec<String>,
}

impl ElementFields {
    /// `true` if the prefix looks like an IPv6 CIDR (contains `:`).
    pub fn is_ipv6(&self) -> bool {
        self.prefix.as_deref().is_some_and(|p| p.contains(':'))
    }

    /// Last token of `as-path`, ignoring AS-SET braces, i.e. the origin ASN.
    pub fn origin_asn_token(&self) -> Option<&str> {
        let path = self.as_path.as_deref()?;
        path.split_whitespace()
            .last()
            .map(|tok| tok.trim_matches(|c| c == '{' || c == '}'))
    }

    /// First token of `as-path`, i.e. the peer-adjacent hop.
    pub fn first_as_path_token(&self) -> Option<&str> {
        self.as_path.as_deref()?.split_whitespace().next()
    }
}

/// A normalized BGP record, time-ordered and collector-tagged.
#[derive(Debug, Clone, PartialEq)]
pub struct BgpElement {
    pub kind: ElemKind,
    pub collector: String,
    /// Seconds since the Unix epoch, fractional.
    pub time: f64,
    pub peer_asn: u32,
    pub peer_address: IpAddr,
    pub fields: ElementFields,
}

impl PartialOrd for BgpElement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for BgpElement {}

impl Ord for BgpElement {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .partial_cmp(&other.time)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.collector.cmp(&other.collector))
            .then_with(|| self.peer_asn.cmp(&other.peer_asn))
            .then_with(|| self.peer_address.cmp(&other.peer_address))
            .then_with(|| self.kind.as_char().cmp(&other.kind.as_char()))
    }
}

/// Textual projection used by interoperability tests (§6): pipe-separated,
/// one line per element.
impl Display for BgpElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}|{}|{}|{}|{}",
            self.kind,
            self.collector,
            self.time,
            self.peer_asn,
            self.peer_address,
            self.fields.prefix.as_deref().unwrap_or(""),
            self.fields.as_path.as_deref().unwrap_or(""),
            self.fields.next_hop.as_deref().unwrap_or(""),
            self.fields.communities.join(","),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elem(time: f64, collector: &str) -> BgpElement {
        BgpElement {
            kind: ElemKind::Announce,
            collector: collector.to_string(),
            time,
            peer_asn: 100,
            peer_address: "192.0.2.1".parse().unwrap(),
            fields: ElementFields::default(),
        }
    }

    #[test]
    fn orders_by_time_first() {
        let a = elem(1.0, "rrc00");
        let b = elem(2.0, "rrc00");
        assert!(a < b);
    }

    #[test]
    fn breaks_ties_by_collector() {
        let a = elem(1.0, "rrc00");
        let b = elem(1.0, "rrc01");
        assert!(a < b);
    }

    #[test]
    fn origin_asn_ignores_as_set_braces() {
        let mut f = ElementFields::default();
        f.as_path = Some("100 200 {300,400}".to_string());
        assert_eq!(f.origin_asn_token(), Some("300,400"));
    }

    #[test]
    fn textual_projection_has_nine_fields() {
        let e = elem(1.5, "rrc00");
        let line = e.to_string();
        assert_eq!(line.matches('|').count(), 8);
    }
}
