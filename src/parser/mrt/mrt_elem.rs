//! Converts a parsed [`MrtRecord`] into per-prefix [`BgpElem`] values.
//!
//! A single MRT record (a RIB dump entry or a BGP4MP update) can carry
//! reachability for many prefixes; this module fans each one out into its own
//! element so downstream consumers can work prefix-at-a-time.
use crate::models::*;
pub use crate::models::{BgpElem, ElemType};
use log::warn;
use std::net::IpAddr;

/// Holds the `PEER_INDEX_TABLE` seen earlier in a TABLE_DUMP_V2 stream so
/// later `RIB_*` records can resolve `peer_index` into an actual peer.
#[derive(Default)]
pub struct Elementor {
    pub(crate) peer_table: Option<PeerIndexTable>,
}

struct RelevantAttributes {
    as_path: Option<AsPath>,
    as4_path: Option<AsPath>,
    origin: Option<Origin>,
    next_hop: Option<IpAddr>,
    local_pref: Option<u32>,
    med: Option<u32>,
    communities: Option<Vec<MetaCommunity>>,
    atomic: bool,
    aggregator: Option<(Asn, IpAddr)>,
    announced: Option<Nlri>,
    withdrawn: Option<Nlri>,
}

fn get_relevant_attributes(attributes: Attributes) -> RelevantAttributes {
    let mut r = RelevantAttributes {
        as_path: None,
        as4_path: None,
        origin: None,
        next_hop: None,
        local_pref: None,
        med: None,
        communities: None,
        atomic: false,
        aggregator: None,
        announced: None,
        withdrawn: None,
    };

    for value in attributes {
        match value {
            AttributeValue::Origin(v) => r.origin = Some(v),
            AttributeValue::AsPath(v) => r.as_path = Some(v),
            AttributeValue::As4Path(v) => r.as4_path = Some(v),
            AttributeValue::NextHop(v) => r.next_hop = Some(v),
            AttributeValue::MultiExitDiscriminator(v) => r.med = Some(v),
            AttributeValue::LocalPreference(v) => r.local_pref = Some(v),
            AttributeValue::AtomicAggregate(_) => r.atomic = true,
            AttributeValue::Aggregator(asn, ip) => r.aggregator = Some((asn, ip)),
            AttributeValue::Communities(v) => {
                let mut c = r.communities.take().unwrap_or_default();
                c.extend(v.into_iter().map(MetaCommunity::Plain));
                r.communities = Some(c);
            }
            AttributeValue::ExtendedCommunities(v) => {
                let mut c = r.communities.take().unwrap_or_default();
                c.extend(v.into_iter().map(MetaCommunity::Extended));
                r.communities = Some(c);
            }
            AttributeValue::LargeCommunities(v) => {
                let mut c = r.communities.take().unwrap_or_default();
                c.extend(v.into_iter().map(MetaCommunity::Large));
                r.communities = Some(c);
            }
            AttributeValue::MpReachNlri(v) => r.announced = Some(v),
            AttributeValue::MpUnreachNlri(v) => r.withdrawn = Some(v),
            _ => {}
        }
    }

    r
}

fn next_hop_addr(addr: NextHopAddress) -> IpAddr {
    match addr {
        NextHopAddress::Ipv4(v) => IpAddr::from(v),
        NextHopAddress::Ipv6(v) => IpAddr::from(v),
        NextHopAddress::Ipv6LinkLocal(v, _) => IpAddr::from(v),
    }
}

fn merge_as_paths(as_path: Option<AsPath>, as4_path: Option<AsPath>) -> Option<AsPath> {
    match (as_path, as4_path) {
        (None, None) => None,
        (Some(v), None) => Some(v),
        (None, Some(v)) => Some(v),
        (Some(v1), Some(v2)) => AsPath::merge_aspath_as4path(&v1, &v2).or(Some(v1)),
    }
}

impl Elementor {
    pub fn new() -> Elementor {
        Elementor::default()
    }

    pub fn record_to_elems(&mut self, record: MrtRecord) -> Vec<BgpElem> {
        let mut elems = vec![];
        let header = &record.common_header;
        let timestamp: f64 = match header.microsecond_timestamp {
            Some(micro) => header.timestamp as f64 + (micro as f64) / 1_000_000.0,
            None => header.timestamp as f64,
        };

        match record.message {
            MrtMessage::TableDumpMessage(msg) => {
                let a = get_relevant_attributes(msg.attributes);
                let origin_asns = a.as_path.as_ref().and_then(AsPath::get_origin);

                elems.push(BgpElem {
                    timestamp,
                    elem_type: ElemType::ANNOUNCE,
                    peer_ip: msg.peer_address,
                    peer_asn: msg.peer_asn,
                    prefix: msg.prefix,
                    next_hop: a.next_hop,
                    as_path: a.as_path,
                    origin_asns,
                    origin: a.origin,
                    local_pref: a.local_pref,
                    med: a.med,
                    communities: a.communities,
                    atomic: a.atomic,
                    aggr_asn: a.aggregator.map(|v| v.0),
                    aggr_ip: a.aggregator.map(|v| v.1),
                    ..Default::default()
                });
            }

            MrtMessage::TableDumpV2Message(msg) => match msg {
                TableDumpV2Message::PeerIndexTable(p) => {
                    self.peer_table = Some(p);
                }
                TableDumpV2Message::RibAfi(t) => {
                    let peer_table = match &self.peer_table {
                        Some(t) => t,
                        None => {
                            warn!("RIB entry seen before PEER_INDEX_TABLE, skipping");
                            return elems;
                        }
                    };
                    for entry in t.rib_entries {
                        let peer = match peer_table.id_peer_map.get(&entry.peer_index) {
                            Some(p) => p,
                            None => {
                                warn!("unknown peer index {} in RIB entry", entry.peer_index);
                                continue;
                            }
                        };
                        let a = get_relevant_attributes(entry.attributes);
                        let path = merge_as_paths(a.as_path, a.as4_path);
                        let next_hop = a
                            .next_hop
                            .or_else(|| a.announced.as_ref().and_then(|n| n.next_hop).map(next_hop_addr));
                        let origin_asns = path.as_ref().and_then(AsPath::get_origin);

                        elems.push(BgpElem {
                            timestamp,
                            elem_type: ElemType::ANNOUNCE,
                            peer_ip: peer.peer_ip,
                            peer_asn: peer.peer_asn,
                            prefix: t.prefix,
                            next_hop,
                            as_path: path,
                            origin_asns,
                            origin: a.origin,
                            local_pref: a.local_pref,
                            med: a.med,
                            communities: a.communities,
                            atomic: a.atomic,
                            aggr_asn: a.aggregator.map(|v| v.0),
                            aggr_ip: a.aggregator.map(|v| v.1),
                            ..Default::default()
                        });
                    }
                }
                TableDumpV2Message::RibGeneric(_) => {
                    warn!("RibGeneric records are not converted to elements");
                }
                TableDumpV2Message::GeoPeerTable(_) => {
                    // no BGP reachability information carried here
                }
            },

            MrtMessage::Bgp4Mp(msg) => match msg {
                Bgp4MpEnum::StateChange(_) => {}
                Bgp4MpEnum::Message(v) => {
                    let peer_ip = v.peer_ip;
                    let peer_asn = v.peer_asn;
                    if let BgpMessage::Update(update) = v.bgp_message {
                        let a = get_relevant_attributes(update.attributes);
                        let path = merge_as_paths(a.as_path, a.as4_path);
                        let origin_asns = path.as_ref().and_then(AsPath::get_origin);

                        let make_announce = |prefix: NetworkPrefix| BgpElem {
                            timestamp,
                            elem_type: ElemType::ANNOUNCE,
                            peer_ip,
                            peer_asn,
                            prefix,
                            next_hop: a.next_hop,
                            as_path: path.clone(),
                            origin_asns: origin_asns.clone(),
                            origin: a.origin,
                            local_pref: a.local_pref,
                            med: a.med,
                            communities: a.communities.clone(),
                            atomic: a.atomic,
                            aggr_asn: a.aggregator.map(|v| v.0),
                            aggr_ip: a.aggregator.map(|v| v.1),
                            ..Default::default()
                        };
                        let make_withdraw = |prefix: NetworkPrefix| BgpElem {
                            timestamp,
                            elem_type: ElemType::WITHDRAW,
                            peer_ip,
                            peer_asn,
                            prefix,
                            ..Default::default()
                        };

                        elems.extend(update.announced_prefixes.into_iter().map(make_announce));
                        if let Some(nlri) = a.announced {
                            elems.extend(nlri.prefixes.into_iter().map(make_announce));
                        }
                        elems.extend(update.withdrawn_prefixes.into_iter().map(make_withdraw));
                        if let Some(nlri) = a.withdrawn {
                            elems.extend(nlri.prefixes.into_iter().map(make_withdraw));
                        }
                    }
                    // Open, Notification, and KeepAlive carry no reachability info.
                }
            },
        }

        elems
    }
}
