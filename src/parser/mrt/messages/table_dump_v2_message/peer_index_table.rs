use crate::models::{Afi, AsnLength, Peer, PeerIndexTable, PeerType};
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::Bytes;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};

/// Peer index table
///
/// RFC: https://www.rfc-editor.org/rfc/rfc6396#section-4.3.1
pub fn parse_peer_index_table(data: &mut Bytes) -> Result<PeerIndexTable, ParserError> {
    let collector_bgp_id = Ipv4Addr::from(data.read_u32()?);
    let view_name_length = data.read_u16()?;
    let view_name =
        String::from_utf8(data.read_n_bytes(view_name_length as usize)?).unwrap_or_default();

    let peer_count = data.read_u16()?;
    let mut id_peer_map = HashMap::with_capacity(peer_count as usize);
    let mut peer_ip_id_map = HashMap::with_capacity(peer_count as usize);

    for id in 0..peer_count {
        let peer_type = PeerType::from_bits_retain(data.read_u8()?);
        let afi = match peer_type.contains(PeerType::ADDRESS_FAMILY_IPV6) {
            true => Afi::Ipv6,
            false => Afi::Ipv4,
        };
        let asn_len = match peer_type.contains(PeerType::AS_SIZE_32BIT) {
            true => AsnLength::Bits32,
            false => AsnLength::Bits16,
        };

        let peer_bgp_id = Ipv4Addr::from(data.read_u32()?);
        let peer_ip: IpAddr = data.read_address(&afi)?;
        let peer_asn = data.read_asn(&asn_len)?;
        let peer = Peer {
            peer_type,
            peer_bgp_id,
            peer_ip,
            peer_asn,
        };
        peer_ip_id_map.insert(peer_ip, id);
        id_peer_map.insert(id, peer);
    }

    Ok(PeerIndexTable {
        collector_bgp_id,
        view_name,
        id_peer_map,
        peer_ip_id_map,
    })
}

impl PeerIndexTable {
    /// Adds a peer to the table if it isn't already present, returning its id either way.
    pub fn add_peer(&mut self, peer: Peer) -> u16 {
        if let Some(id) = self.peer_ip_id_map.get(&peer.peer_ip) {
            return *id;
        }
        let peer_id = self.id_peer_map.len() as u16;
        self.peer_ip_id_map.insert(peer.peer_ip, peer_id);
        self.id_peer_map.insert(peer_id, peer);
        peer_id
    }

    pub fn get_peer_by_id(&self, peer_id: &u16) -> Option<&Peer> {
        self.id_peer_map.get(peer_id)
    }

    pub fn get_peer_id_by_addr(&self, peer_addr: &IpAddr) -> Option<u16> {
        self.peer_ip_id_map.get(peer_addr).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BufMut;
    use std::str::FromStr;

    #[test]
    fn test_parse_peer_index_table() {
        let mut bytes = bytes::BytesMut::new();
        bytes.put_u32(0x0A000001); // collector BGP ID: 10.0.0.1
        let view_name = "test";
        bytes.put_u16(view_name.len() as u16);
        bytes.extend_from_slice(view_name.as_bytes());
        bytes.put_u16(1); // peer count

        bytes.put_u8(0x00); // peer type: IPv4, 2-byte ASN
        bytes.put_u32(0x01010101); // peer BGP ID
        bytes.put_u32(0x02020202); // peer IP
        bytes.put_u16(65000); // peer ASN

        let mut data = bytes.freeze();
        let table = parse_peer_index_table(&mut data).unwrap();
        assert_eq!(table.collector_bgp_id, Ipv4Addr::from_str("10.0.0.1").unwrap());
        assert_eq!(table.view_name, "test");
        assert_eq!(table.id_peer_map.len(), 1);
        assert_eq!(
            table.get_peer_id_by_addr(&IpAddr::V4(Ipv4Addr::from_str("2.2.2.2").unwrap())),
            Some(0)
        );
    }
}
