/*!
IO utility functions for reading fixed- and variable-length fields out of a
[`bytes::Buf`] and converting them into the corresponding wire types.
*/
use crate::error::ParserError;
use crate::models::*;
use bytes::Buf;
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

pub trait ReadUtils: Buf {
    #[inline]
    fn has_n_remaining(&self, n: usize) -> Result<(), ParserError> {
        if self.remaining() < n {
            return Err(ParserError::TruncatedMsg(format!(
                "not enough bytes to read: wanted {n}, {} remaining",
                self.remaining()
            )));
        }
        Ok(())
    }

    /// Errors unless exactly `n` bytes are left -- used for fixed-length
    /// attributes that should consume their whole value.
    fn expect_remaining_eq(&self, n: usize, attr_name: &str) -> Result<(), ParserError> {
        if self.remaining() != n {
            return Err(ParserError::ParseError(format!(
                "{attr_name}: expected exactly {n} bytes, found {}",
                self.remaining()
            )));
        }
        Ok(())
    }

    #[inline]
    fn read_8b(&mut self) -> Result<u8, ParserError> {
        self.read_u8()
    }

    #[inline]
    fn read_16b(&mut self) -> Result<u16, ParserError> {
        self.read_u16()
    }

    #[inline]
    fn read_32b(&mut self) -> Result<u32, ParserError> {
        self.read_u32()
    }

    fn read_u8(&mut self) -> Result<u8, ParserError> {
        self.has_n_remaining(1)?;
        Ok(Buf::get_u8(self))
    }

    fn read_u16(&mut self) -> Result<u16, ParserError> {
        self.has_n_remaining(2)?;
        Ok(Buf::get_u16(self))
    }

    fn read_u32(&mut self) -> Result<u32, ParserError> {
        self.has_n_remaining(4)?;
        Ok(Buf::get_u32(self))
    }

    fn read_u64(&mut self) -> Result<u64, ParserError> {
        self.has_n_remaining(8)?;
        Ok(Buf::get_u64(self))
    }

    fn read_ipv4_address(&mut self) -> Result<Ipv4Addr, ParserError> {
        Ok(Ipv4Addr::from(self.read_u32()?))
    }

    fn read_ipv6_address(&mut self) -> Result<Ipv6Addr, ParserError> {
        self.has_n_remaining(16)?;
        let mut buf = [0u8; 16];
        self.copy_to_slice(&mut buf);
        Ok(Ipv6Addr::from(buf))
    }

    fn read_address(&mut self, afi: &Afi) -> Result<IpAddr, ParserError> {
        Ok(match afi {
            Afi::Ipv4 => IpAddr::V4(self.read_ipv4_address()?),
            Afi::Ipv6 => IpAddr::V6(self.read_ipv6_address()?),
        })
    }

    fn read_ipv4_prefix(&mut self) -> Result<Ipv4Net, ParserError> {
        let addr = self.read_ipv4_address()?;
        let mask = self.read_u8()?;
        Ipv4Net::new(addr, mask)
            .map_err(|_| ParserError::ParseError(format!("invalid IPv4 prefix mask {mask}")))
    }

    fn read_ipv6_prefix(&mut self) -> Result<Ipv6Net, ParserError> {
        let addr = self.read_ipv6_address()?;
        let mask = self.read_u8()?;
        Ipv6Net::new(addr, mask)
            .map_err(|_| ParserError::ParseError(format!("invalid IPv6 prefix mask {mask}")))
    }

    fn read_afi(&mut self) -> Result<Afi, ParserError> {
        Ok(Afi::try_from(self.read_u16()?)?)
    }

    fn read_safi(&mut self) -> Result<Safi, ParserError> {
        Ok(Safi::try_from(self.read_u8()?)?)
    }

    fn read_asn(&mut self, asn_len: &AsnLength) -> Result<Asn, ParserError> {
        Ok(match asn_len {
            AsnLength::Bits16 => Asn::new_16bit(self.read_u16()?),
            AsnLength::Bits32 => Asn::new_32bit(self.read_u32()?),
        })
    }

    fn read_asns(&mut self, asn_len: &AsnLength, count: usize) -> Result<Vec<Asn>, ParserError> {
        (0..count).map(|_| self.read_asn(asn_len)).collect()
    }

    fn read_n_bytes(&mut self, n_bytes: usize) -> Result<Vec<u8>, ParserError> {
        self.has_n_remaining(n_bytes)?;
        let mut buf = vec![0u8; n_bytes];
        self.copy_to_slice(&mut buf);
        Ok(buf)
    }

    fn read_n_bytes_to_string(&mut self, n_bytes: usize) -> Result<String, ParserError> {
        Ok(self
            .read_n_bytes(n_bytes)?
            .into_iter()
            .map(|b| b as char)
            .collect())
    }

    /// Reads an announced/withdrawn prefix: an optional 4-byte path
    /// identifier (when `add_path`), a 1-byte prefix length in bits, then
    /// that many bytes of address.
    fn read_nlri_prefix(
        &mut self,
        afi: &Afi,
        add_path: bool,
    ) -> Result<NetworkPrefix, ParserError> {
        let path_id = if add_path { Some(self.read_u32()?) } else { None };
        let bit_len = self.read_u8()?;
        let byte_len = (bit_len as usize).div_ceil(8);
        let addr: IpAddr = match afi {
            Afi::Ipv4 => {
                if byte_len > 4 {
                    return Err(ParserError::ParseError(format!(
                        "invalid IPv4 prefix bit length {bit_len}"
                    )));
                }
                let mut buf = [0u8; 4];
                self.has_n_remaining(byte_len)?;
                self.copy_to_slice(&mut buf[..byte_len]);
                IpAddr::V4(Ipv4Addr::from(buf))
            }
            Afi::Ipv6 => {
                if byte_len > 16 {
                    return Err(ParserError::ParseError(format!(
                        "invalid IPv6 prefix bit length {bit_len}"
                    )));
                }
                let mut buf = [0u8; 16];
                self.has_n_remaining(byte_len)?;
                self.copy_to_slice(&mut buf[..byte_len]);
                IpAddr::V6(Ipv6Addr::from(buf))
            }
        };
        let prefix = IpNet::new(addr, bit_len)
            .map_err(|_| ParserError::ParseError(format!("invalid network prefix length {bit_len}")))?;
        Ok(NetworkPrefix::new(prefix, path_id))
    }

    /// Reads a VPN NLRI (RFC 4364): an optional 4-byte path identifier, a
    /// 1-byte total bit length covering `[MPLS label][route distinguisher][prefix]`,
    /// a 3-byte MPLS label, an 8-byte route distinguisher, then the prefix
    /// bits. The label and route distinguisher are consumed but not carried
    /// into the resulting [`NetworkPrefix`].
    fn read_vpn_nlri_prefix(
        &mut self,
        afi: &Afi,
        add_path: bool,
    ) -> Result<NetworkPrefix, ParserError> {
        let path_id = if add_path { Some(self.read_u32()?) } else { None };
        let total_bit_len = self.read_u8()?;

        self.has_n_remaining(3)?;
        let mut label = [0u8; 3];
        self.copy_to_slice(&mut label);

        self.has_n_remaining(8)?;
        let mut route_distinguisher = [0u8; 8];
        self.copy_to_slice(&mut route_distinguisher);

        let prefix_bit_len = (total_bit_len as usize).saturating_sub((3 + 8) * 8) as u8;
        let byte_len = (prefix_bit_len as usize).div_ceil(8);
        let addr: IpAddr = match afi {
            Afi::Ipv4 => {
                if byte_len > 4 {
                    return Err(ParserError::ParseError(format!(
                        "invalid VPN IPv4 prefix bit length {prefix_bit_len}"
                    )));
                }
                let mut buf = [0u8; 4];
                self.has_n_remaining(byte_len)?;
                self.copy_to_slice(&mut buf[..byte_len]);
                IpAddr::V4(Ipv4Addr::from(buf))
            }
            Afi::Ipv6 => {
                if byte_len > 16 {
                    return Err(ParserError::ParseError(format!(
                        "invalid VPN IPv6 prefix bit length {prefix_bit_len}"
                    )));
                }
                let mut buf = [0u8; 16];
                self.has_n_remaining(byte_len)?;
                self.copy_to_slice(&mut buf[..byte_len]);
                IpAddr::V6(Ipv6Addr::from(buf))
            }
        };
        let prefix = IpNet::new(addr, prefix_bit_len).map_err(|_| {
            ParserError::ParseError(format!("invalid VPN network prefix length {prefix_bit_len}"))
        })?;
        Ok(NetworkPrefix::new(prefix, path_id))
    }
}

impl<T: Buf> ReadUtils for T {}

/// Reads a run of consecutive `<length, prefix>` NLRI entries until `input`
/// is exhausted, guessing add-path framing if a non-add-path read produces a
/// suspicious zero-length prefix up front.
pub(crate) fn parse_nlri_list(
    mut input: bytes::Bytes,
    add_path: bool,
    afi: &Afi,
) -> Result<Vec<NetworkPrefix>, ParserError> {
    let saved = input.clone();
    let mut is_add_path = add_path;
    let mut guessed = false;
    let mut prefixes = vec![];

    let mut retry = false;
    while input.has_remaining() {
        if !is_add_path && input[0] == 0 {
            is_add_path = true;
            guessed = true;
        }
        match input.read_nlri_prefix(afi, is_add_path) {
            Ok(p) => prefixes.push(p),
            Err(e) => {
                if guessed {
                    retry = true;
                    break;
                }
                return Err(e);
            }
        }
    }

    if retry {
        prefixes.clear();
        let mut input = saved;
        while input.has_remaining() {
            prefixes.push(input.read_nlri_prefix(afi, add_path)?);
        }
    }

    Ok(prefixes)
}
