use crate::models::*;
use crate::parser::bgp::attributes::parse_attributes;
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::{Buf, Bytes};
use std::net::Ipv4Addr;

/// Parse one BGP message (OPEN / UPDATE / NOTIFICATION / KEEPALIVE), header included.
///
/// <https://datatracker.ietf.org/doc/html/rfc4271#section-4>
pub fn parse_bgp_message(
    data: &mut Bytes,
    add_path: bool,
    asn_len: &AsnLength,
) -> Result<BgpMessage, ParserError> {
    // 16-byte marker, ignored.
    data.advance(16);
    let length = data.read_u16()? as usize;
    if !(19..=4096).contains(&length) {
        return Err(ParserError::ParseError(format!(
            "invalid BGP message length {length}"
        )));
    }
    let msg_type = BgpMessageType::try_from(data.read_u8()?)
        .map_err(|_| ParserError::ParseError("unknown BGP message type".to_string()))?;
    let body_length = length - 19;
    data.has_n_remaining(body_length)?;
    let mut body = data.split_to(body_length);

    Ok(match msg_type {
        BgpMessageType::OPEN => BgpMessage::Open(parse_bgp_open_message(&mut body)?),
        BgpMessageType::UPDATE => {
            BgpMessage::Update(parse_bgp_update_message(body, add_path, asn_len)?)
        }
        BgpMessageType::NOTIFICATION => {
            BgpMessage::Notification(parse_bgp_notification_message(body)?)
        }
        BgpMessageType::KEEPALIVE => BgpMessage::KeepAlive,
    })
}

fn parse_bgp_notification_message(mut data: Bytes) -> Result<BgpNotificationMessage, ParserError> {
    let code = data.read_u8()?;
    let subcode = data.read_u8()?;
    let remaining = data.remaining();
    let payload = data.read_n_bytes(remaining)?;
    Ok(BgpNotificationMessage {
        error: BgpError::new(code, subcode),
        data: payload,
    })
}

fn parse_bgp_open_message(data: &mut Bytes) -> Result<BgpOpenMessage, ParserError> {
    let version = data.read_u8()?;
    let asn = Asn::new_16bit(data.read_u16()?);
    let hold_time = data.read_u16()?;
    let sender_ip: Ipv4Addr = data.read_ipv4_address()?;
    let opt_params_len = data.read_u8()? as usize;

    data.has_n_remaining(opt_params_len)?;
    let mut opt_data = data.split_to(opt_params_len);

    let mut opt_params = vec![];
    while opt_data.has_remaining() {
        let param_type = opt_data.read_u8()?;
        let param_len = opt_data.read_u8()? as u16;
        opt_data.has_n_remaining(param_len as usize)?;
        let mut param_data = opt_data.split_to(param_len as usize);

        let param_value = if param_type == 2 {
            let cap_type = param_data.read_u8()?;
            let cap_len = param_data.read_u8()? as usize;
            param_data.has_n_remaining(cap_len)?;
            let raw = param_data.read_n_bytes(cap_len)?;
            ParamValue::Capability(Capability {
                ty: BgpCapabilityType::from(cap_type),
                value: CapabilityValue::Raw(raw),
            })
        } else {
            let remaining = param_data.remaining();
            ParamValue::Raw(param_data.read_n_bytes(remaining)?)
        };

        opt_params.push(OptParam {
            param_type,
            param_len,
            param_value,
        });
    }

    Ok(BgpOpenMessage {
        version,
        asn,
        hold_time,
        sender_ip,
        extended_length: false,
        opt_params,
    })
}

/// Reads a flat (non-MP-BGP) list of withdrawn/announced prefixes: a byte
/// run of consecutive `<length, prefix>` entries, IPv4 unicast only.
fn read_nlri(data: Bytes, add_path: bool) -> Result<Vec<NetworkPrefix>, ParserError> {
    let mut data = data;
    let mut prefixes = vec![];
    while data.has_remaining() {
        prefixes.push(data.read_nlri_prefix(&Afi::Ipv4, add_path)?);
    }
    Ok(prefixes)
}

fn parse_bgp_update_message(
    mut data: Bytes,
    add_path: bool,
    asn_len: &AsnLength,
) -> Result<BgpUpdateMessage, ParserError> {
    let withdrawn_length = data.read_u16()? as usize;
    data.has_n_remaining(withdrawn_length)?;
    let withdrawn_prefixes = read_nlri(data.split_to(withdrawn_length), add_path)?;

    let attribute_length = data.read_u16()? as usize;
    data.has_n_remaining(attribute_length)?;
    let attr_data = data.split_to(attribute_length);
    let attributes = parse_attributes(attr_data, asn_len, add_path, None, None, None)?;

    let announced_prefixes = read_nlri(data, add_path)?;

    Ok(BgpUpdateMessage {
        withdrawn_prefixes,
        attributes,
        announced_prefixes,
    })
}
