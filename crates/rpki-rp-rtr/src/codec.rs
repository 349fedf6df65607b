// This file is part of rpki-rp.
// SPDX-License-Identifier: Apache-2.0

//! Byte-exact encode/decode for the seven PDU kinds. No I/O: a
//! pure `&[u8] <-> RtrPdu` conversion so it's independent of whatever
//! transport ends up driving it (see [`crate::server`]).

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::pdu::{BadData, ErrorPdu, Ipv4PrefixPdu, Ipv6PrefixPdu, RtrErrorCode, RtrPdu};

const PROTOCOL_VERSION: u8 = 0;

const PDU_TYPE_RESET_QUERY: u8 = 2;
const PDU_TYPE_CACHE_RESPONSE: u8 = 3;
const PDU_TYPE_IPV4_PREFIX: u8 = 4;
const PDU_TYPE_IPV6_PREFIX: u8 = 6;
const PDU_TYPE_END_OF_DATA: u8 = 7;
const PDU_TYPE_ERROR: u8 = 10;

/// Encodes `value`'s big-endian representation into exactly `width` bytes:
/// left-zero-padded if the value's natural width is narrower, right-
/// truncated (keeping the low-order bytes) if wider.
pub fn encode_be_fixed(value: u64, width: usize) -> Vec<u8> {
    let full = value.to_be_bytes();
    if width >= full.len() {
        let mut out = vec![0u8; width - full.len()];
        out.extend_from_slice(&full);
        out
    } else {
        full[full.len() - width..].to_vec()
    }
}

fn encode_header(pdu_type: u8, header_short: u16, total_length: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(total_length as usize);
    buf.push(PROTOCOL_VERSION);
    buf.push(pdu_type);
    buf.extend_from_slice(&header_short.to_be_bytes());
    buf.extend_from_slice(&total_length.to_be_bytes());
    buf
}

/// Encodes `pdu` into exactly as many bytes as its header's length field
/// declares.
pub fn encode(pdu: &RtrPdu) -> Vec<u8> {
    match pdu {
        RtrPdu::ResetQuery => encode_header(PDU_TYPE_RESET_QUERY, 0, 8),
        RtrPdu::CacheResponse { nonce } => encode_header(PDU_TYPE_CACHE_RESPONSE, *nonce, 8),
        RtrPdu::Ipv4Prefix(p) => {
            let mut buf = encode_header(PDU_TYPE_IPV4_PREFIX, 0, 20);
            buf.push(p.flags);
            buf.push(p.prefix_length);
            buf.push(p.max_length);
            buf.push(0); // reserved
            buf.extend_from_slice(&p.prefix.octets());
            buf.extend_from_slice(&encode_be_fixed(p.asn as u64, 4));
            buf
        }
        RtrPdu::Ipv6Prefix(p) => {
            let mut buf = encode_header(PDU_TYPE_IPV6_PREFIX, 0, 32);
            buf.push(p.flags);
            buf.push(p.prefix_length);
            buf.push(p.max_length);
            buf.push(0); // reserved
            buf.extend_from_slice(&p.prefix.octets());
            buf.extend_from_slice(&encode_be_fixed(p.asn as u64, 4));
            buf
        }
        RtrPdu::EndOfData { nonce, serial } => {
            let mut buf = encode_header(PDU_TYPE_END_OF_DATA, *nonce, 12);
            buf.extend_from_slice(&serial.to_be_bytes());
            buf
        }
        RtrPdu::Error(err) => {
            let causing_len = err.causing_pdu.len() as u32;
            let text_bytes = err.error_text.as_bytes();
            let text_len = text_bytes.len() as u32;
            let total_length = 8 + 4 + causing_len + 4 + text_len;
            let mut buf = encode_header(PDU_TYPE_ERROR, err.error_code.to_u16(), total_length);
            buf.extend_from_slice(&causing_len.to_be_bytes());
            buf.extend_from_slice(&err.causing_pdu);
            buf.extend_from_slice(&text_len.to_be_bytes());
            buf.extend_from_slice(text_bytes);
            buf
        }
    }
}

/// A cursor over a decode buffer; every read is bounds-checked so any read
/// past the end becomes `None` rather than a panic ("any read past
/// end of buffer -> BadData(CorruptData)").
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8], pos: usize) -> Self {
        Cursor { bytes, pos }
    }

    fn read_u8(&mut self) -> Option<u8> {
        let b = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn read_exact(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let slice = self.bytes.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn read_u32(&mut self) -> Option<u32> {
        let slice = self.read_exact(4)?;
        Some(u32::from_be_bytes(slice.try_into().unwrap()))
    }
}

fn corrupt(bytes: &[u8]) -> BadData {
    BadData {
        error_code: RtrErrorCode::CorruptData,
        raw_bytes: bytes.to_vec(),
    }
}

fn decode_ipv4_prefix(bytes: &[u8]) -> Result<RtrPdu, BadData> {
    let mut cur = Cursor::new(bytes, 8);
    let flags = cur.read_u8().ok_or_else(|| corrupt(bytes))?;
    if flags > 1 {
        return Err(corrupt(bytes));
    }
    let prefix_length = cur.read_u8().ok_or_else(|| corrupt(bytes))?;
    let max_length = cur.read_u8().ok_or_else(|| corrupt(bytes))?;
    let _reserved = cur.read_u8().ok_or_else(|| corrupt(bytes))?;
    let octets = cur.read_exact(4).ok_or_else(|| corrupt(bytes))?;
    let prefix = Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]);
    let asn = cur.read_u32().ok_or_else(|| corrupt(bytes))?;
    Ok(RtrPdu::Ipv4Prefix(Ipv4PrefixPdu {
        flags,
        prefix_length,
        max_length,
        prefix,
        asn,
    }))
}

fn decode_ipv6_prefix(bytes: &[u8]) -> Result<RtrPdu, BadData> {
    let mut cur = Cursor::new(bytes, 8);
    let flags = cur.read_u8().ok_or_else(|| corrupt(bytes))?;
    if flags > 1 {
        return Err(corrupt(bytes));
    }
    let prefix_length = cur.read_u8().ok_or_else(|| corrupt(bytes))?;
    let max_length = cur.read_u8().ok_or_else(|| corrupt(bytes))?;
    let _reserved = cur.read_u8().ok_or_else(|| corrupt(bytes))?;
    // Read all 16 prefix bytes sequentially from the current position.
    let octets = cur.read_exact(16).ok_or_else(|| corrupt(bytes))?;
    let mut addr = [0u8; 16];
    addr.copy_from_slice(octets);
    let prefix = Ipv6Addr::from(addr);
    let asn = cur.read_u32().ok_or_else(|| corrupt(bytes))?;
    Ok(RtrPdu::Ipv6Prefix(Ipv6PrefixPdu {
        flags,
        prefix_length,
        max_length,
        prefix,
        asn,
    }))
}

fn decode_end_of_data(bytes: &[u8], nonce: u16) -> Result<RtrPdu, BadData> {
    let mut cur = Cursor::new(bytes, 8);
    let serial = cur.read_u32().ok_or_else(|| corrupt(bytes))?;
    Ok(RtrPdu::EndOfData { nonce, serial })
}

fn decode_error(bytes: &[u8], header_short: u16) -> Result<RtrPdu, BadData> {
    let error_code = RtrErrorCode::from_u16(header_short).ok_or_else(|| corrupt(bytes))?;
    let mut cur = Cursor::new(bytes, 8);
    let causing_len = cur.read_u32().ok_or_else(|| corrupt(bytes))? as usize;
    let causing_pdu = cur.read_exact(causing_len).ok_or_else(|| corrupt(bytes))?.to_vec();
    // Read exactly error_text_len bytes from the current position, UTF-8 decoded.
    let text_len = cur.read_u32().ok_or_else(|| corrupt(bytes))? as usize;
    let text_bytes = cur.read_exact(text_len).ok_or_else(|| corrupt(bytes))?;
    let error_text = String::from_utf8(text_bytes.to_vec()).map_err(|_| corrupt(bytes))?;
    Ok(RtrPdu::Error(ErrorPdu {
        error_code,
        causing_pdu,
        error_text,
    }))
}

/// Decodes one PDU from `bytes`. `bytes` must contain at least the whole PDU
/// (the header's length field); trailing bytes are ignored.
pub fn decode(bytes: &[u8]) -> Result<RtrPdu, BadData> {
    if bytes.len() < 8 {
        return Err(corrupt(bytes));
    }
    let version = bytes[0];
    if version != PROTOCOL_VERSION {
        return Err(BadData {
            error_code: RtrErrorCode::UnsupportedProtocolVersion,
            raw_bytes: bytes.to_vec(),
        });
    }
    let pdu_type = bytes[1];
    let header_short = u16::from_be_bytes([bytes[2], bytes[3]]);

    match pdu_type {
        PDU_TYPE_RESET_QUERY => Ok(RtrPdu::ResetQuery),
        PDU_TYPE_CACHE_RESPONSE => Ok(RtrPdu::CacheResponse { nonce: header_short }),
        PDU_TYPE_IPV4_PREFIX => decode_ipv4_prefix(bytes),
        PDU_TYPE_IPV6_PREFIX => decode_ipv6_prefix(bytes),
        PDU_TYPE_END_OF_DATA => decode_end_of_data(bytes, header_short),
        PDU_TYPE_ERROR => decode_error(bytes, header_short),
        _ => Err(BadData {
            error_code: RtrErrorCode::UnsupportedPduType,
            raw_bytes: bytes.to_vec(),
        }),
    }
}

/// Reads the 4-byte total-length field out of a PDU's header, so a stream
/// reader knows how many more bytes to buffer before calling [`decode`].
pub fn peek_total_length(header: &[u8; 8]) -> u32 {
    u32::from_be_bytes([header[4], header[5], header[6], header[7]])
}
