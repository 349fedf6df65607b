// This file is part of rpki-rp.
// SPDX-License-Identifier: Apache-2.0

//! The seven RTR PDU kinds this codec recognizes, plus the error-code
//! catalogue and the decode-failure type.

use std::net::{Ipv4Addr, Ipv6Addr};

/// RFC 6810/8210 §5.10 error codes. All but [`RtrErrorCode::NoDataAvailable`]
/// are fatal to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum RtrErrorCode {
    CorruptData = 0,
    InternalError = 1,
    NoDataAvailable = 2,
    InvalidRequest = 3,
    UnsupportedProtocolVersion = 4,
    UnsupportedPduType = 5,
    WithdrawalOfUnknownRecord = 6,
    DuplicateAnnouncementReceived = 7,
}

impl RtrErrorCode {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(RtrErrorCode::CorruptData),
            1 => Some(RtrErrorCode::InternalError),
            2 => Some(RtrErrorCode::NoDataAvailable),
            3 => Some(RtrErrorCode::InvalidRequest),
            4 => Some(RtrErrorCode::UnsupportedProtocolVersion),
            5 => Some(RtrErrorCode::UnsupportedPduType),
            6 => Some(RtrErrorCode::WithdrawalOfUnknownRecord),
            7 => Some(RtrErrorCode::DuplicateAnnouncementReceived),
            _ => None,
        }
    }

    pub fn to_u16(self) -> u16 {
        self as u16
    }

    /// Every error code except `NoDataAvailable` closes the session.
    pub fn is_fatal(self) -> bool {
        !matches!(self, RtrErrorCode::NoDataAvailable)
    }
}

/// A decode failure: the RFC error code it maps to, and the raw bytes that
/// caused it (so a caller can echo them back in an outbound ErrorPdu's
/// `causing_pdu` field).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("RTR decode error: {error_code:?}")]
pub struct BadData {
    pub error_code: RtrErrorCode,
    pub raw_bytes: Vec<u8>,
}

/// IPv4 Prefix PDU (type 4). `flags` bit 0 distinguishes announce (1) from
/// withdraw (0) — both are decoded; see [`Ipv4PrefixPdu::is_announcement`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ipv4PrefixPdu {
    pub flags: u8,
    pub prefix_length: u8,
    pub max_length: u8,
    pub prefix: Ipv4Addr,
    pub asn: u32,
}

impl Ipv4PrefixPdu {
    pub fn is_announcement(&self) -> bool {
        self.flags & 0x01 != 0
    }

    pub fn is_withdrawal(&self) -> bool {
        !self.is_announcement()
    }
}

/// IPv6 Prefix PDU (type 6). Same flag semantics as [`Ipv4PrefixPdu`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ipv6PrefixPdu {
    pub flags: u8,
    pub prefix_length: u8,
    pub max_length: u8,
    pub prefix: Ipv6Addr,
    pub asn: u32,
}

impl Ipv6PrefixPdu {
    pub fn is_announcement(&self) -> bool {
        self.flags & 0x01 != 0
    }

    pub fn is_withdrawal(&self) -> bool {
        !self.is_announcement()
    }
}

/// Error Report PDU (type 10).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorPdu {
    pub error_code: RtrErrorCode,
    pub causing_pdu: Vec<u8>,
    pub error_text: String,
}

/// The seven PDU kinds this codec speaks. `ResetQuery` and `CacheResponse`
/// have no body; `CacheResponse`/`EndOfData`'s header-short field is the
/// session nonce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RtrPdu {
    ResetQuery,
    CacheResponse { nonce: u16 },
    Ipv4Prefix(Ipv4PrefixPdu),
    Ipv6Prefix(Ipv6PrefixPdu),
    EndOfData { nonce: u16, serial: u32 },
    Error(ErrorPdu),
}
