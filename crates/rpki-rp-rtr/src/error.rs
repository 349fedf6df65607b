// This file is part of rpki-rp.
// SPDX-License-Identifier: Apache-2.0

//! The serving path's own error type. PDU decode failures never reach here —
//! those become an outbound [`crate::pdu::ErrorPdu`] and are handled inline;
//! this type only covers the socket itself failing underneath the protocol.

#[derive(thiserror::Error, Debug)]
pub enum RtrError {
    #[error("rtr connection I/O error")]
    Io(#[from] std::io::Error),
}
