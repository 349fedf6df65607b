// This file is part of rpki-rp.

// Copyright (C) The rpki-rp Authors.
// SPDX-License-Identifier: Apache-2.0

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// 	http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The RTR (RPKI-to-Router) protocol: a length-prefixed binary codec for
//! the seven PDU kinds draft-ietf-sidr-rpki-rtr defines, plus a Tokio-based
//! serving loop that streams a VRP snapshot to connected routers.
//!
//! The codec performs no I/O — it is pure `&[u8] -> RtrPdu` and
//! `&RtrPdu -> Vec<u8>` conversion, matching every non-Error PDU byte for
//! byte. [`server`] is the ambient serving path; it is the only part of this
//! crate that touches a socket.

pub mod codec;
mod error;
pub mod pdu;
pub mod server;

pub use codec::{decode, encode};
pub use error::RtrError;
pub use pdu::{BadData, ErrorPdu, Ipv4PrefixPdu, Ipv6PrefixPdu, RtrErrorCode, RtrPdu};
