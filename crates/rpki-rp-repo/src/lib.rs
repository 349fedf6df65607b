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

//! The RPKI object and store data model: [`RepositoryObject`],
//! [`CertificateContext`], [`ValidatedObject`], [`ClassifiedObjects`], and
//! the [`Storage`]/[`RepoFetcher`] traits the walker validates against.
//!
//! Cryptographic decoding and verification of certificates, CRLs, manifests
//! and ROAs is out of scope here — the types here model only what a
//! trusted external validator is assumed to have already produced.

mod context;
mod hash;
mod object;
mod ski;
mod store;

#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use context::{CertificateContext, ClassifiedObjects, ValidatedObject};
pub use hash::ContentHash;
pub use object::{Crl, Manifest, ObjectKind, RepositoryObject, ResourceCertificate, Roa, Vrp};
pub use ski::Ski;
pub use store::{DecodedObject, FetchError, RepoFetcher, Storage};
