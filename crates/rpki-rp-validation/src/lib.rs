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

//! The validation core: the manifest/CRL selector, the manifest
//! cross-checker, and the top-down walker that drives both of them
//! over a repository store.
//!
//! Cryptographic verification of any object is out of scope here — it is
//! modeled entirely by the [`ObjectValidator`] trait, the seam a real X.509/
//! CMS validator plugs into.

mod crosscheck;
mod error;
mod selector;
mod validator;
mod walker;

pub use crosscheck::cross_check_manifest;
pub use error::WalkerError;
pub use selector::{select_current_crl, select_current_manifest, SelectionOutcome};
pub use validator::ObjectValidator;
pub use walker::{WalkOutcome, Walker};
