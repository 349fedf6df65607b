// This file is part of rpki-rp.
// SPDX-License-Identifier: Apache-2.0

//! Programmer-error preconditions for the walker. These are
//! not validation findings — a real RPKI tree never triggers them — they
//! indicate a bug in the caller wiring the walker up, and are typed rather
//! than panicking so the `rpki-rp-cli` boundary can log-and-exit instead of
//! aborting the process.

use rpki_rp_checks::ValidationLocation;

#[derive(thiserror::Error, Debug)]
pub enum WalkerError {
    #[error("walker precondition violated: {location} is not an object-issuing CA certificate")]
    NotAnIssuingCa { location: ValidationLocation },

    #[error("walker precondition violated: SKI for {location} is already in the seen set")]
    DuplicateSki { location: ValidationLocation },
}
