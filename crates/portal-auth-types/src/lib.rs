//! Auth types shared across College Portal services.
//!
//! Session and cookie handling live in the gateway; services only see the
//! `IdentityHeaders` it injects.

pub mod identity;
