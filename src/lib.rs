//! pulp-selinux — manage the `pulp` SELinux policy module.
//!
//! Loads, inspects and removes the module in every policy variant's store
//! through the host `semodule` tool. Removal is best-effort and never fails,
//! so it can run from package uninstall hooks.
//!
//! See `DESIGN.md` for the architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cleanup;
pub mod config;
pub mod logging;
pub mod policy;
pub mod store;
