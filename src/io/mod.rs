//! Diagnostic writers.

pub mod domain_decomp;

pub use domain_decomp::{write_domain_decomp, write_domain_decomp_to};
