//! Registry implementations for fetching package catalogs

pub mod npm;

pub use npm::NpmRegistry;
