//! Keep the enabled languages of a group of Transifex projects aligned.
//!
//! Projects are selected by name prefix; every language enabled on any of
//! them is added to the ones that lack it.

pub mod config;
pub mod error;
pub mod filter;
pub mod languages;
pub mod reconcile;
pub mod retry;
pub mod transifex;
