//! Shared front end for the `fetch-td-demo` and `fetch-ra-demo` utilities.

pub mod cli;
