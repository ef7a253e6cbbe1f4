//! Web server module serving the report as an HTML page.

mod server;

pub use server::*;
