pub mod config;
pub mod dump;
pub mod emit;
pub mod encode;
pub mod error;
pub mod ident;
pub mod label;
pub mod macros;
pub mod msg;
pub mod parser;
pub mod resolve;
pub mod scan;
pub mod store;

pub use config::Config;
pub use error::{Error, Fatal};
pub use resolve::Assembly;

/// Both passes over already expanded source. Each call owns a fresh store.
pub fn assemble(path: &str, source: &str, config: &Config) -> Result<Assembly, Fatal> {
    let lines = parser::Line::split(path, source);
    let scanned = scan::scan(lines, config)?;
    resolve::resolve(scanned, config)
}
