//! Request dispatch for protocol connections.
//!
//! A connection handler reads one envelope, decrypts it, parses the request,
//! resolves its type in the registry, runs the resulting query against the
//! record store and writes exactly one encrypted response.

mod errors;
mod handler;
mod query;
mod registry;
mod request;
mod response;

pub use errors::DispatchError;
pub use handler::{DispatchConnectionHandler, DispatchContext};
pub use query::Query;
pub use registry::{RegistryEntry, RequestRegistry};

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
