// ddiq-api: Async Rust client for the InfoBlox WAPI (read-only object queries)

pub mod error;
pub mod transport;
pub mod wapi;

pub use error::Error;
pub use transport::{Credentials, TlsMode, TransportConfig};
pub use wapi::{IpFamily, WapiClient};
