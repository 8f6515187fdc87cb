//! Input validation.
//!
//! Everything here runs before any network activity:
//! - `host:port` addresses for the reachability check
//! - `http`/`https` URLs for the request modes
//! - flag combinations that cannot be honored together

mod address;
mod preconditions;
mod url;

pub use address::{parse_address, HostPort};
pub use self::url::parse_target_url;
