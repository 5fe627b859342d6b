//! HTTP request domain types

mod fingerprint;
mod header;
mod method;
mod query;
mod spec;

pub use fingerprint::RequestFingerprint;
pub use header::{Header, Headers};
pub use method::HttpMethod;
pub use query::{QueryParam, QueryParams};
pub use spec::RequestSpec;
