mod common;
mod dns;
mod http;
mod probe;
mod report;

pub use common::*;
pub use dns::*;
pub use http::*;
pub use probe::*;
pub use report::*;
