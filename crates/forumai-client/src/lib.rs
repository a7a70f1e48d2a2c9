//! Client side of the forumai HTTP API.

pub mod http;

pub use http::{ClassifierClient, ClientError};
