//! HTTP access to the task records API.

pub mod client;
pub mod error;

pub use client::RecordsClient;
pub use error::{
  ClientError,
  Result
};
