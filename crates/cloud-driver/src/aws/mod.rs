//! AWS EKS provider
//!
//! - `models` - native EKS / IAM / Auto Scaling shapes
//! - `api` - the native call surface ([`EksApi`])
//! - `client` - HTTP implementation of [`EksApi`]
//! - `errors` - native error codes and the AWS [`ErrorDialect`](crate::normalize::ErrorDialect)
//! - `adapter` - translation to and from the canonical model

pub mod adapter;
pub mod api;
pub mod client;
pub mod errors;
pub mod models;

pub use adapter::{AwsAdapter, RoleConvention};
pub use api::EksApi;
pub use client::EksClient;
pub use errors::{AWS_DIALECT, AWS_ERROR_TABLE};
