//! The Rust SDK for Hyphen: feature toggles, IP geolocation and link shortening.
//!
//! # Overview
//!
//! The SDK revolves around three service clients:
//! - [`Toggle`] evaluates feature toggles for a targeting context. Evaluation always yields a
//!   value: when the service cannot be reached, the caller's default is returned.
//! - [`NetInfo`] looks up the location of IP addresses.
//! - [`Link`] manages short codes and their QR codes.
//!
//! Each client is created from its own configuration ([`ToggleConfig`], [`NetInfoConfig`],
//! [`LinkConfig`]), or all at once through [`HyphenConfig`] and [`Hyphen`].
//!
//! All network operations are `async`. Dropping a future cancels the request in flight.
//!
//! # Error Handling
//!
//! Errors are represented by the [`Error`] enum.
//!
//! Toggle evaluation never fails from the caller's point of view: errors are reported to the
//! configured [`ErrorHandler`] and the default value is used. NetInfo and Link operations return
//! their errors and report them to the error handler as well.
//!
//! # Logging
//!
//! The package uses the [`log`](https://docs.rs/log/latest/log/) crate for logging
//! messages under the `hyphen` target. Consider integrating a `log`-compatible logger
//! implementation for better visibility into SDK operations.
//!
//! # Examples
//!
//! Examples can be found in the `demos` directory of the crate repository.

#![warn(rustdoc::missing_crate_level_docs)]
#![warn(missing_docs)]

mod client;
mod config;
mod env;
mod error;
mod error_handler;

pub mod link;
pub mod netinfo;
pub mod toggle;
pub mod transport;

pub use client::Hyphen;
pub use config::HyphenConfig;
pub use env::{load_env_files, EnvConfig, LoadEnvOptions};
pub use error::{Error, Result, TransportError};
pub use error_handler::ErrorHandler;
pub use link::{Link, LinkConfig};
pub use netinfo::{NetInfo, NetInfoConfig};
pub use toggle::{Toggle, ToggleConfig};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
