//! Rust’s turnkey Pact Broker client—HAL navigation, dialect-aware pact discovery, and
//! credential-safe pact locations in one crate built for provider verification.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod error;
pub mod hal;
pub mod http;
pub mod obs;
pub mod request;
pub mod resolve;
pub mod uri;

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::blocking::Client as ReqwestClient;
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
