//! Single-shot OAuth 2.0 client-credentials probe: acquire an app-only token from an authority,
//! replay an authorized HTTP request against a target API, and render what came back.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod authority;
pub mod cli;
pub mod console;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod options;
pub mod probe;
pub mod request;

mod _prelude {
	pub use std::{
		borrow::Cow,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::Result;
}

pub use reqwest;
pub use url;
// Binary-only dependencies.
use {color_eyre as _, tokio as _};
#[cfg(test)] use httpmock as _;
