/*!
# AR Verify: Transport
*/

use crate::{
	AR_BASE_URL,
	ArVerifyError,
};
use std::time::Duration;
use ureq::{
	Agent,
	AgentBuilder,
};



/// # Default Timeout (Seconds).
pub const TIMEOUT_DEFAULT: u8 = 15;

/// # Maximum Timeout (Seconds).
const TIMEOUT_MAX: u8 = 120;



/// # Transport.
///
/// This is the seam between the verification logic and the network. The
/// default implementation is [`HttpTransport`]; tests and alternative
/// frontends can supply their own.
pub trait Transport {
	/// # Fetch.
	///
	/// Return the raw bytes served at the URL.
	///
	/// ## Errors
	///
	/// Implementations should return [`ArVerifyError::NotFound`] if the
	/// server has no such file, and [`ArVerifyError::Transport`] for any other
	/// failure.
	fn fetch(&self, url: &str) -> Result<Vec<u8>, ArVerifyError>;

	/// # Base URL.
	///
	/// The database root lookup paths are appended to.
	fn base_url(&self) -> &str { AR_BASE_URL }
}



#[derive(Debug)]
/// # HTTP Transport.
///
/// AccurateRip is served over plain HTTP, so this is just a bare `ureq`
/// agent with a timeout and a user agent.
pub struct HttpTransport {
	/// # Connection Agent.
	agent: Agent,

	/// # Base URL.
	base: Option<String>,
}

impl Default for HttpTransport {
	fn default() -> Self { Self::new(u64::from(TIMEOUT_DEFAULT)) }
}

impl HttpTransport {
	#[must_use]
	/// # New.
	///
	/// Create a new transport with the given timeout, in seconds. The value
	/// is clamped to `1..=120`.
	pub fn new(timeout: u64) -> Self {
		let timeout = timeout.clamp(1, u64::from(TIMEOUT_MAX));
		let agent = AgentBuilder::new()
			.timeout(Duration::from_secs(timeout))
			.user_agent(concat!(
				"Mozilla/5.0 (X11; Linux x86_64; rv:",
				env!("CARGO_PKG_VERSION"),
				") ARVerify/",
				env!("CARGO_PKG_VERSION"),
			))
			.max_idle_connections(0)
			.build();

		Self { agent, base: None }
	}

	#[must_use]
	/// # With Base URL.
	///
	/// Point lookups at an alternative mirror. Trailing slashes are ignored;
	/// an empty value restores the default.
	pub fn with_base_url<S>(self, base: S) -> Self
	where S: AsRef<str> {
		let base = base.as_ref().trim().trim_end_matches('/');
		Self {
			base:
				if base.is_empty() { None }
				else { Some(base.to_owned()) },
			..self
		}
	}
}

impl Transport for HttpTransport {
	fn fetch(&self, url: &str) -> Result<Vec<u8>, ArVerifyError> {
		let res = self.agent.get(url).call().map_err(|e| match e {
			ureq::Error::Status(404, _) => ArVerifyError::NotFound,
			ureq::Error::Status(code, _) => ArVerifyError::Transport(format!("HTTP {code}")),
			ureq::Error::Transport(e) => ArVerifyError::Transport(e.to_string()),
		})?;

		let mut out = Vec::new();
		res.into_reader()
			.read_to_end(&mut out)
			.map_err(|e| ArVerifyError::Transport(e.to_string()))?;
		Ok(out)
	}

	fn base_url(&self) -> &str { self.base.as_deref().unwrap_or(AR_BASE_URL) }
}
