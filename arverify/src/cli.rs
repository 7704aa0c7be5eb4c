/*!
# AR Verify: CLI
*/

use argyle::Argument;
use arverify_core::{
	ArVerifyError,
	AudioKind,
	TIMEOUT_DEFAULT,
	VerifyOptions,
};
use dactyl::traits::BytesToUnsigned;
use std::path::{
	Path,
	PathBuf,
};



#[derive(Debug)]
/// # Parsed Settings.
pub(super) struct Settings {
	/// # Verification Options.
	pub(super) opts: VerifyOptions,

	/// # Track Directory.
	pub(super) dir: PathBuf,

	/// # Network Timeout (Seconds).
	pub(super) timeout: u8,

	/// # Mirror.
	pub(super) base_url: Option<String>,

	/// # Identify Only.
	pub(super) no_fetch: bool,
}



/// # Parse Options.
pub(super) fn parse() -> Result<Settings, ArVerifyError> {
	let args = argyle::args()
		.with_keywords(include!(concat!(env!("OUT_DIR"), "/argyle.rs")));

	let mut opts = VerifyOptions::default();
	let mut v1 = false;
	let mut v2 = false;
	let mut timeout = TIMEOUT_DEFAULT;
	let mut base_url = None;
	let mut no_fetch = false;
	let mut dir = None;
	for arg in args {
		match arg {
			Argument::Key("-h" | "--help") => return Err(ArVerifyError::PrintHelp),
			Argument::Key("--lenient") => { opts = opts.with_lenient(true); },
			Argument::Key("--no-fetch") => { no_fetch = true; },
			Argument::Key("--v1") => { v1 = true; },
			Argument::Key("--v2") => { v2 = true; },
			Argument::Key("-v" | "--verbose") => { opts = opts.with_verbose(true); },
			Argument::Key("-V" | "--version") => return Err(ArVerifyError::PrintVersion),

			Argument::KeyWithValue("--base-url", s) => { base_url.replace(s); },
			Argument::KeyWithValue("-c" | "--confidence", s) => {
				opts = opts.with_confidence(parse_confidence(s.as_bytes())?);
			},
			Argument::KeyWithValue("--timeout", s) => {
				timeout = parse_timeout(s.as_bytes())?;
			},

			// Anything else should be the directory.
			Argument::Other(s) => {
				if s.starts_with('-') || dir.is_some() {
					return Err(ArVerifyError::CliArg(s));
				}
				dir.replace(PathBuf::from(s));
			},

			_ => {},
		}
	}

	// Both or neither means both.
	if v1 != v2 { opts = opts.with_v1(v1).with_v2(v2); }

	let dir = dir.ok_or(ArVerifyError::CliParse("<DIR>"))?;
	let dir = std::fs::canonicalize(&dir)
		.ok()
		.filter(|p| p.is_dir())
		.ok_or_else(|| ArVerifyError::CliArg(dir.to_string_lossy().into_owned()))?;

	Ok(Settings { opts, dir, timeout, base_url, no_fetch })
}

/// # List Tracks.
///
/// Find all the FLAC and WAV files in the directory (non-recursively), and
/// sort them into disc order.
pub(super) fn list_tracks(dir: &Path) -> Result<Vec<PathBuf>, ArVerifyError> {
	let no_tracks = || ArVerifyError::NoTracks(dir.to_string_lossy().into_owned());

	let mut out: Vec<PathBuf> = std::fs::read_dir(dir)
		.map_err(|_| no_tracks())?
		.filter_map(|e| {
			let path = e.ok()?.path();
			if path.is_file() && AudioKind::try_from(path.as_path()).is_ok() { Some(path) }
			else { None }
		})
		.collect();

	if out.is_empty() { Err(no_tracks()) }
	else {
		sort_tracks(&mut out);
		Ok(out)
	}
}



/// # Parse Confidence.
fn parse_confidence(v: &[u8]) -> Result<u8, ArVerifyError> {
	u8::btou(v.trim_ascii())
		.filter(|n| *n <= 99)
		.ok_or(ArVerifyError::CliParse("-c/--confidence"))
}

/// # Parse Timeout.
fn parse_timeout(v: &[u8]) -> Result<u8, ArVerifyError> {
	u8::btou(v.trim_ascii())
		.filter(|n| (1..=120).contains(n))
		.ok_or(ArVerifyError::CliParse("--timeout"))
}

/// # Sort Tracks.
///
/// Order by file name, case-insensitively, falling back to the raw bytes to
/// break ties.
fn sort_tracks(paths: &mut [PathBuf]) {
	paths.sort_by_cached_key(|p| {
		let name = p.file_name().unwrap_or_default().as_encoded_bytes().to_vec();
		(name.to_ascii_lowercase(), name)
	});
}
