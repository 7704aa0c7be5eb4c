/*!
# AR Verify: Verification Options
*/

use crate::ChecksumVersion;



/// # FLAG: Match V1 Checksums.
const FLAG_V1: u8 =      0b0000_0001;

/// # FLAG: Match V2 Checksums.
const FLAG_V2: u8 =      0b0000_0010;

/// # FLAG: Lenient Header Matching.
const FLAG_LENIENT: u8 = 0b0000_0100;

/// # FLAG: Verbose Report.
const FLAG_VERBOSE: u8 = 0b0000_1000;

/// # FLAG: Default.
const FLAG_DEFAULT: u8 = FLAG_V1 | FLAG_V2;

/// # Maximum Confidence.
const CONFIDENCE_MAX: u8 = 99;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Verification Options.
///
/// Options are set using builder-style methods, like:
///
/// ```
/// use arverify_core::{
///     ChecksumVersion,
///     VerifyOptions,
/// };
///
/// let opts = VerifyOptions::default()
///     .with_confidence(2)
///     .with_v2(false);
///
/// assert_eq!(opts.confidence(), 2);
/// assert_eq!(opts.versions(), &[ChecksumVersion::V1]);
/// ```
pub struct VerifyOptions {
	confidence: u8,
	flags: u8,
}

impl Default for VerifyOptions {
	fn default() -> Self {
		Self {
			confidence: 0,
			flags: FLAG_DEFAULT,
		}
	}
}

macro_rules! with_flag {
	($fn:ident, $flag:ident, $($doc:literal),+ $(,)?) => (
		#[must_use]
		$(
			#[doc = $doc]
		)+
		pub const fn $fn(self, v: bool) -> Self {
			let flags =
				if v { self.flags | $flag }
				else { self.flags & ! $flag };

			Self {
				flags,
				..self
			}
		}
	)
}

/// ## Setters.
impl VerifyOptions {
	#[must_use]
	/// # Minimum Confidence.
	///
	/// Database matches with a confidence lower than this are treated as
	/// though they didn't match at all.
	///
	/// AccurateRip only publishes checksums after they have been confirmed, so
	/// any match provides reasonable statistical certainty. The default of
	/// `0` accepts any match; values are capped at `99`.
	pub const fn with_confidence(self, mut confidence: u8) -> Self {
		if CONFIDENCE_MAX < confidence { confidence = CONFIDENCE_MAX; }
		Self {
			confidence,
			..self
		}
	}

	with_flag!(
		with_lenient,
		FLAG_LENIENT,
		"# Lenient Header Matching.",
		"",
		"When `true`, database entries filed under a different disc identity",
		"are scored like any other. When `false`, they are skipped (with a",
		"warning).",
		"",
		"The default is `false`.",
	);

	with_flag!(
		with_v1,
		FLAG_V1,
		"# Match V1 Checksums.",
		"",
		"The default is `true`.",
	);

	with_flag!(
		with_v2,
		FLAG_V2,
		"# Match V2 Checksums.",
		"",
		"The default is `true`.",
	);

	with_flag!(
		with_verbose,
		FLAG_VERBOSE,
		"# Verbose Report.",
		"",
		"When `true`, a detailed plain-text report is printed to STDOUT once",
		"verification completes.",
		"",
		"The default is `false`.",
	);
}



macro_rules! get_flag {
	($fn:ident, $flag:ident, $title:literal) => (
		#[must_use]
		#[doc = concat!("# ", $title, "?")]
		pub const fn $fn(&self) -> bool { $flag == self.flags & $flag }
	);
}

/// # Getters.
impl VerifyOptions {
	get_flag!(lenient, FLAG_LENIENT, "Lenient Header Matching");
	get_flag!(verbose, FLAG_VERBOSE, "Verbose Report");

	#[must_use]
	/// # Minimum Confidence.
	pub const fn confidence(&self) -> u8 { self.confidence }

	#[must_use]
	/// # Accept Confidence?
	///
	/// Returns `true` if a match of the given confidence clears the
	/// minimum. With the default minimum of zero, anything goes.
	pub const fn accepts(&self, confidence: i8) -> bool {
		self.confidence == 0 || (self.confidence as i16) <= (confidence as i16)
	}

	#[must_use]
	/// # Checksum Versions.
	///
	/// Return the checksum version(s) to match against. If both have been
	/// disabled, both are returned; matching nothing would be pointless.
	pub const fn versions(&self) -> &'static [ChecksumVersion] {
		match (FLAG_V1 == self.flags & FLAG_V1, FLAG_V2 == self.flags & FLAG_V2) {
			(true, false) => &[ChecksumVersion::V1],
			(false, true) => &[ChecksumVersion::V2],
			_ => &ChecksumVersion::ALL,
		}
	}
}
