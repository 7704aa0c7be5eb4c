/*!
# AR Verify: Errors
*/

use fyi_msg::Msg;
use std::{
	error::Error,
	fmt,
};



#[cfg(feature = "bin")]
/// # Help Text.
const HELP: &str = concat!(r"
AR Verify v", env!("CARGO_PKG_VERSION"), r"
Verify ripped CD audio tracks against the AccurateRip database.

USAGE:
    arverify [OPTIONS] <DIR>

CHECKSUM SETTINGS:
    -c, --confidence <NUM>
                      Only count database matches with a confidence of at
                      least <NUM>. [default: 0 (any); max: 99]
        --lenient     Score database entries whose disc IDs differ from the
                      local disc instead of ignoring them (with a warning).
        --v1          Only compute and match AccurateRip v1 checksums.
        --v2          Only compute and match AccurateRip v2 checksums.

NETWORK SETTINGS:
        --base-url <URL>
                      Use an alternative AccurateRip mirror.
                      [default: http://www.accuraterip.com/accuraterip]
        --no-fetch    Print the disc identity and lookup URL, then exit
                      without contacting the database or decoding any audio.
        --timeout <SECS>
                      Network timeout for the database request.
                      [default: 15; range: 1..=120]

MISCELLANEOUS:
    -h, --help        Print help information to STDOUT and exit.
    -v, --verbose     Print a detailed plain-text verification report to
                      STDOUT, so it can e.g. be piped to a file for review,
                      like: arverify -v ./album > arverify.log
    -V, --version     Print version information to STDOUT and exit.

ARGUMENTS:
    <DIR>             A directory containing one FLAC or WAV file per track,
                      named such that they sort into disc order. Audio must be
                      16-bit stereo at 44.1 kHz.
");



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Malformed Response Reason.
///
/// This narrows down exactly where an AccurateRip response stopped making
/// sense.
pub enum MalformedKind {
	/// # Buffer ended inside an entry header.
	Header,

	/// # Buffer ended inside a track record.
	Record,

	/// # Declared track count is negative.
	NegativeTracks,

	/// # Declared track count exceeds the remaining buffer.
	Overrun,
}

impl MalformedKind {
	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Header => "truncated entry header",
			Self::Record => "truncated track record",
			Self::NegativeTracks => "negative track count",
			Self::Overrun => "track count overruns the response",
		}
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Errors.
pub enum ArVerifyError {
	/// # Audio decoding failed.
	Decode(String),

	/// # Invalid AccurateRip disc ID.
	DiscId,

	/// # Sample count doesn't match the layout.
	InsufficientSamples {
		/// # Track index (zero-based).
		track: usize,

		/// # Frames the layout was built from.
		expected: u64,

		/// # Frames actually decoded.
		actual: u64,
	},

	/// # Invalid track layout.
	InvalidTrackLayout(&'static str),

	/// # Response could not be parsed.
	MalformedResponse(MalformedKind),

	/// # Disc is not in the database.
	NotFound,

	/// # Network/HTTP failure.
	Transport(String),

	#[cfg(feature = "bin")]
	/// # Invalid CLI arg.
	CliArg(String),

	#[cfg(feature = "bin")]
	/// # CLI Parsing failure.
	CliParse(&'static str),

	#[cfg(feature = "bin")]
	/// # No audio files found.
	NoTracks(String),

	#[cfg(feature = "bin")]
	/// # Print Help (Not an Error).
	PrintHelp,

	#[cfg(feature = "bin")]
	/// # Print Version (Not an Error).
	PrintVersion,
}

impl Error for ArVerifyError {}

impl From<ArVerifyError> for Msg {
	#[inline]
	fn from(src: ArVerifyError) -> Self { Self::error(src.to_string()) }
}

impl fmt::Display for ArVerifyError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Decode(s) => write!(f, "Unable to decode {s}."),
			Self::DiscId => f.write_str("Invalid AccurateRip disc ID."),
			Self::InsufficientSamples { track, expected, actual } => write!(
				f,
				"Track #{:02} decoded to {actual} samples instead of {expected}.",
				track + 1,
			),
			Self::InvalidTrackLayout(s) => write!(f, "Invalid track layout: {s}."),
			Self::MalformedResponse(k) => write!(
				f,
				"Could not interpret the AccurateRip response ({}).",
				k.as_str(),
			),
			Self::NotFound => f.write_str("The disc is not present in the AccurateRip database."),
			Self::Transport(s) => write!(f, "Unable to reach AccurateRip: {s}."),

			#[cfg(feature = "bin")]
			Self::CliArg(s) => write!(f, "Invalid CLI option: {s}"),

			#[cfg(feature = "bin")]
			Self::CliParse(s) => write!(f, "Unable to parse {s}."),

			#[cfg(feature = "bin")]
			Self::NoTracks(s) => write!(f, "No FLAC or WAV files were found in {s}."),

			#[cfg(feature = "bin")]
			Self::PrintHelp => f.write_str(HELP),

			#[cfg(feature = "bin")]
			Self::PrintVersion => f.write_str(concat!("AR Verify v", env!("CARGO_PKG_VERSION"))),
		}
	}
}
