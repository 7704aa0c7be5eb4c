/*!
# AR Verify: Library

This crate contains the disc-identity, lookup, and checksum logic used to
verify ripped CD audio against the [AccurateRip](http://www.accuraterip.com/)
database.

The general flow is:

1. Read the length of each track to build a [`TrackLayout`];
2. Derive the [`DiscIdentity`] from that, and with it, the lookup URL;
3. Fetch and parse the database entries via [`parse_response`];
4. Run each track's audio through a [`TrackHasher`];
5. [`evaluate`] the checksums against the entries.

[`Disc::verify`] takes care of all of that in one go.
*/

#![deny(unsafe_code)]

#![warn(
	clippy::filetype_is_file,
	clippy::integer_division,
	clippy::needless_borrow,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::suboptimal_flops,
	clippy::unneeded_field_pattern,
	macro_use_extern_crate,
	missing_copy_implementations,
	missing_debug_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unreachable_pub,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![allow(
	clippy::doc_markdown,
	clippy::module_name_repetitions,
	clippy::redundant_pub_crate,
)]

mod checksum;
mod decode;
mod disc;
mod error;
mod identity;
mod layout;
mod log;
mod opts;
mod response;
mod transport;
mod verify;

pub use checksum::{
	ChecksumVersion,
	pack_sample,
	track_checksums,
	TrackChecksum,
	TrackChecksums,
	TrackHasher,
};
pub use decode::{
	AudioDecoder,
	AudioKind,
	Decoder,
	FlacDecoder,
	WavDecoder,
};
pub use disc::Disc;
pub use error::{
	ArVerifyError,
	MalformedKind,
};
pub use identity::DiscIdentity;
pub use layout::{
	TrackLayout,
	TrackPosition,
};
pub use log::VerifyLog;
pub use opts::VerifyOptions;
pub use response::{
	parse_response,
	PressingCandidate,
	PressingTrack,
};
pub use transport::{
	HttpTransport,
	TIMEOUT_DEFAULT,
	Transport,
};
pub use verify::{
	DiscReport,
	evaluate,
	filter_candidates,
	MatchResult,
	TrackReport,
	Verdict,
};



/// # 16-bit Stereo Sample (left, right).
pub type Sample = [i16; 2];

/// # AccurateRip Base URL.
pub const AR_BASE_URL: &str = "http://www.accuraterip.com/accuraterip";

/// # Lead-out Label.
///
/// This is used solely for the table of contents printout; e.g. 01 02 03 AA.
pub const CD_LEADOUT_LABEL: &str = "AA";

/// # Maximum Tracks.
///
/// The Red Book caps audio CDs at ninety-nine tracks.
pub const MAX_TRACKS: u8 = 99;

/// # Samples per sector.
pub const SAMPLES_PER_SECTOR: u16 = 588;

/// # Sectors per second.
pub const SECTORS_PER_SECOND: u16 = 75;
