/*!
# AR Verify: Disc Identity
*/

use crate::{
	AR_BASE_URL,
	ArVerifyError,
	MAX_TRACKS,
	SECTORS_PER_SECOND,
	TrackLayout,
};
use std::fmt;



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Disc Identity.
///
/// AccurateRip keys its database by a pair of homegrown IDs and a CDDB-style
/// ID, all derived from the sector offsets of the disc's tracks.
///
/// The `Display` implementation prints the identity in the hyphenated form
/// used within the database file names, e.g. `001-000006a5-00000d4b-02001601`.
/// That same string can be parsed back via `TryFrom<&str>`.
pub struct DiscIdentity {
	/// # AccurateRip ID #1.
	disc_id_1: u32,

	/// # AccurateRip ID #2.
	disc_id_2: u32,

	/// # CDDB ID.
	cddb_disc_id: u32,

	/// # Number of Tracks.
	num_tracks: u32,
}

impl fmt::Display for DiscIdentity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{:03}-{:08x}-{:08x}-{:08x}",
			self.num_tracks,
			self.disc_id_1,
			self.disc_id_2,
			self.cddb_disc_id,
		)
	}
}

impl From<&TrackLayout> for DiscIdentity {
	#[inline]
	fn from(src: &TrackLayout) -> Self {
		// The layout guarantees at least one track and sane offsets.
		Self::fold(src.offsets())
	}
}

impl TryFrom<&[u32]> for DiscIdentity {
	type Error = ArVerifyError;

	/// # From Raw Offsets.
	///
	/// The offsets must include the trailing sentinel, so there should be one
	/// more of them than there are tracks.
	fn try_from(src: &[u32]) -> Result<Self, Self::Error> {
		if src.len() < 2 {
			return Err(ArVerifyError::InvalidTrackLayout("no tracks"));
		}
		if usize::from(MAX_TRACKS) + 1 < src.len() {
			return Err(ArVerifyError::InvalidTrackLayout("more than 99 tracks"));
		}
		if src.windows(2).any(|w| w[1] < w[0]) {
			return Err(ArVerifyError::InvalidTrackLayout("offsets out of order"));
		}

		Ok(Self::fold(src))
	}
}

impl TryFrom<&str> for DiscIdentity {
	type Error = ArVerifyError;

	/// # Parse.
	///
	/// This accepts the bare hyphenated key, the database file name, or a
	/// full checksum URL.
	fn try_from(src: &str) -> Result<Self, Self::Error> {
		let src = src.trim();
		let src = src.rsplit_once('/').map_or(src, |(_, b)| b);
		let src = src.strip_prefix("dBAR-").unwrap_or(src);
		let src = src.strip_suffix(".bin").unwrap_or(src);

		let mut parts = src.split('-');
		let num_tracks = parts.next()
			.filter(|v| v.len() == 3 && v.bytes().all(|b| b.is_ascii_digit()))
			.and_then(|v| v.parse::<u32>().ok())
			.filter(|v| (1..=u32::from(MAX_TRACKS)).contains(v))
			.ok_or(ArVerifyError::DiscId)?;
		let disc_id_1 = parts.next().and_then(parse_hex8).ok_or(ArVerifyError::DiscId)?;
		let disc_id_2 = parts.next().and_then(parse_hex8).ok_or(ArVerifyError::DiscId)?;
		let cddb_disc_id = parts.next().and_then(parse_hex8).ok_or(ArVerifyError::DiscId)?;

		if parts.next().is_none() {
			Ok(Self { disc_id_1, disc_id_2, cddb_disc_id, num_tracks })
		}
		else { Err(ArVerifyError::DiscId) }
	}
}

impl DiscIdentity {
	#[must_use]
	/// # New (From Parts).
	///
	/// This is mostly useful for reconstructing an identity from a database
	/// response header.
	pub const fn new(disc_id_1: u32, disc_id_2: u32, cddb_disc_id: u32, num_tracks: u32)
	-> Self {
		Self { disc_id_1, disc_id_2, cddb_disc_id, num_tracks }
	}

	#[expect(clippy::cast_possible_truncation, reason = "False positive.")]
	#[expect(clippy::integer_division, reason = "Deliberate.")]
	/// # Fold Offsets.
	///
	/// The sums are collected in sixty-four bits and only narrowed at the very
	/// end, so nothing overflows before it is supposed to.
	///
	/// Callers must ensure there are at least two (non-decreasing) offsets.
	fn fold(offsets: &[u32]) -> Self {
		let n = offsets.len() - 1;
		let mut disc_id_1 = 0_u64;
		let mut disc_id_2 = 0_u64;
		let mut cddb = 0_u64;

		for (k, o) in offsets.iter().copied().map(u64::from).enumerate() {
			disc_id_1 += o;
			disc_id_2 += o.max(1) * (k as u64 + 1);

			// The sentinel doesn't count toward the CDDB digits.
			if k < n {
				cddb += sum_digits(o / u64::from(SECTORS_PER_SECOND) + 2);
			}
		}

		let first = u64::from(offsets[0]) / u64::from(SECTORS_PER_SECOND);
		let last = u64::from(offsets[n]) / u64::from(SECTORS_PER_SECOND);
		let cddb = ((cddb % 255) << 24) + ((last - first) << 8) + n as u64;

		Self {
			disc_id_1: (disc_id_1 & 0xFFFF_FFFF) as u32,
			disc_id_2: (disc_id_2 & 0xFFFF_FFFF) as u32,
			cddb_disc_id: (cddb & 0xFFFF_FFFF) as u32,
			num_tracks: n as u32,
		}
	}
}

impl DiscIdentity {
	#[must_use]
	/// # CDDB ID.
	pub const fn cddb_disc_id(&self) -> u32 { self.cddb_disc_id }

	#[must_use]
	/// # AccurateRip ID #1.
	pub const fn disc_id_1(&self) -> u32 { self.disc_id_1 }

	#[must_use]
	/// # AccurateRip ID #2.
	pub const fn disc_id_2(&self) -> u32 { self.disc_id_2 }

	#[must_use]
	/// # Number of Tracks.
	pub const fn num_tracks(&self) -> u32 { self.num_tracks }
}

impl DiscIdentity {
	#[must_use]
	/// # Checksum File Name.
	///
	/// e.g. `dBAR-001-000006a5-00000d4b-02001601.bin`.
	pub fn checksum_file(&self) -> String { format!("dBAR-{self}.bin") }

	#[must_use]
	/// # Checksum Path.
	///
	/// The database is sharded three levels deep by the lowest three nibbles
	/// of the first ID, lowest first.
	pub fn checksum_path(&self) -> String {
		format!(
			"{:x}/{:x}/{:x}/dBAR-{self}.bin",
			self.disc_id_1 & 0xF,
			(self.disc_id_1 >> 4) & 0xF,
			(self.disc_id_1 >> 8) & 0xF,
		)
	}

	#[must_use]
	/// # Checksum URL.
	///
	/// Return the full URL for this disc's checksum file on the official
	/// AccurateRip server.
	pub fn checksum_url(&self) -> String { self.checksum_url_with_base(AR_BASE_URL) }

	#[must_use]
	/// # Checksum URL (Custom Base).
	///
	/// Same as [`DiscIdentity::checksum_url`], but relative to some other
	/// base, like a mirror. Trailing slashes on the base are ignored.
	pub fn checksum_url_with_base(&self, base: &str) -> String {
		format!("{}/{}", base.trim_end_matches('/'), self.checksum_path())
	}
}



#[expect(clippy::integer_division, reason = "Deliberate.")]
/// # Sum Decimal Digits.
///
/// e.g. `123` becomes `1 + 2 + 3 = 6`.
const fn sum_digits(mut n: u64) -> u64 {
	let mut out = 0;
	while n != 0 {
		out += n % 10;
		n /= 10;
	}
	out
}

/// # Parse Eight Hex Digits.
fn parse_hex8(src: &str) -> Option<u32> {
	if src.len() == 8 && src.bytes().all(|b| b.is_ascii_hexdigit()) {
		u32::from_str_radix(src, 16).ok()
	}
	else { None }
}
