/*!
# AR Verify: Checksums
*/

use crate::{
	ArVerifyError,
	Sample,
	SAMPLES_PER_SECTOR,
	TrackPosition,
};
use std::fmt;



/// # Leading Samples Ignored (First Track).
///
/// Five sectors, minus one sample.
const SKIP_FIRST: u64 = SAMPLES_PER_SECTOR as u64 * 5 - 1;

/// # Trailing Samples Ignored (Last Track).
const SKIP_LAST: u64 = SAMPLES_PER_SECTOR as u64 * 5;



#[derive(Debug, Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// # Checksum Version.
///
/// AccurateRip switched up checksum formats somewhere along the way. Both are
/// the sum of each (packed) sample multiplied by its one-based position in
/// the track, but differ in how they handle the overflow of that product.
///
/// The database has entries of both kinds, so both are computed in the same
/// pass.
pub enum ChecksumVersion {
	/// # Version One.
	///
	/// Products are summed as-is; the high bits simply fall off.
	V1,

	/// # Version Two.
	///
	/// The high and low halves of each product are summed separately, so the
	/// overflow still counts.
	V2,
}

impl fmt::Display for ChecksumVersion {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl ChecksumVersion {
	/// # All Versions.
	pub const ALL: [Self; 2] = [Self::V1, Self::V2];

	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::V1 => "v1",
			Self::V2 => "v2",
		}
	}

	#[must_use]
	/// # Accumulate.
	///
	/// Fold the product of a sample and its position into the running sum.
	/// Everything wraps; only the low thirty-two bits of the final sum
	/// matter.
	pub const fn step(self, sum: u64, product: u64) -> u64 {
		match self {
			Self::V1 => sum.wrapping_add(product),
			Self::V2 => sum.wrapping_add((product >> 32) + (product & 0xFFFF_FFFF)),
		}
	}

	/// # Index.
	const fn idx(self) -> usize {
		match self {
			Self::V1 => 0,
			Self::V2 => 1,
		}
	}
}



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Track Checksum.
///
/// A single checksum for a single track.
pub struct TrackChecksum {
	/// # Track Index (Zero-Based).
	track_index: usize,

	/// # Algorithm.
	version: ChecksumVersion,

	/// # Value.
	checksum: u32,
}

impl TrackChecksum {
	#[must_use]
	/// # New.
	pub const fn new(track_index: usize, version: ChecksumVersion, checksum: u32) -> Self {
		Self { track_index, version, checksum }
	}

	#[must_use]
	/// # Checksum.
	pub const fn checksum(&self) -> u32 { self.checksum }

	#[must_use]
	/// # Track Index (Zero-Based).
	pub const fn track_index(&self) -> usize { self.track_index }

	#[must_use]
	/// # Version.
	pub const fn version(&self) -> ChecksumVersion { self.version }
}



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Track Checksums (All Versions).
pub struct TrackChecksums {
	/// # Track Index (Zero-Based).
	track_index: usize,

	/// # Values, by Version.
	sums: [u32; 2],
}

impl TrackChecksums {
	#[must_use]
	/// # Checksum.
	pub const fn get(&self, version: ChecksumVersion) -> TrackChecksum {
		TrackChecksum {
			track_index: self.track_index,
			version,
			checksum: self.sums[version.idx()],
		}
	}

	#[must_use]
	/// # Track Index (Zero-Based).
	pub const fn track_index(&self) -> usize { self.track_index }
}



#[derive(Debug, Clone)]
/// # Track Hasher.
///
/// This computes the AccurateRip checksums for a single track incrementally,
/// so that decoded audio can be fed through chunk-by-chunk without holding
/// the whole track in memory.
///
/// The expected sample count — the one the disc layout was built from — has
/// to be known up front, both to figure out where the trailing ignored region
/// of the last track begins, and to make sure the decoder actually delivered
/// what it promised.
///
/// ```
/// use arverify_core::{
///     ChecksumVersion,
///     TrackHasher,
///     TrackPosition,
/// };
///
/// let mut hasher = TrackHasher::new(0, TrackPosition::Only, 5000);
/// hasher.update(&[[1, 1]; 5000]);
/// let chk = hasher.finish().unwrap();
///
/// // Both edges are trimmed; nothing is left!
/// assert_eq!(chk.get(ChecksumVersion::V1).checksum(), 0);
/// ```
pub struct TrackHasher {
	/// # Track Index (Zero-Based).
	track_index: usize,

	/// # Expected Samples.
	expected: u64,

	/// # First Counted Position (Inclusive).
	start: u64,

	/// # Last Counted Position (Inclusive).
	end: u64,

	/// # Samples Seen.
	pos: u64,

	/// # Running Sums, by Version.
	sums: [u64; 2],
}

impl TrackHasher {
	#[must_use]
	/// # New.
	///
	/// Positions are always relative to the untrimmed track, so the first
	/// sample counted on the first track is number `2940`, not `1`.
	pub const fn new(track_index: usize, position: TrackPosition, expected: u64) -> Self {
		let start =
			if position.is_first() { SKIP_FIRST + 1 }
			else { 1 };
		let end =
			if position.is_last() { expected.saturating_sub(SKIP_LAST) }
			else { expected };

		Self {
			track_index,
			expected,
			start,
			end,
			pos: 0,
			sums: [0, 0],
		}
	}

	#[expect(clippy::cast_possible_truncation, reason = "False positive.")]
	/// # Checksums.
	///
	/// Sixty-four bits were only used to help with overflow; the final
	/// checksums only use half that much.
	const fn checksums(&self) -> TrackChecksums {
		TrackChecksums {
			track_index: self.track_index,
			sums: [
				(self.sums[0] & 0xFFFF_FFFF) as u32,
				(self.sums[1] & 0xFFFF_FFFF) as u32,
			],
		}
	}

	/// # Update.
	///
	/// Feed the next chunk of samples into the hasher.
	pub fn update(&mut self, chunk: &[Sample]) {
		for sample in chunk {
			self.pos += 1;
			if self.start <= self.pos && self.pos <= self.end {
				let product = u64::from(pack_sample(*sample)).wrapping_mul(self.pos);
				for v in ChecksumVersion::ALL {
					let idx = v.idx();
					self.sums[idx] = v.step(self.sums[idx], product);
				}
			}
		}
	}

	/// # Finish.
	///
	/// ## Errors
	///
	/// This will return an error if the number of samples received differs
	/// from the number expected.
	pub fn finish(self) -> Result<TrackChecksums, ArVerifyError> {
		if self.pos == self.expected { Ok(self.checksums()) }
		else {
			Err(ArVerifyError::InsufficientSamples {
				track: self.track_index,
				expected: self.expected,
				actual: self.pos,
			})
		}
	}
}



#[must_use]
/// # Track Checksums (All at Once).
///
/// This is a convenience wrapper around [`TrackHasher`] for when all the
/// samples are already in memory.
pub fn track_checksums(track_index: usize, position: TrackPosition, samples: &[Sample])
-> TrackChecksums {
	let mut hasher = TrackHasher::new(track_index, position, samples.len() as u64);
	hasher.update(samples);
	hasher.checksums()
}

#[must_use]
/// # Pack Sample.
///
/// Squish a stereo sample into a single `u32`, left channel in the low half,
/// right channel in the high half. (This is just the raw little-endian PCM
/// bytes read as one number.)
pub const fn pack_sample(sample: Sample) -> u32 {
	let [l1, l2] = sample[0].to_le_bytes();
	let [r1, r2] = sample[1].to_le_bytes();
	u32::from_le_bytes([l1, l2, r1, r2])
}
