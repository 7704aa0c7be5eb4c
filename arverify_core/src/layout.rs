/*!
# AR Verify: Track Layout
*/

use crate::{
	ArVerifyError,
	MAX_TRACKS,
	SAMPLES_PER_SECTOR,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Track Position.
///
/// AccurateRip ignores a few sectors at the very start and end of the disc,
/// so the checksum engine needs to know whether a given track sits at either
/// edge. This is derived from the track index and total, nothing more.
pub enum TrackPosition {
	/// # The First Track.
	First,

	/// # Somewhere in the Middle.
	Middle,

	/// # The Last Track.
	Last,

	/// # The Only Track (both first and last).
	Only,
}

impl TrackPosition {
	#[must_use]
	/// # From Index and Total.
	///
	/// Return the position of the zero-based `idx` on a disc with `total`
	/// tracks. Out-of-range indices are treated as middle tracks.
	pub const fn new(idx: usize, total: usize) -> Self {
		let first = idx == 0;
		let last = idx + 1 == total;
		match (first, last) {
			(true, true) => Self::Only,
			(true, false) => Self::First,
			(false, true) => Self::Last,
			(false, false) => Self::Middle,
		}
	}

	#[must_use]
	/// # Is First?
	pub const fn is_first(self) -> bool { matches!(self, Self::First | Self::Only) }

	#[must_use]
	/// # Is Last?
	pub const fn is_last(self) -> bool { matches!(self, Self::Last | Self::Only) }
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Track Layout.
///
/// This holds the per-track sample counts (in disc order) along with the
/// sector offsets derived from them.
///
/// There is always one more offset than there are tracks; the first is zero
/// and the last — the sentinel — is the total length of the disc.
///
/// ```
/// use arverify_core::TrackLayout;
///
/// let layout = TrackLayout::try_from([1_000_000_u64].as_slice()).unwrap();
/// assert_eq!(layout.offsets(), &[0, 1701]);
/// ```
pub struct TrackLayout {
	/// # Samples Per Track.
	samples: Vec<u64>,

	/// # Sector Offsets.
	offsets: Vec<u32>,
}

impl TryFrom<&[u64]> for TrackLayout {
	type Error = ArVerifyError;

	#[inline]
	fn try_from(src: &[u64]) -> Result<Self, Self::Error> { Self::new(src.to_vec()) }
}

impl TryFrom<Vec<u64>> for TrackLayout {
	type Error = ArVerifyError;

	#[inline]
	fn try_from(src: Vec<u64>) -> Result<Self, Self::Error> { Self::new(src) }
}

impl TrackLayout {
	/// # New.
	///
	/// Convert each track's sample count into whole sectors — rounding up, as
	/// a partial sector still occupies one — and accumulate the offsets.
	///
	/// Empty tracks are weird, but legal; they just don't move the offset.
	///
	/// ## Errors
	///
	/// This will return an error if there are no tracks, more than 99 tracks,
	/// or the disc would be too long to express in 32-bit sectors.
	pub fn new(samples: Vec<u64>) -> Result<Self, ArVerifyError> {
		if samples.is_empty() {
			return Err(ArVerifyError::InvalidTrackLayout("no tracks"));
		}
		if usize::from(MAX_TRACKS) < samples.len() {
			return Err(ArVerifyError::InvalidTrackLayout("more than 99 tracks"));
		}

		let mut offsets = Vec::with_capacity(samples.len() + 1);
		let mut total = 0_u32;
		for &s in &samples {
			offsets.push(total);
			total = u32::try_from(s.div_ceil(u64::from(SAMPLES_PER_SECTOR)))
				.ok()
				.and_then(|len| total.checked_add(len))
				.ok_or(ArVerifyError::InvalidTrackLayout("disc too long"))?;
		}
		offsets.push(total);

		Ok(Self { samples, offsets })
	}
}

impl TrackLayout {
	#[must_use]
	/// # Leadout (Total Sectors).
	pub fn leadout(&self) -> u32 {
		self.offsets.last().copied().unwrap_or_default()
	}

	#[must_use]
	/// # Number of Tracks.
	pub fn num_tracks(&self) -> usize { self.samples.len() }

	#[must_use]
	/// # Sector Offsets.
	///
	/// This includes the trailing sentinel.
	pub fn offsets(&self) -> &[u32] { &self.offsets }

	#[must_use]
	/// # Track Position.
	pub fn position(&self, idx: usize) -> Option<TrackPosition> {
		if idx < self.samples.len() {
			Some(TrackPosition::new(idx, self.samples.len()))
		}
		else { None }
	}

	#[must_use]
	/// # Track Samples.
	///
	/// Return the sample count the layout was built from for the zero-based
	/// track index.
	pub fn samples(&self, idx: usize) -> Option<u64> { self.samples.get(idx).copied() }

	#[must_use]
	/// # Track Sectors.
	///
	/// Return the length of the track in sectors.
	pub fn sectors(&self, idx: usize) -> Option<u32> {
		let start = self.offsets.get(idx)?;
		let end = self.offsets.get(idx + 1)?;
		Some(end - start)
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_layout_basic() {
		let layout = TrackLayout::try_from([1_000_000_u64].as_slice())
			.expect("Layout failed.");
		assert_eq!(layout.offsets(), &[0, 1701]);
		assert_eq!(layout.num_tracks(), 1);
		assert_eq!(layout.leadout(), 1701);
		assert_eq!(layout.sectors(0), Some(1701));
		assert_eq!(layout.samples(0), Some(1_000_000));
		assert_eq!(layout.samples(1), None);
	}

	#[test]
	fn t_layout_rounding() {
		// Exact multiples, partials, and the degenerate empty track.
		let layout = TrackLayout::try_from(vec![588, 589, 0, 1, 588 * 75])
			.expect("Layout failed.");
		assert_eq!(layout.offsets(), &[0, 1, 3, 3, 4, 79]);
		assert_eq!(layout.sectors(2), Some(0));
	}

	#[test]
	fn t_layout_invariants() {
		let sets: [&[u64]; 4] = [
			&[0],
			&[12_345, 0, 99_999_999, 588],
			&[588 * 3000; 20],
			&[7; 99],
		];
		for set in sets {
			let layout = TrackLayout::try_from(set).expect("Layout failed.");
			let offsets = layout.offsets();
			assert_eq!(offsets.len(), set.len() + 1, "Wrong offset count.");
			assert_eq!(offsets[0], 0, "The first offset should be zero.");
			assert!(
				offsets.windows(2).all(|w| w[0] <= w[1]),
				"Offsets should never decrease: {offsets:?}",
			);
		}
	}

	#[test]
	fn t_layout_invalid() {
		assert_eq!(
			TrackLayout::new(Vec::new()),
			Err(ArVerifyError::InvalidTrackLayout("no tracks")),
		);
		assert!(TrackLayout::new(vec![1; 100]).is_err(), "100 tracks should fail.");
		assert!(
			TrackLayout::new(vec![u64::MAX]).is_err(),
			"Absurd sample counts should fail.",
		);
		assert!(
			TrackLayout::new(vec![u64::from(u32::MAX) * 588, 588]).is_err(),
			"Overflowing totals should fail.",
		);
	}

	#[test]
	fn t_position() {
		assert_eq!(TrackPosition::new(0, 1), TrackPosition::Only);
		assert_eq!(TrackPosition::new(0, 3), TrackPosition::First);
		assert_eq!(TrackPosition::new(1, 3), TrackPosition::Middle);
		assert_eq!(TrackPosition::new(2, 3), TrackPosition::Last);

		assert!(TrackPosition::Only.is_first());
		assert!(TrackPosition::Only.is_last());
		assert!(TrackPosition::First.is_first());
		assert!(! TrackPosition::First.is_last());
		assert!(! TrackPosition::Middle.is_first());
		assert!(! TrackPosition::Middle.is_last());
		assert!(TrackPosition::Last.is_last());

		let layout = TrackLayout::new(vec![10, 20]).expect("Layout failed.");
		assert_eq!(layout.position(0), Some(TrackPosition::First));
		assert_eq!(layout.position(1), Some(TrackPosition::Last));
		assert_eq!(layout.position(2), None);
	}
}
