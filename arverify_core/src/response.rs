/*!
# AR Verify: Database Response
*/

use crate::{
	ArVerifyError,
	DiscIdentity,
	MalformedKind,
};



/// # Entry Header Size.
///
/// Track count (1), disc ID #1 (4), disc ID #2 (4), CDDB ID (4).
const HEADER_SIZE: usize = 13;

/// # Track Record Size.
///
/// Confidence (1), checksum (4), unused (4).
const RECORD_SIZE: usize = 9;



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Pressing Track.
///
/// A single track checksum from a database entry, along with the number of
/// people who have submitted the same value.
pub struct PressingTrack {
	/// # Confidence.
	confidence: i8,

	/// # Checksum.
	checksum: u32,
}

impl PressingTrack {
	#[must_use]
	/// # New.
	pub const fn new(confidence: i8, checksum: u32) -> Self {
		Self { confidence, checksum }
	}

	#[must_use]
	/// # Checksum.
	pub const fn checksum(self) -> u32 { self.checksum }

	#[must_use]
	/// # Confidence.
	pub const fn confidence(self) -> i8 { self.confidence }
}



#[derive(Debug, Clone, Eq, Hash, PartialEq)]
/// # Pressing Candidate.
///
/// AccurateRip responses can contain entries for several different pressings
/// of the "same" disc. Each entry repeats the disc identity the server filed
/// it under, followed by one checksum per track.
pub struct PressingCandidate {
	/// # Reported Identity.
	header: DiscIdentity,

	/// # Per-Track Checksums.
	tracks: Vec<PressingTrack>,
}

impl PressingCandidate {
	#[must_use]
	/// # New.
	///
	/// The header's track count is taken from the track list.
	pub fn new(disc_id_1: u32, disc_id_2: u32, cddb_disc_id: u32, tracks: Vec<PressingTrack>)
	-> Self {
		let len = u32::try_from(tracks.len()).unwrap_or(u32::MAX);
		Self {
			header: DiscIdentity::new(disc_id_1, disc_id_2, cddb_disc_id, len),
			tracks,
		}
	}

	#[must_use]
	/// # Reported Identity.
	pub const fn header(&self) -> &DiscIdentity { &self.header }

	#[must_use]
	/// # Matches Identity?
	///
	/// Returns `true` if the entry was filed under exactly the same identity
	/// — all three IDs and the track count — as the local disc.
	pub fn matches(&self, id: &DiscIdentity) -> bool { self.header.eq(id) }

	#[must_use]
	/// # Track.
	///
	/// Return the checksum details for the zero-based track index, if any.
	pub fn track(&self, idx: usize) -> Option<PressingTrack> { self.tracks.get(idx).copied() }

	#[must_use]
	/// # Tracks.
	pub fn tracks(&self) -> &[PressingTrack] { &self.tracks }
}



/// # Parse Response.
///
/// Decode a raw AccurateRip response into its pressing entries. There is no
/// entry count up front; entries simply follow one another until the data
/// runs out.
///
/// An empty response is perfectly valid, and yields an empty list.
///
/// ## Errors
///
/// This will return an error if the data ends partway through an entry, or an
/// entry claims more tracks than the data holds.
pub fn parse_response(raw: &[u8]) -> Result<Vec<PressingCandidate>, ArVerifyError> {
	let mut cur = Cursor::new(raw);
	let mut out = Vec::new();

	while ! cur.is_empty() {
		let (Some(len), Some(disc_id_1), Some(disc_id_2), Some(cddb_disc_id)) =
			(cur.i8(), cur.u32(), cur.u32(), cur.u32())
		else {
			return Err(ArVerifyError::MalformedResponse(MalformedKind::Header));
		};

		let len = usize::try_from(len)
			.map_err(|_| ArVerifyError::MalformedResponse(MalformedKind::NegativeTracks))?;

		// Make sure the records are all there before reading any of them.
		let remaining = cur.remaining();
		if remaining < len * RECORD_SIZE {
			let kind =
				if remaining % RECORD_SIZE == 0 { MalformedKind::Overrun }
				else { MalformedKind::Record };
			return Err(ArVerifyError::MalformedResponse(kind));
		}

		let mut tracks = Vec::with_capacity(len);
		for _ in 0..len {
			let (Some(confidence), Some(checksum), Some(_)) = (cur.i8(), cur.u32(), cur.u32())
			else {
				return Err(ArVerifyError::MalformedResponse(MalformedKind::Record));
			};
			tracks.push(PressingTrack { confidence, checksum });
		}

		out.push(PressingCandidate::new(disc_id_1, disc_id_2, cddb_disc_id, tracks));
	}

	Ok(out)
}



/// # Byte Cursor.
///
/// All reads are bounds-checked, returning `None` rather than panicking if
/// the data runs out. Numbers are little-endian.
struct Cursor<'a> {
	/// # Data.
	buf: &'a [u8],

	/// # Read Position.
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// # New.
	const fn new(buf: &'a [u8]) -> Self { Self { buf, pos: 0 } }

	/// # Is Empty?
	const fn is_empty(&self) -> bool { self.buf.len() <= self.pos }

	/// # Remaining Bytes.
	const fn remaining(&self) -> usize { self.buf.len().saturating_sub(self.pos) }

	/// # Take N Bytes.
	fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
		let end = self.pos.checked_add(N)?;
		let out = self.buf.get(self.pos..end)?.try_into().ok()?;
		self.pos = end;
		Some(out)
	}

	/// # Read i8.
	fn i8(&mut self) -> Option<i8> { self.take::<1>().map(i8::from_le_bytes) }

	/// # Read u32.
	fn u32(&mut self) -> Option<u32> { self.take::<4>().map(u32::from_le_bytes) }
}



#[cfg(test)]
mod test {
	use super::*;

	/// # Build a Raw Entry.
	fn entry(id1: u32, id2: u32, cddb: u32, tracks: &[(i8, u32)]) -> Vec<u8> {
		let mut out = Vec::with_capacity(HEADER_SIZE + tracks.len() * RECORD_SIZE);
		out.push(tracks.len() as u8);
		out.extend_from_slice(&id1.to_le_bytes());
		out.extend_from_slice(&id2.to_le_bytes());
		out.extend_from_slice(&cddb.to_le_bytes());
		for (conf, chk) in tracks {
			out.push(*conf as u8);
			out.extend_from_slice(&chk.to_le_bytes());
			out.extend_from_slice(&0xDEAD_BEEF_u32.to_le_bytes());
		}
		out
	}

	#[test]
	fn t_parse_empty() {
		assert_eq!(parse_response(&[]), Ok(Vec::new()));
	}

	#[test]
	fn t_parse_single() {
		let raw = entry(0x6a5, 0xd4b, 0x0200_1601, &[(12, 0x1234_5678)]);
		assert_eq!(raw.len(), HEADER_SIZE + RECORD_SIZE);

		let parsed = parse_response(&raw).expect("Parse failed.");
		assert_eq!(parsed.len(), 1);

		let local = DiscIdentity::new(0x6a5, 0xd4b, 0x0200_1601, 1);
		assert!(parsed[0].matches(&local), "Header should match.");
		assert_eq!(parsed[0].tracks(), &[PressingTrack::new(12, 0x1234_5678)]);
		assert_eq!(parsed[0].track(0).map(PressingTrack::checksum), Some(0x1234_5678));
		assert_eq!(parsed[0].track(1), None);
	}

	#[test]
	fn t_parse_multi() {
		let a = entry(1, 2, 3, &[(5, 10), (6, 11), (7, 12)]);
		let b = entry(1, 2, 3, &[(-1, 20), (127, 21), (0, 22)]);
		let c = entry(9, 9, 9, &[(1, 30)]);
		let raw = [a, b, c].concat();

		let parsed = parse_response(&raw).expect("Parse failed.");
		assert_eq!(parsed.len(), 3, "Expected three entries.");
		assert_eq!(parsed[0].header(), &DiscIdentity::new(1, 2, 3, 3));
		assert_eq!(parsed[1].track(0), Some(PressingTrack::new(-1, 20)));
		assert_eq!(parsed[1].track(1), Some(PressingTrack::new(127, 21)));
		assert_eq!(parsed[2].header(), &DiscIdentity::new(9, 9, 9, 1));
		assert_eq!(parsed[2].tracks().len(), 1);
	}

	#[test]
	fn t_parse_zero_tracks() {
		// Weird, but structurally fine.
		let raw = [entry(1, 2, 3, &[]), entry(4, 5, 6, &[(1, 1)])].concat();
		let parsed = parse_response(&raw).expect("Parse failed.");
		assert_eq!(parsed.len(), 2);
		assert!(parsed[0].tracks().is_empty());
	}

	#[test]
	fn t_parse_truncated() {
		let raw = [
			entry(1, 2, 3, &[(5, 10), (6, 11)]),
			entry(4, 5, 6, &[(7, 12), (8, 13)]),
		].concat();

		// Every possible truncation point should either succeed (at an entry
		// boundary) or fail cleanly.
		let boundary = HEADER_SIZE + RECORD_SIZE * 2;
		for len in 1..raw.len() {
			let res = parse_response(&raw[..len]);
			if len == boundary {
				assert_eq!(res.map(|v| v.len()), Ok(1), "Boundary parse failed.");
			}
			else {
				assert!(
					matches!(res, Err(ArVerifyError::MalformedResponse(_))),
					"Truncation at {len} should have failed.",
				);
			}
		}

		// Spot-check the reasons.
		assert_eq!(
			parse_response(&raw[..5]),
			Err(ArVerifyError::MalformedResponse(MalformedKind::Header)),
		);
		assert_eq!(
			parse_response(&raw[..HEADER_SIZE + 4]),
			Err(ArVerifyError::MalformedResponse(MalformedKind::Record)),
		);
		assert_eq!(
			parse_response(&raw[..HEADER_SIZE + RECORD_SIZE]),
			Err(ArVerifyError::MalformedResponse(MalformedKind::Overrun)),
		);
	}

	#[test]
	fn t_parse_overrun() {
		// Whole records, just not enough of them.
		let mut raw = entry(1, 2, 3, &[(5, 10)]);
		raw[0] = 50;
		assert_eq!(
			parse_response(&raw),
			Err(ArVerifyError::MalformedResponse(MalformedKind::Overrun)),
		);

		// Now with a partial record dangling at the end.
		raw.extend_from_slice(&[0; RECORD_SIZE - 1]);
		assert_eq!(
			parse_response(&raw),
			Err(ArVerifyError::MalformedResponse(MalformedKind::Record)),
		);
	}

	#[test]
	fn t_parse_negative() {
		let mut raw = entry(1, 2, 3, &[(5, 10)]);
		raw[0] = 0xFF;
		assert_eq!(
			parse_response(&raw),
			Err(ArVerifyError::MalformedResponse(MalformedKind::NegativeTracks)),
		);
	}
}
