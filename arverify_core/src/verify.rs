/*!
# AR Verify: Matching
*/

use crate::{
	ArVerifyError,
	ChecksumVersion,
	DiscIdentity,
	PressingCandidate,
	PressingTrack,
	TrackChecksum,
	VerifyOptions,
};



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Match Result.
///
/// The outcome of comparing one computed track checksum against every
/// candidate pressing.
pub struct MatchResult {
	/// # Computed Checksum.
	computed: TrackChecksum,

	/// # Best Match, If Any.
	best_match: Option<PressingTrack>,
}

impl MatchResult {
	#[must_use]
	/// # Best Match.
	///
	/// Return the highest-confidence database entry with the same checksum,
	/// if any.
	pub const fn best_match(&self) -> Option<PressingTrack> { self.best_match }

	#[must_use]
	/// # Computed Checksum.
	pub const fn computed_checksum(&self) -> u32 { self.computed.checksum() }

	#[must_use]
	/// # Is Match?
	pub const fn is_match(&self) -> bool { self.best_match.is_some() }

	#[must_use]
	/// # Track Index (Zero-Based).
	pub const fn track_index(&self) -> usize { self.computed.track_index() }

	#[must_use]
	/// # Checksum Version.
	pub const fn version(&self) -> ChecksumVersion { self.computed.version() }
}



/// # Evaluate Matches.
///
/// For each computed checksum, look at every candidate with an entry for the
/// same track. Of those with the same checksum, the one with the highest
/// confidence wins; ties go to whichever came first.
///
/// This does no header validation; see [`filter_candidates`] for that.
pub fn evaluate(checksums: &[TrackChecksum], candidates: &[PressingCandidate])
-> Vec<MatchResult> {
	checksums.iter()
		.map(|computed| {
			let idx = computed.track_index();
			let chk = computed.checksum();
			let best_match = candidates.iter()
				.filter_map(|c| c.track(idx))
				.filter(|t| t.checksum() == chk)
				.fold(None, |acc: Option<PressingTrack>, t| match acc {
					Some(a) if t.confidence() <= a.confidence() => Some(a),
					_ => Some(t),
				});

			MatchResult { computed: *computed, best_match }
		})
		.collect()
}

/// # Filter Candidates.
///
/// Split the candidates into those that should be scored and the identities
/// of those that look wrong — i.e. were filed under a different disc — for
/// the caller to warn about.
///
/// When `lenient`, mismatched candidates are still reported, but are kept
/// for scoring too.
pub fn filter_candidates(local: &DiscIdentity, candidates: Vec<PressingCandidate>, lenient: bool)
-> (Vec<PressingCandidate>, Vec<DiscIdentity>) {
	let mut keep = Vec::with_capacity(candidates.len());
	let mut odd = Vec::new();
	for c in candidates {
		if c.matches(local) { keep.push(c); }
		else {
			odd.push(*c.header());
			if lenient { keep.push(c); }
		}
	}
	(keep, odd)
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Verdict.
pub enum Verdict {
	/// # Every track matched.
	Verified,

	/// # The disc is known, but at least one track didn't match.
	Unverified,

	/// # The disc is not in the database.
	NotFound,

	/// # The database only has entries for other discs.
	///
	/// Entries came back for the lookup key, but none of them shared the
	/// local disc's identifiers, so nothing was scored.
	Mismatched,
}

impl Verdict {
	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Verified => "Verified",
			Self::Unverified => "Not Verified",
			Self::NotFound => "Not Found",
			Self::Mismatched => "Mismatched",
		}
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Track Report.
///
/// The match results for every enabled checksum version, or the reason the
/// track couldn't be checked at all.
pub struct TrackReport {
	/// # Track Index (Zero-Based).
	track_index: usize,

	/// # Results.
	results: Result<Vec<MatchResult>, ArVerifyError>,
}

impl TrackReport {
	#[must_use]
	/// # New.
	pub const fn new(track_index: usize, results: Result<Vec<MatchResult>, ArVerifyError>)
	-> Self {
		Self { track_index, results }
	}

	#[must_use]
	/// # Error.
	///
	/// If the track could not be decoded/checksummed, return the reason.
	pub const fn error(&self) -> Option<&ArVerifyError> {
		match &self.results {
			Ok(_) => None,
			Err(e) => Some(e),
		}
	}

	#[must_use]
	/// # Is Indeterminate?
	pub const fn is_indeterminate(&self) -> bool { self.results.is_err() }

	#[must_use]
	/// # Is Match?
	///
	/// Returns `true` if any version produced a match the options find
	/// acceptable.
	pub fn is_match(&self, opts: &VerifyOptions) -> bool {
		self.results().iter().any(|r|
			r.best_match().is_some_and(|t| opts.accepts(t.confidence()))
		)
	}

	#[must_use]
	/// # Result (By Version).
	pub fn result(&self, version: ChecksumVersion) -> Option<&MatchResult> {
		self.results().iter().find(|r| r.version() == version)
	}

	#[must_use]
	/// # Results.
	pub fn results(&self) -> &[MatchResult] {
		self.results.as_deref().unwrap_or_default()
	}

	#[must_use]
	/// # Track Index (Zero-Based).
	pub const fn track_index(&self) -> usize { self.track_index }
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Disc Report.
///
/// The end result of a verification run.
pub struct DiscReport {
	/// # Local Identity.
	id: DiscIdentity,

	/// # Lookup URL.
	url: String,

	/// # Database Entries Found.
	candidates: usize,

	/// # Per-Track Results.
	tracks: Vec<TrackReport>,

	/// # Mismatched Entry Identities.
	warnings: Vec<DiscIdentity>,

	/// # Verdict.
	verdict: Verdict,
}

impl DiscReport {
	#[must_use]
	/// # Not Found.
	///
	/// The database has never heard of this disc, so there was nothing to
	/// check the tracks against.
	pub const fn not_found(id: DiscIdentity, url: String) -> Self {
		Self {
			id,
			url,
			candidates: 0,
			tracks: Vec::new(),
			warnings: Vec::new(),
			verdict: Verdict::NotFound,
		}
	}

	#[must_use]
	/// # Mismatched.
	///
	/// Every database entry belonged to some other disc, so there was
	/// nothing to check the tracks against.
	pub const fn mismatched(id: DiscIdentity, url: String, warnings: Vec<DiscIdentity>) -> Self {
		Self {
			id,
			url,
			candidates: 0,
			tracks: Vec::new(),
			warnings,
			verdict: Verdict::Mismatched,
		}
	}

	#[must_use]
	/// # New.
	///
	/// The verdict is derived from the tracks: a disc only counts as verified
	/// if every last one of them matched.
	pub fn new(
		id: DiscIdentity,
		url: String,
		candidates: usize,
		tracks: Vec<TrackReport>,
		warnings: Vec<DiscIdentity>,
		opts: &VerifyOptions,
	) -> Self {
		let verdict =
			if candidates == 0 {
				if warnings.is_empty() { Verdict::NotFound }
				else { Verdict::Mismatched }
			}
			else if ! tracks.is_empty() && tracks.iter().all(|t| t.is_match(opts)) {
				Verdict::Verified
			}
			else { Verdict::Unverified };

		Self { id, url, candidates, tracks, warnings, verdict }
	}
}

impl DiscReport {
	#[must_use]
	/// # Candidate Count.
	///
	/// This is the number of entries that were actually scored.
	pub const fn candidates(&self) -> usize { self.candidates }

	#[must_use]
	/// # Identity.
	pub const fn id(&self) -> &DiscIdentity { &self.id }

	#[must_use]
	/// # Track Reports.
	pub fn tracks(&self) -> &[TrackReport] { &self.tracks }

	#[must_use]
	/// # Lookup URL.
	pub fn url(&self) -> &str { &self.url }

	#[must_use]
	/// # Verdict.
	pub const fn verdict(&self) -> Verdict { self.verdict }

	#[must_use]
	/// # Warnings.
	///
	/// Return the identities of any database entries that didn't match the
	/// local disc.
	pub fn warnings(&self) -> &[DiscIdentity] { &self.warnings }
}
