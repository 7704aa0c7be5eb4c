/*!
# AR Verify: Disc
*/

use crate::{
	ArVerifyError,
	CD_LEADOUT_LABEL,
	Decoder,
	DiscIdentity,
	DiscReport,
	evaluate,
	filter_candidates,
	parse_response,
	TrackChecksums,
	TrackHasher,
	TrackLayout,
	TrackPosition,
	TrackReport,
	Transport,
	VerifyOptions,
};
use fyi_ansi::{
	csi,
	dim,
};
use fyi_msg::{
	Msg,
	Progless,
};
use std::{
	fmt,
	num::NonZeroUsize,
	path::{
		Path,
		PathBuf,
	},
	sync::atomic::{
		AtomicUsize,
		Ordering::SeqCst,
	},
};



#[derive(Debug, Clone)]
/// # Disc.
///
/// A set of track files, in disc order, along with the layout and identity
/// derived from their lengths.
pub struct Disc {
	/// # Track Files.
	paths: Vec<PathBuf>,

	/// # Layout.
	layout: TrackLayout,

	/// # Identity.
	id: DiscIdentity,
}

impl fmt::Display for Disc {
	/// # Summarize the Disc.
	///
	/// This prints the disc identifiers and a table of contents-type listing
	/// of the tracks in a nice little table.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		/// # Divider.
		const DIVIDER: &str = dim!("----------------------------------------\n");

		let kv = [
			("AccurateRip:", csi!(bold, blue), self.id.to_string()),
			("CDDB:", csi!(bold, blue), format!("{:08x}", self.id.cddb_disc_id())),
		];
		let col_max: usize = kv.iter().map(|(k, _, _)| k.len()).max().unwrap_or(0);
		for (k, color, v) in kv {
			writeln!(
				f,
				concat!("{color}{k:col_max$}", csi!(), " {v}"),
				color=color,
				k=k,
				col_max=col_max,
				v=v,
			)?;
		}

		// Start the table of contents.
		f.write_str(dim!("\n##   FIRST    LAST  LENGTH  FILE\n"))?;
		f.write_str(DIVIDER)?;

		let offsets = self.layout.offsets();
		for (idx, (w, path)) in offsets.windows(2).zip(&self.paths).enumerate() {
			let name = path.file_name().map_or_else(
				|| path.to_string_lossy(),
				|n| n.to_string_lossy(),
			);
			// Empty tracks end where they start.
			let last = if w[0] == w[1] { w[0] } else { w[1] - 1 };
			writeln!(
				f,
				"{:02}  {:>6}  {:>6}  {:>6}  {name}",
				idx + 1,
				w[0],
				last,
				w[1] - w[0],
			)?;
		}

		// The leadout.
		writeln!(
			f,
			concat!(csi!(dim), "{}  {:>6}", csi!()),
			CD_LEADOUT_LABEL,
			self.layout.leadout(),
		)?;

		// Close it off!
		f.write_str(DIVIDER)?;
		writeln!(f)
	}
}

impl Disc {
	/// # New.
	///
	/// Read the length of each track — in order — and derive the disc layout
	/// and identity from them. No audio is actually decoded yet.
	///
	/// ## Errors
	///
	/// This will return an error if any of the lengths cannot be determined,
	/// or if they do not add up to a valid disc.
	pub fn new<D>(paths: Vec<PathBuf>, decoder: &D) -> Result<Self, ArVerifyError>
	where D: Decoder + ?Sized {
		let samples = paths.iter()
			.map(|p| decoder.frame_count(p))
			.collect::<Result<Vec<u64>, ArVerifyError>>()?;

		let layout = TrackLayout::new(samples)?;
		let id = DiscIdentity::from(&layout);
		Ok(Self { paths, layout, id })
	}
}

impl Disc {
	#[must_use]
	/// # Identity.
	pub const fn id(&self) -> &DiscIdentity { &self.id }

	#[must_use]
	/// # Layout.
	pub const fn layout(&self) -> &TrackLayout { &self.layout }

	#[must_use]
	/// # Track Paths.
	pub fn paths(&self) -> &[PathBuf] { &self.paths }

	#[must_use]
	/// # Track Path.
	pub fn path(&self, idx: usize) -> Option<&Path> {
		self.paths.get(idx).map(PathBuf::as_path)
	}
}

impl Disc {
	/// # Verify!
	///
	/// Look the disc up in the database, checksum every track, and see what
	/// matches.
	///
	/// The lookup happens first; if the disc isn't in the database, there's
	/// no point decoding anything, and the report will simply be marked
	/// [`Verdict::NotFound`](crate::Verdict::NotFound). The same goes for
	/// discs whose entries all belong to some other pressing (unless
	/// lenient), which are marked
	/// [`Verdict::Mismatched`](crate::Verdict::Mismatched).
	///
	/// Tracks that fail to decode are reported as indeterminate rather than
	/// aborting the whole run.
	///
	/// ## Errors
	///
	/// This will return an error if the database cannot be reached or its
	/// response cannot be parsed.
	pub fn verify<D, T>(
		&self,
		opts: &VerifyOptions,
		decoder: &D,
		transport: &T,
		progress: Option<&Progless>,
	) -> Result<DiscReport, ArVerifyError>
	where D: Decoder + ?Sized, T: Transport + ?Sized {
		let url = self.id.checksum_url_with_base(transport.base_url());
		let raw = match transport.fetch(&url) {
			Ok(raw) => raw,
			Err(ArVerifyError::NotFound) => return Ok(DiscReport::not_found(self.id, url)),
			Err(e) => return Err(e),
		};

		let candidates = parse_response(&raw)?;
		if candidates.is_empty() { return Ok(DiscReport::not_found(self.id, url)); }
		let (candidates, warnings) = filter_candidates(&self.id, candidates, opts.lenient());
		if candidates.is_empty() {
			return Ok(DiscReport::mismatched(self.id, url, warnings));
		}

		// Crunch the numbers.
		let versions = opts.versions();
		let tracks = self.checksums(decoder, progress)
			.into_iter()
			.enumerate()
			.map(|(idx, res)| TrackReport::new(
				idx,
				res.map(|sums| {
					let computed = versions.iter()
						.map(|v| sums.get(*v))
						.collect::<Vec<_>>();
					evaluate(&computed, &candidates)
				}),
			))
			.collect();

		Ok(DiscReport::new(self.id, url, candidates.len(), tracks, warnings, opts))
	}

	/// # Checksum All Tracks.
	///
	/// Tracks are independent, so they're farmed out to a handful of scoped
	/// worker threads. Results are returned in track order.
	fn checksums<D>(&self, decoder: &D, progress: Option<&Progless>)
	-> Vec<Result<TrackChecksums, ArVerifyError>>
	where D: Decoder + ?Sized {
		let total = self.paths.len();
		if let Some(p) = progress {
			let _res = p.reset(u32::try_from(total).unwrap_or(u32::MAX));
			p.set_title(Some(Msg::custom("AR Verify", 199, "Checksumming tracks…")));
		}

		let threads = std::thread::available_parallelism()
			.map_or(1, NonZeroUsize::get)
			.min(total)
			.max(1);

		let next = AtomicUsize::new(0);
		let next = &next;
		let mut out: Vec<Option<Result<TrackChecksums, ArVerifyError>>> = vec![None; total];
		std::thread::scope(|s| {
			let workers = (0..threads).map(|_| s.spawn(move || {
				let mut done = Vec::new();
				loop {
					let idx = next.fetch_add(1, SeqCst);
					if total <= idx { break; }
					done.push((idx, self.checksum_track(idx, decoder)));
					if let Some(p) = progress { p.increment(); }
				}
				done
			}))
				.collect::<Vec<_>>();

			for w in workers {
				if let Ok(done) = w.join() {
					for (idx, res) in done { out[idx] = Some(res); }
				}
			}
		});

		if let Some(p) = progress { p.finish(); }

		// Anything missing belonged to a worker that panicked.
		out.into_iter()
			.enumerate()
			.map(|(idx, res)| res.unwrap_or_else(|| Err(ArVerifyError::Decode(format!(
				"track #{:02}",
				idx + 1,
			)))))
			.collect()
	}

	/// # Checksum One Track.
	fn checksum_track<D>(&self, idx: usize, decoder: &D)
	-> Result<TrackChecksums, ArVerifyError>
	where D: Decoder + ?Sized {
		let (Some(path), Some(expected)) = (self.path(idx), self.layout.samples(idx))
		else {
			return Err(ArVerifyError::InvalidTrackLayout("track out of range"));
		};
		let position = self.layout.position(idx).unwrap_or(TrackPosition::Middle);

		let mut hasher = TrackHasher::new(idx, position, expected);
		decoder.decode(path, &mut |chunk| hasher.update(chunk))?;
		hasher.finish()
	}
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		ChecksumVersion,
		PressingTrack,
		Sample,
		track_checksums,
		Verdict,
	};
	use std::{
		cell::Cell,
		collections::HashMap,
	};

	/// # In-Memory Decoder.
	struct MemDecoder(HashMap<PathBuf, Vec<Sample>>);

	impl MemDecoder {
		fn new(tracks: &[Vec<Sample>]) -> (Self, Vec<PathBuf>) {
			let paths: Vec<PathBuf> = (1..=tracks.len())
				.map(|n| PathBuf::from(format!("{n:02}.wav")))
				.collect();
			let map = paths.iter().cloned().zip(tracks.iter().cloned()).collect();
			(Self(map), paths)
		}
	}

	impl Decoder for MemDecoder {
		fn frame_count(&self, path: &Path) -> Result<u64, ArVerifyError> {
			self.0.get(path)
				.map(|s| s.len() as u64)
				.ok_or_else(|| ArVerifyError::Decode(path.to_string_lossy().into_owned()))
		}

		fn decode(&self, path: &Path, cb: &mut dyn FnMut(&[Sample]))
		-> Result<(), ArVerifyError> {
			let samples = self.0.get(path)
				.ok_or_else(|| ArVerifyError::Decode(path.to_string_lossy().into_owned()))?;
			for chunk in samples.chunks(1000) { cb(chunk); }
			Ok(())
		}
	}

	/// # Decode-Counting Decoder.
	struct CountingDecoder(MemDecoder, AtomicUsize);

	impl Decoder for CountingDecoder {
		fn frame_count(&self, path: &Path) -> Result<u64, ArVerifyError> {
			self.0.frame_count(path)
		}

		fn decode(&self, path: &Path, cb: &mut dyn FnMut(&[Sample]))
		-> Result<(), ArVerifyError> {
			self.1.fetch_add(1, SeqCst);
			self.0.decode(path, cb)
		}
	}

	/// # Canned Transport.
	struct MemTransport {
		res: Result<Vec<u8>, ArVerifyError>,
		hits: Cell<usize>,
	}

	impl MemTransport {
		fn new(res: Result<Vec<u8>, ArVerifyError>) -> Self {
			Self { res, hits: Cell::new(0) }
		}
	}

	impl Transport for MemTransport {
		fn fetch(&self, url: &str) -> Result<Vec<u8>, ArVerifyError> {
			assert!(url.starts_with("http://mirror.test/"), "Wrong base: {url}");
			self.hits.set(self.hits.get() + 1);
			self.res.clone()
		}

		fn base_url(&self) -> &str { "http://mirror.test" }
	}

	/// # Raw Entry.
	fn entry(id: &DiscIdentity, tracks: &[(i8, u32)]) -> Vec<u8> {
		let mut out = vec![tracks.len() as u8];
		out.extend_from_slice(&id.disc_id_1().to_le_bytes());
		out.extend_from_slice(&id.disc_id_2().to_le_bytes());
		out.extend_from_slice(&id.cddb_disc_id().to_le_bytes());
		for (conf, chk) in tracks {
			out.push(*conf as u8);
			out.extend_from_slice(&chk.to_le_bytes());
			out.extend_from_slice(&[0; 4]);
		}
		out
	}

	/// # Noise.
	fn noise(len: usize, seed: u32) -> Vec<Sample> {
		let mut state = seed;
		(0..len).map(|_| {
			state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
			let [a, b, c, d] = state.to_le_bytes();
			[i16::from_le_bytes([a, b]), i16::from_le_bytes([c, d])]
		})
			.collect()
	}

	/// # Three-Track Fixture.
	fn fixture() -> (MemDecoder, Disc, [(u32, u32); 3]) {
		let tracks = [noise(20_000, 1), noise(12_345, 2), noise(30_001, 3)];
		let (dec, paths) = MemDecoder::new(&tracks);
		let disc = Disc::new(paths, &dec).expect("Disc failed.");

		let mut sums = [(0, 0); 3];
		for (idx, t) in tracks.iter().enumerate() {
			let pos = TrackPosition::new(idx, 3);
			let chk = track_checksums(idx, pos, t);
			sums[idx] = (
				chk.get(ChecksumVersion::V1).checksum(),
				chk.get(ChecksumVersion::V2).checksum(),
			);
		}

		(dec, disc, sums)
	}

	#[test]
	fn t_new() {
		let (_, disc, _) = fixture();
		assert_eq!(disc.layout().num_tracks(), 3);
		assert_eq!(disc.layout().offsets(), &[0, 35, 56, 108]);
		assert_eq!(disc.id().num_tracks(), 3);
		assert_eq!(disc.id(), &DiscIdentity::from(disc.layout()));

		// Make sure the summary doesn't choke.
		let summary = disc.to_string();
		assert!(summary.contains("02.wav"));
		assert!(summary.contains(&disc.id().to_string()));

		// Missing files are fatal here.
		let (dec, _) = MemDecoder::new(&[noise(10, 1)]);
		assert!(matches!(
			Disc::new(vec![PathBuf::from("nope.wav")], &dec),
			Err(ArVerifyError::Decode(_)),
		));

		// As are empty discs.
		assert_eq!(
			Disc::new(Vec::new(), &dec).map(|_| ()),
			Err(ArVerifyError::InvalidTrackLayout("no tracks")),
		);
	}

	#[test]
	fn t_summary_empty_track() {
		let (dec, paths) = MemDecoder::new(&[noise(1000, 1), Vec::new(), noise(1000, 2)]);
		let disc = Disc::new(paths, &dec).expect("Disc failed.");
		assert_eq!(disc.layout().offsets(), &[0, 2, 2, 4]);

		let summary = disc.to_string();
		assert!(summary.contains("01       0       1       2  01.wav"), "{summary}");
		assert!(summary.contains("02       2       2       0  02.wav"), "{summary}");
		assert!(summary.contains("03       2       3       2  03.wav"), "{summary}");
	}

	#[test]
	fn t_verify_match() {
		let (dec, disc, sums) = fixture();
		let id = *disc.id();

		// One entry with V1 sums, one with V2 sums (and a bad track 3).
		let raw = [
			entry(&id, &[(3, sums[0].0), (3, sums[1].0), (3, sums[2].0)]),
			entry(&id, &[(7, sums[0].1), (7, sums[1].1), (7, 0)]),
		].concat();
		let transport = MemTransport::new(Ok(raw));

		let opts = VerifyOptions::default();
		let report = disc.verify(&opts, &dec, &transport, None).expect("Verify failed.");
		assert_eq!(transport.hits.get(), 1);
		assert_eq!(report.verdict(), Verdict::Verified);
		assert_eq!(report.candidates(), 2);
		assert!(report.warnings().is_empty());
		assert!(report.url().ends_with(&id.checksum_file()));

		let t1 = &report.tracks()[0];
		assert_eq!(
			t1.result(ChecksumVersion::V1).and_then(|r| r.best_match()),
			Some(PressingTrack::new(3, sums[0].0)),
		);
		assert_eq!(
			t1.result(ChecksumVersion::V2).and_then(|r| r.best_match()),
			Some(PressingTrack::new(7, sums[0].1)),
		);

		// V2 alone fails on the third track.
		let report = disc.verify(&opts.with_v1(false), &dec, &transport, None)
			.expect("Verify failed.");
		assert_eq!(report.verdict(), Verdict::Unverified);
		assert!(report.tracks()[0].is_match(&opts));
		assert!(! report.tracks()[2].is_match(&opts));
		assert!(report.tracks()[2].result(ChecksumVersion::V1).is_none());

		// A confidence floor of five excludes the V1 entry, so track 3 fails.
		let report = disc.verify(&opts.with_confidence(5), &dec, &transport, None)
			.expect("Verify failed.");
		assert_eq!(report.verdict(), Verdict::Unverified);
	}

	#[test]
	fn t_verify_not_found() {
		let (dec, disc, _) = fixture();
		let opts = VerifyOptions::default();

		// 404.
		let transport = MemTransport::new(Err(ArVerifyError::NotFound));
		let report = disc.verify(&opts, &dec, &transport, None).expect("Verify failed.");
		assert_eq!(report.verdict(), Verdict::NotFound);
		assert!(report.tracks().is_empty());

		// Empty.
		let transport = MemTransport::new(Ok(Vec::new()));
		let report = disc.verify(&opts, &dec, &transport, None).expect("Verify failed.");
		assert_eq!(report.verdict(), Verdict::NotFound);

		// Known, but wrong.
		let id = *disc.id();
		let transport = MemTransport::new(Ok(entry(&id, &[(2, 1), (2, 2), (2, 3)])));
		let report = disc.verify(&opts, &dec, &transport, None).expect("Verify failed.");
		assert_eq!(report.verdict(), Verdict::Unverified);
		assert_eq!(report.tracks().len(), 3);
	}

	#[test]
	fn t_verify_errors() {
		let (dec, disc, _) = fixture();
		let opts = VerifyOptions::default();

		let transport = MemTransport::new(Err(ArVerifyError::Transport("timeout".to_owned())));
		assert_eq!(
			disc.verify(&opts, &dec, &transport, None),
			Err(ArVerifyError::Transport("timeout".to_owned())),
		);

		let transport = MemTransport::new(Ok(vec![3, 1, 2]));
		assert!(matches!(
			disc.verify(&opts, &dec, &transport, None),
			Err(ArVerifyError::MalformedResponse(_)),
		));
	}

	#[test]
	fn t_verify_headers() {
		let (dec, disc, sums) = fixture();
		let id = *disc.id();
		let other = DiscIdentity::new(id.disc_id_1(), id.disc_id_2() ^ 1, id.cddb_disc_id(), 3);
		let raw = entry(&other, &[(4, sums[0].0), (4, sums[1].0), (4, sums[2].0)]);
		let transport = MemTransport::new(Ok(raw));

		// Strict: skipped with a warning, and with nothing left to match, no
		// tracks are decoded.
		let dec = CountingDecoder(dec, AtomicUsize::new(0));
		let opts = VerifyOptions::default();
		let report = disc.verify(&opts, &dec, &transport, None).expect("Verify failed.");
		assert_eq!(report.warnings(), &[other]);
		assert_eq!(report.candidates(), 0);
		assert_eq!(report.verdict(), Verdict::Mismatched);
		assert!(report.tracks().is_empty());
		assert_eq!(dec.1.load(SeqCst), 0, "Tracks should not have been decoded.");

		// That's not the same as a disc the database has never seen.
		let missing = MemTransport::new(Err(ArVerifyError::NotFound));
		let unknown = disc.verify(&opts, &dec, &missing, None).expect("Verify failed.");
		assert_eq!(unknown.verdict(), Verdict::NotFound);
		assert_ne!(report.verdict(), unknown.verdict());
		assert_eq!(dec.1.load(SeqCst), 0, "Tracks should not have been decoded.");

		// Lenient: still warned about, but it counts.
		let report = disc.verify(&opts.with_lenient(true), &dec, &transport, None)
			.expect("Verify failed.");
		assert_eq!(report.warnings(), &[other]);
		assert_eq!(report.verdict(), Verdict::Verified);
		assert_eq!(dec.1.load(SeqCst), 3);
	}

	#[test]
	fn t_verify_indeterminate() {
		// The decoder changes its mind about the length of track two.
		struct LyingDecoder(MemDecoder);
		impl Decoder for LyingDecoder {
			fn frame_count(&self, path: &Path) -> Result<u64, ArVerifyError> {
				self.0.frame_count(path)
			}

			fn decode(&self, path: &Path, cb: &mut dyn FnMut(&[Sample]))
			-> Result<(), ArVerifyError> {
				if path.ends_with("02.wav") { cb(&[[0, 0]; 10]); Ok(()) }
				else { self.0.decode(path, cb) }
			}
		}

		let (dec, disc, sums) = fixture();
		let id = *disc.id();
		let raw = entry(&id, &[(1, sums[0].0), (1, sums[1].0), (1, sums[2].0)]);
		let transport = MemTransport::new(Ok(raw));
		let dec = LyingDecoder(dec);

		let report = disc.verify(&VerifyOptions::default(), &dec, &transport, None)
			.expect("Verify failed.");
		assert_eq!(report.verdict(), Verdict::Unverified);
		assert!(! report.tracks()[0].is_indeterminate());
		assert!(report.tracks()[2].is_match(&VerifyOptions::default()));
		assert_eq!(
			report.tracks()[1].error(),
			Some(&ArVerifyError::InsufficientSamples { track: 1, expected: 12_345, actual: 10 }),
		);
	}
}
