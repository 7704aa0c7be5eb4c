/*!
# AR Verify: Log
*/

use crate::{
	ChecksumVersion,
	Disc,
	DiscReport,
	VerifyOptions,
};
use dactyl::NiceElapsed;
use std::{
	io::Write,
	time::Instant,
};
use utc2k::FmtUtc2k;



#[derive(Debug, Clone)]
/// # Verification Log.
///
/// This collects the run timing so a plain-text, greppable summary of a
/// [`DiscReport`] can be written out at the end. The CLI prints it to STDOUT
/// when `-v`/`--verbose` is set, so it can be piped to a file for safe
/// keeping.
pub struct VerifyLog {
	/// # Start Time (Wall).
	date: FmtUtc2k,

	/// # Start Time (Monotonic).
	start: Instant,
}

impl Default for VerifyLog {
	fn default() -> Self { Self::new() }
}

impl VerifyLog {
	#[must_use]
	/// # New.
	///
	/// Note the current time.
	pub fn new() -> Self {
		Self {
			date: FmtUtc2k::now(),
			start: Instant::now(),
		}
	}

	/// # Print.
	///
	/// Write the log to STDOUT.
	pub fn print(&self, disc: &Disc, report: &DiscReport, opts: &VerifyOptions) {
		let writer = std::io::stdout();
		let mut handle = writer.lock();
		let _res = self.write(&mut handle, disc, report, opts)
			.and_then(|()| handle.flush());
	}

	/// # Write.
	///
	/// ## Errors
	///
	/// This will bubble up any write errors.
	pub fn write<W: Write>(
		&self,
		w: &mut W,
		disc: &Disc,
		report: &DiscReport,
		opts: &VerifyOptions,
	) -> std::io::Result<()> {
		// Header.
		writeln!(
			w,
			concat!("#####
## AR Verify v", env!("CARGO_PKG_VERSION"), "
##
## Date:       {}
## Elapsed:    {}
## Disc:       {}
## URL:        {}
## Versions:   {}
## Confidence: {}+
## Headers:    {}
## Entries:    {}
## Verdict:    {}
##
## Each track line contains the following fields, separated by two spaces:
##   * Track Number                   [2 digits]
##   * Sample Count
##   * Checksum                       [8 hex digits, per version]
##   * Confidence                     [-- if no match, per version]
##   * Status (OK, FAIL, ERROR)
##   * File
#####"),
			self.date,
			NiceElapsed::from(self.start),
			report.id(),
			report.url(),
			opts.versions().iter()
				.map(|v| v.as_str())
				.collect::<Vec<_>>()
				.join(", "),
			opts.confidence(),
			if opts.lenient() { "Lenient" } else { "Strict" },
			report.candidates(),
			report.verdict().as_str(),
		)?;

		// Mismatched entries.
		for other in report.warnings() {
			writeln!(w, "## Mismatched entry: {other}")?;
		}
		if ! report.warnings().is_empty() { writeln!(w, "##")?; }

		// Tracks.
		for t in report.tracks() {
			let idx = t.track_index();
			let name = disc.path(idx)
				.and_then(|p| p.file_name())
				.map(|n| n.to_string_lossy())
				.unwrap_or_default();
			let samples = disc.layout().samples(idx).unwrap_or_default();
			write!(w, "{:02}  {samples:>10}", idx + 1)?;

			if let Some(err) = t.error() {
				writeln!(w, "  ERROR  {name}  {err}")?;
				continue;
			}

			for v in ChecksumVersion::ALL {
				match t.result(v) {
					Some(r) => match r.best_match() {
						Some(m) => write!(w, "  {:08x}  {:>3}", r.computed_checksum(), m.confidence())?,
						None => write!(w, "  {:08x}   --", r.computed_checksum())?,
					},
					None => write!(w, "  {:8}  {:3}", "", "")?,
				}
			}

			writeln!(
				w,
				"  {}  {name}",
				if t.is_match(opts) { "OK   " } else { "FAIL " },
			)?;
		}

		Ok(())
	}
}
