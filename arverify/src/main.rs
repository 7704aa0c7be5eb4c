/*!
# AR Verify
*/

#![forbid(unsafe_code)]

#![deny(
	clippy::allow_attributes_without_reason,
	clippy::correctness,
	unreachable_pub,
)]

#![warn(
	clippy::complexity,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::style,

	clippy::allow_attributes,
	clippy::clone_on_ref_ptr,
	clippy::create_dir,
	clippy::filetype_is_file,
	clippy::format_push_string,
	clippy::get_unwrap,
	clippy::impl_trait_in_params,
	clippy::lossy_float_literal,
	clippy::missing_assert_message,
	clippy::missing_docs_in_private_items,
	clippy::needless_raw_strings,
	clippy::panic_in_result_fn,
	clippy::pub_without_shorthand,
	clippy::rest_pat_in_fully_bound_structs,
	clippy::semicolon_inside_block,
	clippy::str_to_string,
	clippy::string_to_string,
	clippy::todo,
	clippy::undocumented_unsafe_blocks,
	clippy::unneeded_field_pattern,
	clippy::unseparated_literal_suffix,
	clippy::unwrap_in_result,

	macro_use_extern_crate,
	missing_copy_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![expect(clippy::redundant_pub_crate, reason = "Unresolvable.")]



mod cli;

use arverify_core::{
	ArVerifyError,
	AudioDecoder,
	ChecksumVersion,
	Disc,
	DiscReport,
	HttpTransport,
	TrackReport,
	Transport,
	Verdict,
	VerifyLog,
	VerifyOptions,
};
use dactyl::NiceU32;
use fyi_ansi::{
	ansi,
	csi,
	dim,
};
use fyi_msg::{
	Msg,
	Progless,
};
use std::process::ExitCode;



/// # Main.
///
/// This lets us bubble up startup errors so they can be pretty-printed.
fn main() -> ExitCode {
	match main__() {
		Ok(Verdict::Verified) => ExitCode::SUCCESS,
		Ok(_) => ExitCode::FAILURE,
		Err(e @ (ArVerifyError::PrintHelp | ArVerifyError::PrintVersion)) => {
			println!("{e}");
			ExitCode::SUCCESS
		},
		Err(e) => {
			Msg::from(e).eprint();
			ExitCode::FAILURE
		},
	}
}

#[inline]
/// # Actual Main.
///
/// This does all the stuff.
fn main__() -> Result<Verdict, ArVerifyError> {
	let settings = cli::parse()?;
	let log = VerifyLog::new();

	// Load the disc.
	let paths = cli::list_tracks(&settings.dir)?;
	let disc = Disc::new(paths, &AudioDecoder)?;
	eprintln!("{disc}");

	let mut transport = HttpTransport::new(u64::from(settings.timeout));
	if let Some(base) = settings.base_url.as_deref() {
		transport = transport.with_base_url(base);
	}
	let url = disc.id().checksum_url_with_base(transport.base_url());

	// Just the identity?
	if settings.no_fetch {
		println!("{url}");
		return Ok(Verdict::Verified);
	}

	// Verify!
	let progress = Progless::default();
	let report = disc.verify(&settings.opts, &AudioDecoder, &transport, Some(&progress))?;
	summarize(&report, &settings.opts);

	if settings.opts.verbose() { log.print(&disc, &report, &settings.opts); }

	Ok(report.verdict())
}

/// # Summarize.
///
/// Print a line for each track, followed by the overall verdict.
fn summarize(report: &DiscReport, opts: &VerifyOptions) {
	// Warn about funny entries.
	for other in report.warnings() {
		Msg::warning(format!(
			"{} database entry {other}.",
			if opts.lenient() { "Scoring mismatched" } else { "Skipping mismatched" },
		)).eprint();
	}

	match report.verdict() {
		Verdict::NotFound => {
			Msg::warning(format!(
				"The disc is not present in the AccurateRip database.\n{}",
				report.url(),
			)).eprint();
			return;
		},
		Verdict::Mismatched => {
			Msg::warning(format!(
				"The AccurateRip database only has entries for other discs with this key; try --lenient to score them anyway.\n{}",
				report.url(),
			)).eprint();
			return;
		},
		Verdict::Verified | Verdict::Unverified => {},
	}

	// Tracks.
	eprintln!(dim!("##      V1 CONFIDENCE      V2 CONFIDENCE"));
	for t in report.tracks() { eprintln!("{}", track_line(t, opts)); }
	eprintln!();

	let total = NiceU32::from(u32::try_from(report.tracks().len()).unwrap_or(u32::MAX));
	let good = NiceU32::from(u32::try_from(
		report.tracks().iter().filter(|t| t.is_match(opts)).count()
	).unwrap_or(u32::MAX));

	if matches!(report.verdict(), Verdict::Verified) {
		Msg::success(format!("All {total} tracks were verified by AccurateRip.")).eprint();
	}
	else {
		Msg::error(format!("Only {good} of {total} tracks could be verified by AccurateRip."))
			.eprint();
	}
}

/// # Track Line.
fn track_line(t: &TrackReport, opts: &VerifyOptions) -> String {
	use std::fmt::Write;

	let mut out = format!("{:02}", t.track_index() + 1);
	if let Some(err) = t.error() {
		let _res = write!(out, ansi!((bold, light_red) "  {err}"), err=err);
		return out;
	}

	for v in ChecksumVersion::ALL {
		let _res = match t.result(v) {
			Some(r) => match r.best_match() {
				Some(m) if opts.accepts(m.confidence()) => write!(
					out,
					concat!("  {:08x}  ", csi!(bold, light_green), "{:>5}", csi!()),
					r.computed_checksum(),
					m.confidence(),
				),
				Some(m) => write!(
					out,
					concat!("  {:08x}  ", csi!(light_yellow), "{:>5}", csi!()),
					r.computed_checksum(),
					m.confidence(),
				),
				None => write!(
					out,
					concat!("  {:08x}  ", csi!(light_red), "{:>5}", csi!()),
					r.computed_checksum(),
					"--",
				),
			},
			None => write!(out, dim!("  {:8}  {:>5}"), "--------", "--"),
		};
	}

	out
}
