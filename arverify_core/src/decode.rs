/*!
# AR Verify: Decoding
*/

use crate::{
	ArVerifyError,
	Sample,
};
use hound::{
	SampleFormat,
	WavReader,
};
use std::{
	fs::File,
	path::Path,
};
use symphonia::core::{
	audio::SampleBuffer,
	codecs::DecoderOptions,
	errors::Error as SymphoniaError,
	formats::FormatOptions,
	io::MediaSourceStream,
	meta::MetadataOptions,
	probe::Hint,
};



/// # Decode Chunk Size (Samples).
///
/// WAV samples are fed to the callback in batches of this many. (FLAC uses
/// whatever its block size happens to be.)
const CHUNK: usize = 588 * 32;

/// # Required Sample Rate.
const SAMPLE_RATE: u32 = 44_100;



/// # Decoder.
///
/// This turns a track file into a stream of signed 16-bit stereo samples.
///
/// Implementations must be `Sync`; tracks are decoded in parallel.
pub trait Decoder: Sync {
	/// # Frame Count.
	///
	/// Return the total number of (stereo) samples in the file without
	/// decoding it.
	///
	/// ## Errors
	///
	/// This should return [`ArVerifyError::Decode`] if the file is missing,
	/// unsupported, or its length cannot be determined.
	fn frame_count(&self, path: &Path) -> Result<u64, ArVerifyError>;

	/// # Decode.
	///
	/// Decode the file from start to finish, passing the samples to the
	/// callback in order, one chunk at a time.
	///
	/// ## Errors
	///
	/// This should return [`ArVerifyError::Decode`] on any failure.
	fn decode(&self, path: &Path, cb: &mut dyn FnMut(&[Sample]))
	-> Result<(), ArVerifyError>;
}



#[derive(Debug, Clone, Copy, Default)]
/// # Audio Decoder.
///
/// Pick the [`WavDecoder`] or [`FlacDecoder`] according to the file
/// extension.
pub struct AudioDecoder;

impl Decoder for AudioDecoder {
	fn frame_count(&self, path: &Path) -> Result<u64, ArVerifyError> {
		match AudioKind::try_from(path)? {
			AudioKind::Flac => FlacDecoder.frame_count(path),
			AudioKind::Wav => WavDecoder.frame_count(path),
		}
	}

	fn decode(&self, path: &Path, cb: &mut dyn FnMut(&[Sample]))
	-> Result<(), ArVerifyError> {
		match AudioKind::try_from(path)? {
			AudioKind::Flac => FlacDecoder.decode(path, cb),
			AudioKind::Wav => WavDecoder.decode(path, cb),
		}
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Audio Kind.
///
/// The supported file types, by extension.
pub enum AudioKind {
	/// # FLAC.
	Flac,

	/// # WAV.
	Wav,
}

impl TryFrom<&Path> for AudioKind {
	type Error = ArVerifyError;

	fn try_from(src: &Path) -> Result<Self, Self::Error> {
		let ext = src.extension().and_then(|e| e.to_str()).unwrap_or_default();
		if ext.eq_ignore_ascii_case("flac") { Ok(Self::Flac) }
		else if ext.eq_ignore_ascii_case("wav") { Ok(Self::Wav) }
		else { Err(decode_err(src, "unsupported format")) }
	}
}



#[derive(Debug, Clone, Copy, Default)]
/// # WAV Decoder.
pub struct WavDecoder;

impl WavDecoder {
	/// # Open and Check.
	fn open(path: &Path) -> Result<WavReader<std::io::BufReader<File>>, ArVerifyError> {
		let reader = WavReader::open(path).map_err(|e| decode_err(path, &e.to_string()))?;
		let spec = reader.spec();
		if
			spec.channels == 2 &&
			spec.sample_rate == SAMPLE_RATE &&
			spec.bits_per_sample == 16 &&
			spec.sample_format == SampleFormat::Int
		{
			Ok(reader)
		}
		else { Err(decode_err(path, "not 16-bit stereo 44.1 kHz")) }
	}
}

impl Decoder for WavDecoder {
	fn frame_count(&self, path: &Path) -> Result<u64, ArVerifyError> {
		Self::open(path).map(|r| u64::from(r.duration()))
	}

	fn decode(&self, path: &Path, cb: &mut dyn FnMut(&[Sample]))
	-> Result<(), ArVerifyError> {
		let mut reader = Self::open(path)?;
		let mut buf: Vec<Sample> = Vec::with_capacity(CHUNK);
		let mut left = None;
		for s in reader.samples::<i16>() {
			let s = s.map_err(|e| decode_err(path, &e.to_string()))?;
			match left.take() {
				None => { left.replace(s); },
				Some(l) => {
					buf.push([l, s]);
					if buf.len() == CHUNK {
						cb(&buf);
						buf.clear();
					}
				},
			}
		}

		// Hound won't hand us half a sample, but just in case…
		if left.is_some() { return Err(decode_err(path, "incomplete sample")); }

		if ! buf.is_empty() { cb(&buf); }
		Ok(())
	}
}



#[derive(Debug, Clone, Copy, Default)]
/// # FLAC Decoder.
pub struct FlacDecoder;

impl FlacDecoder {
	/// # Open and Check.
	///
	/// Probe the file, make sure the format is right, and return the reader,
	/// track ID, and total frame count.
	fn open(path: &Path)
	-> Result<(Box<dyn symphonia::core::formats::FormatReader>, u32, u64), ArVerifyError> {
		let file = File::open(path).map_err(|e| decode_err(path, &e.to_string()))?;
		let mss = MediaSourceStream::new(Box::new(file), Default::default());

		let mut hint = Hint::new();
		hint.with_extension("flac");

		let probed = symphonia::default::get_probe()
			.format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
			.map_err(|e| decode_err(path, &e.to_string()))?;
		let reader = probed.format;

		let track = reader.default_track().ok_or_else(|| decode_err(path, "no audio"))?;
		let params = &track.codec_params;
		if
			params.sample_rate != Some(SAMPLE_RATE) ||
			params.channels.map(|c| c.count()) != Some(2) ||
			params.bits_per_sample != Some(16)
		{
			return Err(decode_err(path, "not 16-bit stereo 44.1 kHz"));
		}

		let frames = params.n_frames.ok_or_else(|| decode_err(path, "unknown length"))?;
		let id = track.id;
		Ok((reader, id, frames))
	}
}

impl Decoder for FlacDecoder {
	fn frame_count(&self, path: &Path) -> Result<u64, ArVerifyError> {
		Self::open(path).map(|(_, _, frames)| frames)
	}

	fn decode(&self, path: &Path, cb: &mut dyn FnMut(&[Sample]))
	-> Result<(), ArVerifyError> {
		let (mut reader, track_id, total) = Self::open(path)?;
		let params = reader.tracks().iter()
			.find(|t| t.id == track_id)
			.map(|t| t.codec_params.clone())
			.ok_or_else(|| decode_err(path, "no audio"))?;
		let mut decoder = symphonia::default::get_codecs()
			.make(&params, &DecoderOptions::default())
			.map_err(|e| decode_err(path, &e.to_string()))?;

		let mut sbuf: Option<SampleBuffer<i16>> = None;
		let mut buf: Vec<Sample> = Vec::new();
		let mut left = total;
		while left != 0 {
			let packet = match reader.next_packet() {
				Ok(p) => p,
				Err(SymphoniaError::IoError(e))
					if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
				Err(SymphoniaError::ResetRequired) => {
					decoder.reset();
					continue;
				},
				Err(e) => return Err(decode_err(path, &e.to_string())),
			};
			if packet.track_id() != track_id { continue; }

			// A skipped packet would throw off every position after it, so
			// decoding errors are fatal.
			let decoded = decoder.decode(&packet).map_err(|e| decode_err(path, &e.to_string()))?;

			// (Re)allocate the conversion buffer if needed.
			let needed = decoded.frames() * 2;
			if sbuf.as_ref().map_or(true, |s| s.capacity() < needed) {
				sbuf.replace(SampleBuffer::new(decoded.capacity() as u64, *decoded.spec()));
			}
			let Some(s) = sbuf.as_mut() else { continue; };
			s.copy_interleaved_ref(decoded);

			// The final block may be padded past the advertised length;
			// anything beyond that isn't part of the track.
			buf.clear();
			buf.extend(
				s.samples().chunks_exact(2)
					.map(|pair| [pair[0], pair[1]])
					.take(usize::try_from(left).unwrap_or(usize::MAX))
			);
			left -= buf.len() as u64;
			if ! buf.is_empty() { cb(&buf); }
		}

		Ok(())
	}
}



/// # Decode Error.
fn decode_err(path: &Path, reason: &str) -> ArVerifyError {
	let name = path.file_name().map_or_else(
		|| path.to_string_lossy(),
		|n| n.to_string_lossy(),
	);
	ArVerifyError::Decode(format!("{name} ({reason})"))
}
