//! Sprite container utility.
//!
//! Subcommands:
//! - `info`: summarize a container, optionally with per-frame and per-block detail.
//! - `unpack`: render every frame to PNG and write a `metadata.json` beside them.
//! - `pack`: build a classic container from an unpacked directory.
//! - `convert`: re-encode any variant as a classic container, optionally scaled.
//! - `verify`: re-encode a container and compare the result pixel by pixel.
//!
//! Logging goes through `env_logger`; set `RUST_LOG=debug` for decoder detail.

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use isospr_rs::prelude::*;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

const METADATA_FILE: &str = "metadata.json";

#[derive(Parser)]
#[command(name = "sprite_utils")]
#[command(author = "isospr-rs project")]
#[command(version)]
#[command(
	about = "Inspect, unpack, pack and convert isometric tile-sprite containers",
	long_about = None
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Show container information
	Info {
		/// Input sprite container
		#[arg(value_name = "FILE")]
		input: PathBuf,

		#[command(flatten)]
		source: SourceArgs,

		/// List every frame and block
		#[arg(short, long)]
		detailed: bool,
	},

	/// Render frames to PNG files plus JSON metadata
	Unpack {
		/// Input sprite container
		#[arg(value_name = "FILE")]
		input: PathBuf,

		/// Output directory (defaults to the input name without extension)
		#[arg(short, long)]
		output: Option<PathBuf>,

		#[command(flatten)]
		source: SourceArgs,
	},

	/// Build a classic container from an unpacked directory
	Pack {
		/// Directory holding PNG frames and metadata.json
		#[arg(value_name = "DIR")]
		input: PathBuf,

		/// Output container path
		#[arg(short, long)]
		output: PathBuf,
	},

	/// Re-encode any container as a classic one
	Convert {
		/// Input sprite container
		#[arg(value_name = "FILE")]
		input: PathBuf,

		/// Output container path
		#[arg(short, long)]
		output: PathBuf,

		#[command(flatten)]
		source: SourceArgs,

		/// Scale factor applied to every frame
		#[arg(short, long, env = "ISOSPR_SCALE", default_value_t = 1.0)]
		scale: f64,
	},

	/// Re-encode a container as classic and compare the frames
	Verify {
		/// Input sprite container
		#[arg(value_name = "FILE")]
		input: PathBuf,

		#[command(flatten)]
		source: SourceArgs,

		/// Exit with an error if any pixel differs
		#[arg(long)]
		fail_on_mismatch: bool,
	},
}

/// Options shared by every command that decodes a container.
#[derive(clap::Args)]
struct SourceArgs {
	/// Container variant
	#[arg(long, value_enum, default_value_t = Format::Classic)]
	variant: Format,

	/// Only use this direction of a mobile container
	#[arg(long, value_name = "INDEX")]
	direction: Option<u8>,

	/// Keep going past corrupt blocks and frames
	#[arg(long, env = "ISOSPR_BEST_EFFORT")]
	best_effort: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
	Classic,
	Remastered,
	Mobile,
}

/// Per-frame entry of `metadata.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FrameMetadata {
	/// Direction index, for frames taken from a mobile container
	#[serde(default, skip_serializing_if = "Option::is_none")]
	direction: Option<u8>,
	/// Frame index within its set
	index: usize,
	/// Canvas origin, X
	left: i32,
	/// Canvas origin, Y
	top: i32,
	/// Canvas width in pixels
	width: u32,
	/// Canvas height in pixels
	height: u32,
	/// Frame type byte
	kind: u8,
	/// Opaque header words, written back unchanged by `pack`
	#[serde(default)]
	extra: [u16; 2],
	/// Placements as stored in the container
	placements: Vec<Placement>,
	/// Rendered PNG filename, absent for defective frames
	#[serde(default, skip_serializing_if = "Option::is_none")]
	filename: Option<String>,
	/// Decode error, for defective frames
	#[serde(default, skip_serializing_if = "Option::is_none")]
	defect: Option<String>,
}

/// Contents of `metadata.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SpriteMetadata {
	/// Variant the frames were decoded from
	variant: Variant,
	/// Transparency color of the source container
	mask_color: u16,
	/// Palette colors of the source container, if any
	#[serde(default)]
	palette: Vec<u16>,
	/// Total number of frames
	frame_count: usize,
	/// Frame entries
	frames: Vec<FrameMetadata>,
}

fn main() -> Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
	let cli = Cli::parse();

	match cli.command {
		Commands::Info {
			input,
			source,
			detailed,
		} => handle_info(&input, &source, detailed),
		Commands::Unpack {
			input,
			output,
			source,
		} => handle_unpack(&input, output, &source),
		Commands::Pack {
			input,
			output,
		} => handle_pack(&input, &output),
		Commands::Convert {
			input,
			output,
			source,
			scale,
		} => handle_convert(&input, &output, &source, scale),
		Commands::Verify {
			input,
			source,
			fail_on_mismatch,
		} => handle_verify(&input, &source, fail_on_mismatch),
	}
}

/// Decodes `path` into `(direction, set)` pairs. Non-mobile containers yield a
/// single pair with no direction.
fn load(path: &Path, source: &SourceArgs) -> Result<Vec<(Option<u8>, SpriteSet)>> {
	let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
	let options = if source.best_effort {
		DecodeOptions::best_effort()
	} else {
		DecodeOptions::default()
	};
	debug!("Loaded {} bytes from {}", bytes.len(), path.display());

	let sets = match source.variant {
		Format::Classic => vec![(None, decode_classic_with(&bytes, &options)?)],
		Format::Remastered => vec![(None, decode_remastered_with(&bytes, &options)?)],
		Format::Mobile => {
			let set = decode_mobile_with(&bytes, &options)?;
			info!("{set}");
			let mut directions = set.into_directions();
			match source.direction {
				Some(d) => match directions.remove(&d) {
					Some(set) => vec![(Some(d), set)],
					None => bail!("Direction {d} is not present in {}", path.display()),
				},
				None => directions.into_iter().map(|(d, set)| (Some(d), set)).collect(),
			}
		}
	};
	if source.direction.is_some() && !matches!(source.variant, Format::Mobile) {
		warn!("--direction only applies to mobile containers, ignoring it");
	}
	Ok(sets)
}

/// Picks the single set a conversion works on.
fn single(path: &Path, source: &SourceArgs) -> Result<SpriteSet> {
	let mut sets = load(path, source)?;
	if sets.len() != 1 {
		bail!("{} holds {} directions, choose one with --direction", path.display(), sets.len());
	}
	Ok(sets.remove(0).1)
}

fn handle_info(input: &Path, source: &SourceArgs, detailed: bool) -> Result<()> {
	let file_size = fs::metadata(input)?.len();
	println!("Sprite container: {}", input.display());
	println!("   File size: {} bytes ({:.2} KB)", file_size, file_size as f64 / 1024.0);

	let sets = load(input, source)?;
	for (direction, set) in &sets {
		match direction {
			Some(d) => println!("\nDirection {d}: {set}"),
			None => println!("\n{set}"),
		}
		println!("   Mask color: 0x{:04X}", set.mask_color());
		println!("   Defective frames: {}", set.defective_frames());
		println!("   Defective blocks: {}", set.blocks().defect_count());

		if !detailed {
			continue;
		}
		println!(
			"\n   {:<5} {:<12} {:<14} {:<6} {:<10}",
			"Index", "Size", "Origin", "Type", "Tiles"
		);
		println!("   {}", "-".repeat(52));
		for (index, frame) in set.frames().iter().enumerate() {
			println!(
				"   {:<5} {:<12} ({:>5}, {:>5}) {:<6} {:<10}{}",
				index,
				format!("{}x{}", frame.width(), frame.height()),
				frame.left(),
				frame.top(),
				frame.kind(),
				frame.placements().len(),
				frame.defect().map(|e| format!(" defective: {e}")).unwrap_or_default()
			);
		}
	}

	// Every direction shares one block table
	if let (true, Some((_, set))) = (detailed, sets.first()) {
		let blocks = set.blocks();
		println!("\n   {:<7} {:<32} {:<20}", "Block", "MD5", "Content");
		println!("   {}", "-".repeat(62));
		for id in 0..blocks.len() as BlockId {
			match (blocks.digest(id), blocks.content_bounds(id)) {
				(Ok(digest), Ok(Some(bounds))) => println!(
					"   {:<7} {} {}x{} at ({}, {})",
					id,
					hex::encode(digest),
					bounds.width(),
					bounds.height(),
					bounds.left,
					bounds.top
				),
				(Ok(digest), Ok(None)) => println!("   {:<7} {} blank", id, hex::encode(digest)),
				(Err(err), _) | (_, Err(err)) => println!("   {:<7} defective: {err}", id),
			}
		}
	}

	Ok(())
}

fn handle_unpack(input: &Path, output: Option<PathBuf>, source: &SourceArgs) -> Result<()> {
	let output = output.unwrap_or_else(|| input.with_extension(""));
	fs::create_dir_all(&output)
		.with_context(|| format!("Failed to create {}", output.display()))?;

	let sets = load(input, source)?;
	let Some((_, first)) = sets.first() else {
		bail!("No sprite sets decoded from {}", input.display());
	};
	let mut metadata = SpriteMetadata {
		variant: first.variant(),
		mask_color: first.mask_color(),
		palette: first.palette().map(|p| p.colors().to_vec()).unwrap_or_default(),
		frame_count: 0,
		frames: Vec::new(),
	};

	for (direction, set) in &sets {
		let format = set.color_format();
		for (index, rendered) in set.render_all().into_iter().enumerate() {
			let frame = &set.frames()[index];
			let mut entry = FrameMetadata {
				direction: *direction,
				index,
				left: frame.left(),
				top: frame.top(),
				width: frame.width(),
				height: frame.height(),
				kind: frame.kind(),
				extra: frame.extra(),
				placements: frame.placements().to_vec(),
				filename: None,
				defect: None,
			};
			match rendered {
				Ok(pixels) => {
					let filename = match direction {
						Some(d) => format!("dir{d}_frame_{index:04}.png"),
						None => format!("frame_{index:04}.png"),
					};
					let image = image::RgbaImage::from_raw(
						pixels.width(),
						pixels.height(),
						pixels.to_rgba8(format),
					)
					.context("Rendered frame does not match its dimensions")?;
					image
						.save(output.join(&filename))
						.with_context(|| format!("Failed to write {filename}"))?;
					entry.filename = Some(filename);
				}
				Err(err) => {
					warn!("Frame #{index} not rendered: {err}");
					entry.defect = Some(err.to_string());
				}
			}
			metadata.frames.push(entry);
		}
	}
	metadata.frame_count = metadata.frames.len();

	let path = output.join(METADATA_FILE);
	fs::write(&path, serde_json::to_string_pretty(&metadata)?)?;
	info!("Unpacked {} frames to {}", metadata.frame_count, output.display());
	Ok(())
}

fn handle_pack(input: &Path, output: &Path) -> Result<()> {
	let path = input.join(METADATA_FILE);
	let metadata: SpriteMetadata = serde_json::from_str(
		&fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?,
	)?;
	let source_format = metadata.variant.color_format();

	let mut images = Vec::with_capacity(metadata.frames.len());
	let mut selector = MaskSelector::new();
	for entry in &metadata.frames {
		let image = match &entry.filename {
			Some(name) => Some(
				image::open(input.join(name))
					.with_context(|| format!("Failed to open {name}"))?
					.to_rgba8(),
			),
			None => None,
		};
		if let Some(image) = &image {
			selector.observe_all(
				image
					.pixels()
					.filter(|p| p[3] != 0)
					.map(|p| ColorFormat::Rgb555.from_rgb8([p[0], p[1], p[2]])),
			);
		}
		images.push(image);
	}
	let mask = selector.select();
	debug!("Packing with mask 0x{mask:04X} (source was {source_format:?})");

	let mut frames = Vec::with_capacity(images.len());
	let mut kinds = Vec::with_capacity(images.len());
	let mut extras = Vec::with_capacity(images.len());
	for (entry, image) in metadata.frames.iter().zip(images) {
		kinds.push(entry.kind);
		extras.push(entry.extra);
		let Some(image) = image else {
			frames.push(FramePixels::new(0, 0, 1, 1, mask));
			continue;
		};
		let pixels = image
			.pixels()
			.map(|p| {
				if p[3] == 0 {
					mask
				} else {
					ColorFormat::Rgb555.from_rgb8([p[0], p[1], p[2]])
				}
			})
			.collect();
		frames.push(FramePixels::from_pixels(
			entry.left,
			entry.top,
			image.width(),
			image.height(),
			pixels,
			mask,
		));
	}

	let bytes = encode_classic_with_extra(&frames, &kinds, &extras);
	fs::write(output, &bytes).with_context(|| format!("Failed to write {}", output.display()))?;
	info!("Packed {} frames into {} ({} bytes)", frames.len(), output.display(), bytes.len());
	Ok(())
}

fn handle_convert(input: &Path, output: &Path, source: &SourceArgs, scale: f64) -> Result<()> {
	let set = single(input, source)?;
	let frames = set.frame_count();
	let bytes = convert_to_classic(set, scale);
	fs::write(output, &bytes).with_context(|| format!("Failed to write {}", output.display()))?;
	info!("Converted {frames} frames into {} ({} bytes)", output.display(), bytes.len());
	Ok(())
}

fn handle_verify(input: &Path, source: &SourceArgs, fail_on_mismatch: bool) -> Result<()> {
	let original = single(input, source)?;
	let format = original.color_format();
	let encoded = convert_to_classic(original.clone(), 1.0);
	let decoded = decode_classic(&encoded).context("Re-encoded container does not decode")?;

	if decoded.frame_count() != original.frame_count().min(MAX_CLASSIC_FRAMES) {
		bail!(
			"Frame count changed: {} -> {}",
			original.frame_count(),
			decoded.frame_count()
		);
	}

	let mut mismatched_frames = 0;
	for index in 0..decoded.frame_count() {
		let Ok(before) = original.render(index) else {
			debug!("Frame #{index} is defective in the source, skipping");
			continue;
		};
		let after = decoded.render(index)?;
		let mut differing = 0usize;
		for y in before.top()..before.top() + before.height() as i32 {
			for x in before.left()..before.left() + before.width() as i32 {
				let expected = before
					.get_absolute(x, y)
					.filter(|&c| c != before.mask_color())
					.map(|c| format.convert(c, ColorFormat::Rgb555));
				let actual = after.get_absolute(x, y).filter(|&c| c != after.mask_color());
				if expected != actual {
					differing += 1;
				}
			}
		}
		if differing > 0 {
			mismatched_frames += 1;
			warn!("Frame #{index}: {differing} pixels differ");
		}
	}

	println!(
		"{}: {} frames, {} with differences ({} -> {} bytes)",
		input.display(),
		decoded.frame_count(),
		mismatched_frames,
		fs::metadata(input)?.len(),
		encoded.len()
	);
	if fail_on_mismatch && mismatched_frames > 0 {
		bail!("{mismatched_frames} frames did not survive re-encoding");
	}
	Ok(())
}
