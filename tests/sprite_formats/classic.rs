use std::io::Cursor;
use std::sync::Arc;

use isospr_rs::prelude::*;

use crate::{MASK, from_rgba8, gradient_frame};

#[test_log::test]
fn test_png_round_trip_preserves_frames() -> anyhow::Result<()> {
	let frames = [gradient_frame(0, -40, 50, 60), gradient_frame(10, 5, 7, 3)];
	let extras = [[0x0010, 0x0300], [0xFFFF, 0]];
	let sprite = decode_classic(&encode_classic_with_extra(&frames, &[1, 2], &extras))?;

	let mut repacked = Vec::new();
	let mut kept = Vec::new();
	for index in 0..sprite.frame_count() {
		kept.push(sprite.frames()[index].extra());
		let pixels = sprite.render(index)?;
		let image = image::RgbaImage::from_raw(
			pixels.width(),
			pixels.height(),
			pixels.to_rgba8(sprite.color_format()),
		)
		.ok_or_else(|| anyhow::anyhow!("bad canvas size"))?;

		let mut png = Vec::new();
		image.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
		let loaded = image::load_from_memory(&png)?.to_rgba8();
		repacked.push(FramePixels::from_pixels(
			pixels.left(),
			pixels.top(),
			loaded.width(),
			loaded.height(),
			from_rgba8(loaded.as_raw(), MASK),
			MASK,
		));
	}

	let again = decode_classic(&encode_classic_with_extra(&repacked, &[1, 2], &kept))?;
	for (index, expected) in frames.iter().enumerate() {
		assert_eq!(&again.render(index)?, expected, "frame {index}");
		assert_eq!(again.frames()[index].extra(), extras[index], "frame {index}");
	}
	assert_eq!(again.frames()[1].kind(), 2);
	Ok(())
}

#[test]
fn test_frames_share_identical_tiles() {
	let frames = vec![gradient_frame(0, 0, 24, 12); 3];
	let sprite = decode_classic(&encode_classic(&frames, &[])).unwrap();

	let first: Vec<_> = sprite.frames()[0].placements().iter().map(|p| p.block).collect();
	for frame in sprite.frames() {
		let ids: Vec<_> = frame.placements().iter().map(|p| p.block).collect();
		assert_eq!(ids, first);
	}
	assert_eq!(sprite.blocks().len(), first.len());
}

#[test]
fn test_truncated_container_fails_in_both_modes() {
	let bytes = encode_classic(&[gradient_frame(0, 0, 5, 5)], &[]);
	let cut = &bytes[..bytes.len() - 1];

	let strict = decode_classic(cut).unwrap_err();
	assert!(strict.is_truncation(), "{strict}");
	assert_eq!(strict.variant(), Variant::Classic);

	let lenient = decode_classic_with(cut, &DecodeOptions::best_effort()).unwrap_err();
	assert!(lenient.is_truncation(), "{lenient}");
}

#[test]
fn test_every_prefix_is_rejected() {
	let bytes = encode_classic(&[gradient_frame(3, 4, 30, 2)], &[]);
	for len in 0..bytes.len() {
		let err = decode_classic(&bytes[..len]).unwrap_err();
		assert!(
			matches!(err, SprError::TruncatedData { .. } | SprError::MalformedHeader { .. }),
			"prefix {len}: {err}"
		);
	}
}

#[test]
fn test_convert_halves_frames() {
	let frame = gradient_frame(0, 0, 4, 4);
	let classic = decode_classic(&encode_classic(&[frame], &[])).unwrap();
	let bytes = convert_to_classic(classic, 0.5);

	let halved = decode_classic(&bytes).unwrap();
	let pixels = halved.render(0).unwrap();
	assert_eq!(pixels.bounds(), Bounds::from_origin(0, 0, 2, 2));
	// Nearest neighbour picks source pixels (1, 1), (3, 1), (1, 3), (3, 3)
	assert_eq!(pixels.pixels(), &[0x0405, 0x0407, 0x040D, 0x040F]);
}

#[test]
fn test_sprite_moves_between_threads() {
	let frames: Vec<_> = (0..4).map(|i| gradient_frame(i * 10, 0, 30, 20)).collect();
	let sprite = Arc::new(decode_classic(&encode_classic(&frames, &[])).unwrap());

	let handles: Vec<_> = (0..4)
		.map(|index| {
			let sprite = Arc::clone(&sprite);
			std::thread::spawn(move || sprite.render(index).map(|p| p.opaque_count()))
		})
		.collect();
	for handle in handles {
		assert_eq!(handle.join().unwrap().unwrap(), 600);
	}
}

#[test]
fn test_placement_metadata_serializes() {
	let sprite = decode_classic(&encode_classic(&[gradient_frame(0, 0, 1, 1)], &[6])).unwrap();
	let json = serde_json::to_value(sprite.frames()[0].placements()).unwrap();
	assert_eq!(json, serde_json::json!([{ "a": 0, "b": 0, "kind": 6, "block": 0 }]));
}
