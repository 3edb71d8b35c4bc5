//! Isometric grid transform.
//!
//! Placements are stored as a signed `(A, B)` pair rather than as a dense
//! `(column, row)` cell. On the dense grid a cell `(gx, gy)` covers the pixels
//! `[gx*edge, (gx+1)*edge) × [gy*edge, (gy+1)*edge)`.
//!
//! ```text
//! forward:  aAdj = A < 0 ? A - 1 : A
//!           x    = edge * (B + A - aAdj/2)
//!           y    = edge/2 * (B - aAdj/2)
//!
//! inverse:  A = gx - 2*gy
//!           B = 2*gy + (A >= 0 ? A/2 : (A-1)/2)
//! ```
//!
//! All divisions truncate toward zero.
//!
//! The classic reader places tiles with `aAdj = A`, i.e. without the rounding
//! correction for negative `A`. For odd negative `A` this lands the tile half a
//! tile away from where the remastered and mobile readers would put it. Both
//! conventions are kept side by side; see [`classic_tile_origin`].

/// Pixel-space origin of the tile stored at `(a, b)`, with the negative-`A`
/// rounding correction used by the remastered and mobile readers.
pub fn tile_origin(a: i32, b: i32, edge: i32) -> (i32, i32) {
	let a_adj = if a < 0 {
		a - 1
	} else {
		a
	};
	(edge * (b + a - a_adj / 2), edge / 2 * (b - a_adj / 2))
}

/// Pixel-space origin of the tile stored at `(a, b)` as the classic reader
/// computes it: the same formula as [`tile_origin`] minus the correction.
pub fn classic_tile_origin(a: i32, b: i32, edge: i32) -> (i32, i32) {
	(edge * (b + a - a / 2), edge / 2 * (b - a / 2))
}

/// Converts a dense grid cell to the stored `(A, B)` pair.
pub fn grid_to_stored(gx: i32, gy: i32) -> (i32, i32) {
	let a = gx - 2 * gy;
	let b = 2 * gy
		+ if a >= 0 {
			a / 2
		} else {
			(a - 1) / 2
		};
	(a, b)
}

/// Converts a stored `(A, B)` pair back to its dense grid cell.
///
/// Pairs that do not sit on the dense grid (the half-row positions the
/// encoding can express but [`grid_to_stored`] never produces) round toward
/// the cell above.
pub fn stored_to_grid(a: i32, b: i32) -> (i32, i32) {
	let a_adj = if a < 0 {
		a - 1
	} else {
		a
	};
	(b + a - a_adj / 2, (b - a_adj / 2).div_euclid(2))
}
