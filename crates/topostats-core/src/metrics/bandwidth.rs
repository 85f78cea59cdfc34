//! Variable-bandwidth analysis.
//!
//! At level `m` the data is cut into `2^m` pieces per axis. Every piece has
//! its least-squares line (profiles) or plane (maps) removed and the RMS of
//! the residual is averaged over pieces. The bandwidth of a level is the
//! physical length of one piece. Halving stops once a piece would hold fewer
//! than `MIN_SEGMENT_POINTS` samples.
use super::detrend::{line_residuals, plane_residuals, rms};
use super::profiles::UniformProfiles;
use super::RawCurve;
use crate::heightfield::AreaMap;

const MIN_SEGMENT_POINTS: usize = 3;

/// Pieces smaller than this are dominated by the detrend and are flagged
/// unreliable.
const RELIABLE_SEGMENT_POINTS: usize = 8;

/// Profile decomposition: one point per level, coarsest bandwidth last.
pub fn profile_decomposition(bundle: &UniformProfiles) -> RawCurve {
    let n = bundle.len();
    let mut levels = Vec::new();
    let mut segments = 1usize;
    while n / segments >= MIN_SEGMENT_POINTS {
        let points = n / segments;
        let mut total = 0.0;
        let mut pieces = 0usize;
        for line in &bundle.lines {
            for chunk in line.chunks_exact(points).take(segments) {
                total += rms(&line_residuals(chunk));
                pieces += 1;
            }
        }
        if pieces > 0 {
            levels.push((points as f64 * bundle.spacing, total / pieces as f64, points));
        }
        segments *= 2;
    }
    into_curve(levels)
}

/// Areal decomposition of a map into square arrangements of tiles.
pub fn areal_decomposition(map: &AreaMap) -> RawCurve {
    let (px, py) = map.pixel_size();
    let mut levels = Vec::new();
    let mut segments = 1usize;
    while map.nx / segments >= MIN_SEGMENT_POINTS && map.ny / segments >= MIN_SEGMENT_POINTS {
        let (tx, ty) = (map.nx / segments, map.ny / segments);
        let mut tile = Vec::with_capacity(tx * ty);
        let mut total = 0.0;
        for sx in 0..segments {
            for sy in 0..segments {
                tile.clear();
                for ix in sx * tx..(sx + 1) * tx {
                    for iy in sy * ty..(sy + 1) * ty {
                        tile.push(map.get(ix, iy));
                    }
                }
                total += rms(&plane_residuals(&tile, tx, ty));
            }
        }
        let bandwidth = (tx as f64 * px * ty as f64 * py).sqrt();
        levels.push((bandwidth, total / (segments * segments) as f64, tx.min(ty)));
        segments *= 2;
    }
    into_curve(levels)
}

fn into_curve(mut levels: Vec<(f64, f64, usize)>) -> RawCurve {
    levels.reverse();
    let mut curve = RawCurve::default();
    for (bandwidth, rms_height, points) in levels {
        curve.x.push(bandwidth);
        curve.y.push(rms_height);
        curve.reliable.push(points >= RELIABLE_SEGMENT_POINTS);
    }
    curve
}
