use ndarray::Array2;

/// Index of the coordinate value nearest to `target`.
///
/// Coordinates may be ascending or descending (ERA5 latitudes are stored
/// north-to-south); the scan is linear since the axes are short.
pub fn nearest_index(coords: &[f64], target: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &c) in coords.iter().enumerate() {
        let d = (c - target).abs();
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Fractional position of `target` within `coords`, clamped to the axis.
///
/// Returns (lower index, weight of the upper neighbor). Works for both
/// ascending and descending axes.
pub fn interp_weights(coords: &[f64], target: f64) -> (usize, f64) {
    let n = coords.len();
    if n < 2 {
        return (0, 0.0);
    }
    let ascending = coords[0] < coords[n - 1];
    for i in 0..n - 1 {
        let (lo, hi) = (coords[i], coords[i + 1]);
        let inside = if ascending {
            target >= lo && target <= hi
        } else {
            target <= lo && target >= hi
        };
        if inside {
            let span = hi - lo;
            let w = if span == 0.0 { 0.0 } else { (target - lo) / span };
            return (i, w.clamp(0.0, 1.0));
        }
    }
    // Outside the axis: clamp to the nearer end
    let below_first = if ascending {
        target < coords[0]
    } else {
        target > coords[0]
    };
    if below_first {
        (0, 0.0)
    } else {
        (n - 2, 1.0)
    }
}

/// Bilinear sample of a 2D field `data[row, col]` at fractional coordinates
/// given by the row/col axes. A single-element axis contributes its only
/// value.
pub fn bilinear(data: &Array2<f64>, rows: &[f64], cols: &[f64], row_v: f64, col_v: f64) -> f64 {
    let (ri, rw) = interp_weights(rows, row_v);
    let (ci, cw) = interp_weights(cols, col_v);
    let ri1 = if rows.len() < 2 { ri } else { ri + 1 };
    let ci1 = if cols.len() < 2 { ci } else { ci + 1 };
    let v00 = data[[ri, ci]];
    let v01 = data[[ri, ci1]];
    let v10 = data[[ri1, ci]];
    let v11 = data[[ri1, ci1]];
    let top = v00 * (1.0 - cw) + v01 * cw;
    let bottom = v10 * (1.0 - cw) + v11 * cw;
    top * (1.0 - rw) + bottom * rw
}

/// Linear sample of a 1D profile at a coordinate value. A single-element
/// profile is treated as constant.
pub fn linear(values: &[f64], coords: &[f64], target: f64) -> f64 {
    if values.len() < 2 {
        return values[0];
    }
    let (i, w) = interp_weights(coords, target);
    values[i] * (1.0 - w) + values[i + 1] * w
}
