use ndarray::Array2;

/// Sobel edge magnitude of a 16-bit image.
///
/// Samples are scaled to [0, 1] first. Each 3x3 kernel is normalized by 1/4
/// and the magnitude is `sqrt((gx^2 + gy^2) / 2)`. Out-of-bounds neighbors
/// repeat the nearest edge pixel, so border pixels get a real response.
pub fn sobel_magnitude(data: &Array2<u16>) -> Array2<f64> {
    let (h, w) = data.dim();
    let mut result = Array2::<f64>::zeros((h, w));
    if h == 0 || w == 0 {
        return result;
    }

    let px = |row: usize, col: usize| data[[row, col]] as f64 / u16::MAX as f64;

    for row in 0..h {
        let up = row.saturating_sub(1);
        let down = (row + 1).min(h - 1);
        for col in 0..w {
            let left = col.saturating_sub(1);
            let right = (col + 1).min(w - 1);

            let gx = (-px(up, left) + px(up, right) - 2.0 * px(row, left)
                + 2.0 * px(row, right)
                - px(down, left)
                + px(down, right))
                / 4.0;

            let gy = (-px(up, left) - 2.0 * px(up, col) - px(up, right)
                + px(down, left)
                + 2.0 * px(down, col)
                + px(down, right))
                / 4.0;

            result[[row, col]] = ((gx * gx + gy * gy) / 2.0).sqrt();
        }
    }

    result
}
