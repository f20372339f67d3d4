use tracing::debug;

use crate::grid::ValueGrid;

/// A grid cell whose value equals the maximum of its window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub x: usize,
    pub y: usize,
    pub value: f64,
}

impl Peak {
    pub fn new(x: usize, y: usize, value: f64) -> Self {
        Peak { x, y, value }
    }

    pub fn coord(&self) -> (usize, usize) {
        (self.x, self.y)
    }
}

/// Footprint of the local-maximum window, in cells.
///
/// Along an axis of size `s` the window around index `i` covers
/// `i - s/2 ..= i + s - 1 - s/2`. For the default 4 x 4 window that is
/// `[x-2, x+1] x [y-2, y+1]`: the extra row and column fall on the low side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakWindow {
    pub width: usize,
    pub height: usize,
}

impl PeakWindow {
    /// Sizes below 1 are raised to 1.
    pub fn new(width: usize, height: usize) -> Self {
        PeakWindow {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    fn span(size: usize) -> (isize, isize) {
        let below = (size / 2) as isize;
        let above = size as isize - 1 - below;
        (below, above)
    }
}

impl Default for PeakWindow {
    fn default() -> Self {
        PeakWindow::square(4)
    }
}

/// Finds every cell tied with the maximum of its window.
///
/// Out-of-range window samples repeat the nearest edge cell. Plateaus report
/// all of their cells. Peaks come out in `(x, y)` row-major order.
pub fn find_peaks(grid: &ValueGrid, window: &PeakWindow) -> Vec<Peak> {
    let maxima = window_maximum(grid, window);
    let mut peaks = Vec::new();

    for (x, column) in maxima.iter().enumerate() {
        for (y, max) in column.iter().enumerate() {
            if let Some(value) = grid.get_value(x, y) {
                if value == *max {
                    peaks.push(Peak::new(x, y, value));
                }
            }
        }
    }

    debug!(
        "Found {} peaks with a {}x{} window",
        peaks.len(),
        window.width,
        window.height
    );
    peaks
}

/// Maximum over the window of every cell, computed as one pass along `y`
/// followed by one pass along `x`.
fn window_maximum(grid: &ValueGrid, window: &PeakWindow) -> Vec<Vec<f64>> {
    let (width, height) = grid.shape();
    let (x_below, x_above) = PeakWindow::span(window.width);
    let (y_below, y_above) = PeakWindow::span(window.height);

    let along_y: Vec<Vec<f64>> = (0..width)
        .map(|x| {
            (0..height)
                .map(|y| {
                    let y = y as isize;
                    (y - y_below..=y + y_above)
                        .map(|wy| grid.get_clamped(x as isize, wy))
                        .fold(f64::NEG_INFINITY, f64::max)
                })
                .collect()
        })
        .collect();

    let clamp_x = |x: isize| x.clamp(0, width as isize - 1) as usize;
    (0..width)
        .map(|x| {
            let x = x as isize;
            (0..height)
                .map(|y| {
                    (x - x_below..=x + x_above)
                        .map(|wx| along_y[clamp_x(wx)][y])
                        .fold(f64::NEG_INFINITY, f64::max)
                })
                .collect()
        })
        .collect()
}
