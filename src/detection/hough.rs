//! Gradient-voting circle search.
//!
//! Every edge pixel casts votes along its gradient line, in both directions,
//! at distances between the minimum and maximum radius. The rim of a circle
//! converges on its center, so centers show up as accumulator peaks. Each
//! peak is then given the radius with the strongest edge support.

use image::GrayImage;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

use super::preprocessing;

/// Search parameters, in working-image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughParams {
    /// Inverse accumulator resolution (1.0 = one cell per pixel).
    pub dp: f32,
    /// Minimum distance between accepted centers.
    pub min_dist: f32,
    /// Upper Canny threshold; the lower one is half of it.
    pub canny_high: f32,
    /// Votes a center needs, and edge support a radius needs.
    pub acc_threshold: u32,
    pub min_radius: u32,
    pub max_radius: u32,
}

/// A circle found by the search, strongest first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub votes: u32,
}

#[derive(Debug, Clone, Copy)]
struct EdgePoint {
    x: f32,
    y: f32,
    dx: f32,
    dy: f32,
}

fn edge_points(gray: &GrayImage, canny_high: f32) -> Vec<EdgePoint> {
    let edges = preprocessing::detect_edges(gray, canny_high / 2.0, canny_high);
    let gx = horizontal_sobel(gray);
    let gy = vertical_sobel(gray);

    let mut points = Vec::new();
    for (x, y, pixel) in edges.enumerate_pixels() {
        if pixel[0] == 0 {
            continue;
        }
        let vx = gx.get_pixel(x, y)[0] as f32;
        let vy = gy.get_pixel(x, y)[0] as f32;
        let mag = (vx * vx + vy * vy).sqrt();
        if mag < 1e-3 {
            continue;
        }
        points.push(EdgePoint {
            x: x as f32,
            y: y as f32,
            dx: vx / mag,
            dy: vy / mag,
        });
    }
    points
}

/// Find circles in a grayscale image. The first circle is the strongest.
pub fn find_circles(gray: &GrayImage, params: &HoughParams) -> Vec<Circle> {
    let (w, h) = gray.dimensions();
    if w < 3 || h < 3 || params.max_radius == 0 || params.min_radius > params.max_radius {
        return Vec::new();
    }

    let points = edge_points(gray, params.canny_high);
    if points.is_empty() {
        return Vec::new();
    }

    let dp = params.dp.max(1.0);
    let acc_w = (w as f32 / dp).ceil() as usize;
    let acc_h = (h as f32 / dp).ceil() as usize;
    let accum = accumulate(&points, params, dp, acc_w, acc_h);
    let support = box_sum_3x3(&accum, acc_w, acc_h);

    let peaks = find_peaks(&support, acc_w, acc_h, params.acc_threshold);

    let min_dist_sq = params.min_dist * params.min_dist;
    let mut hist = vec![0u32; params.max_radius as usize + 2];
    let mut circles: Vec<Circle> = Vec::new();

    for (idx, votes) in peaks {
        let (cx, cy) = refine_center(&accum, acc_w, acc_h, idx, dp);
        let too_close = circles.iter().any(|c| {
            let dx = c.x - cx;
            let dy = c.y - cy;
            dx * dx + dy * dy < min_dist_sq
        });
        if too_close {
            continue;
        }

        if let Some(radius) = estimate_radius(&points, cx, cy, params, &mut hist) {
            circles.push(Circle {
                x: cx,
                y: cy,
                radius,
                votes,
            });
        }
    }

    circles
}

/// Cast one vote per accumulator cell along each gradient line.
fn accumulate(
    points: &[EdgePoint],
    params: &HoughParams,
    dp: f32,
    acc_w: usize,
    acc_h: usize,
) -> Vec<u32> {
    let mut accum = vec![0u32; acc_w * acc_h];
    let min_r = params.min_radius as f32;
    let max_r = params.max_radius as f32;

    for p in points {
        for sign in [1.0f32, -1.0] {
            let mut last = usize::MAX;
            let mut r = min_r;
            while r <= max_r {
                let ax = (p.x + sign * p.dx * r) / dp;
                let ay = (p.y + sign * p.dy * r) / dp;
                if ax < 0.0 || ay < 0.0 {
                    break;
                }
                let (cx, cy) = (ax as usize, ay as usize);
                if cx >= acc_w || cy >= acc_h {
                    break;
                }
                let idx = cy * acc_w + cx;
                if idx != last {
                    accum[idx] += 1;
                    last = idx;
                }
                r += dp;
            }
        }
    }
    accum
}

/// Sum of each cell's 3x3 neighbourhood, so a center whose votes are split
/// over adjacent cells still stands out as one peak.
fn box_sum_3x3(accum: &[u32], acc_w: usize, acc_h: usize) -> Vec<u32> {
    let mut out = vec![0u32; accum.len()];
    for y in 0..acc_h {
        for x in 0..acc_w {
            let mut sum = 0;
            for ny in y.saturating_sub(1)..=(y + 1).min(acc_h - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(acc_w - 1) {
                    sum += accum[ny * acc_w + nx];
                }
            }
            out[y * acc_w + x] = sum;
        }
    }
    out
}

/// Local maxima above the threshold, most votes first, ties in scan order.
fn find_peaks(accum: &[u32], acc_w: usize, acc_h: usize, threshold: u32) -> Vec<(usize, u32)> {
    let mut peaks = Vec::new();
    if acc_w < 3 || acc_h < 3 {
        return peaks;
    }
    for y in 1..acc_h - 1 {
        for x in 1..acc_w - 1 {
            let idx = y * acc_w + x;
            let v = accum[idx];
            if v > threshold
                && v > accum[idx - 1]
                && v >= accum[idx + 1]
                && v > accum[idx - acc_w]
                && v >= accum[idx + acc_w]
            {
                peaks.push((idx, v));
            }
        }
    }
    peaks.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    peaks
}

/// Vote-weighted centroid of the 3x3 neighbourhood, in image pixels.
fn refine_center(accum: &[u32], acc_w: usize, acc_h: usize, idx: usize, dp: f32) -> (f32, f32) {
    let px = idx % acc_w;
    let py = idx / acc_w;
    let mut sum = 0.0f32;
    let mut sx = 0.0f32;
    let mut sy = 0.0f32;
    for ny in py.saturating_sub(1)..=(py + 1).min(acc_h - 1) {
        for nx in px.saturating_sub(1)..=(px + 1).min(acc_w - 1) {
            let v = accum[ny * acc_w + nx] as f32;
            sum += v;
            sx += v * nx as f32;
            sy += v * ny as f32;
        }
    }
    let (fx, fy) = if sum > 0.0 {
        (sx / sum, sy / sum)
    } else {
        (px as f32, py as f32)
    };
    // Cell `i` covers image coordinates [i*dp, (i+1)*dp).
    ((fx + 0.5) * dp, (fy + 0.5) * dp)
}

/// Radius with the best edge support per unit of circumference.
fn estimate_radius(
    points: &[EdgePoint],
    cx: f32,
    cy: f32,
    params: &HoughParams,
    hist: &mut [u32],
) -> Option<f32> {
    hist.iter_mut().for_each(|b| *b = 0);
    let lo = params.min_radius as f32 - 0.5;
    let hi = params.max_radius as f32 + 0.5;
    for p in points {
        let d = ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt();
        if d >= lo && d < hi {
            hist[(d.round() as usize).min(hist.len() - 1)] += 1;
        }
    }

    let mut best: Option<(u32, u32)> = None;
    for r in params.min_radius.max(1)..=params.max_radius {
        let i = r as usize;
        let support = hist[i - 1] + hist[i] + hist[i + 1];
        if support == 0 {
            continue;
        }
        best = match best {
            // support / r > best_support / best_r
            Some((br, bs)) if (support as u64) * (br as u64) <= (bs as u64) * (r as u64) => {
                Some((br, bs))
            }
            _ => Some((r, support)),
        };
    }

    let (r, support) = best?;
    if support < params.acc_threshold {
        return None;
    }

    let r = r as f32;
    let (sum, count) = points
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .filter(|d| (d - r).abs() <= 1.5)
        .fold((0.0f32, 0u32), |(s, n), d| (s + d, n + 1));
    if count == 0 {
        return Some(r);
    }
    Some(sum / count as f32)
}
