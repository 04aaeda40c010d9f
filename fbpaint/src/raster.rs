//! Rasterization primitives over an [`OffscreenBuffer`].
//!
//! Every primitive works on an already encoded pixel and clips each
//! candidate pixel individually, so no input, however far off screen,
//! writes outside the visible area. The work done per call is bounded by
//! the screen size, not by the coordinates.

use std::ops::RangeInclusive;

use crate::buffer::OffscreenBuffer;
use crate::codec::EncodedPixel;

pub fn set_pixel(buf: &mut OffscreenBuffer, x: i32, y: i32, px: &EncodedPixel) {
    buf.write_pixel(x.into(), y.into(), px);
}

pub fn horizontal_line(buf: &mut OffscreenBuffer, x: i32, y: i32, len: i32, px: &EncodedPixel) {
    buf.write_run(x.into(), y.into(), len.into(), px);
}

pub fn vertical_line(buf: &mut OffscreenBuffer, x: i32, y: i32, len: i32, px: &EncodedPixel) {
    vertical_run(buf, x.into(), y.into(), len.into(), px);
}

fn vertical_run(buf: &mut OffscreenBuffer, x: i64, y: i64, len: i64, px: &EncodedPixel) {
    if len <= 0 {
        return;
    }
    // rows above the top edge are skipped without visiting them
    let start = y.max(0);
    let end = y + len;
    for iy in start..end {
        if buf.pixel_offset(x, iy).is_none() {
            break;
        }
        buf.write_pixel(x, iy, px);
    }
}

/// Bresenham line between two inclusive endpoints.
///
/// The endpoints are put in a fixed order before stepping, which makes the
/// lit pixel set independent of the direction the line was given in. Only
/// the steps whose major coordinate lands on screen are visited; the minor
/// coordinate of step `k` is computed directly, so a line reaching far off
/// screen costs no more than one crossing it.
pub fn line(buf: &mut OffscreenBuffer, x1: i32, y1: i32, x2: i32, y2: i32, px: &EncodedPixel) {
    let (x1, y1, x2, y2) = (i64::from(x1), i64::from(y1), i64::from(x2), i64::from(y2));

    if y1 == y2 {
        let (begin, end) = (x1.min(x2), x1.max(x2));
        buf.write_run(begin, y1, end - begin + 1, px);
        return;
    }
    if x1 == x2 {
        let (begin, end) = (y1.min(y2), y1.max(y2));
        vertical_run(buf, x1, begin, end - begin + 1, px);
        return;
    }

    // after ordering, x always increases
    let ((x0, y0), (x_end, y_end)) = if (x1, y1) <= (x2, y2) {
        ((x1, y1), (x2, y2))
    } else {
        ((x2, y2), (x1, y1))
    };
    let dx = x_end - x0;
    let dy = (y_end - y0).abs();
    let sy = if y0 < y_end { 1 } else { -1 };
    let (major, minor) = (dx.max(dy), dx.min(dy));
    let x_major = dx >= dy;

    let steps = if x_major {
        visible_steps(x0, 1, buf.width(), major)
    } else {
        visible_steps(y0, sy, buf.height(), major)
    };
    for k in steps {
        let m = minor_steps(k, major, minor);
        let (x, y) = if x_major {
            (x0 + k, y0 + sy * m)
        } else {
            (x0 + m, y0 + sy * k)
        };
        buf.write_pixel(x, y, px);
    }
}

/// Steps `t` in `0..=max` for which `origin + sign * t` lies in `[0, limit)`.
fn visible_steps(origin: i64, sign: i64, limit: i64, max: i64) -> RangeInclusive<i64> {
    if sign > 0 {
        (-origin).max(0)..=max.min(limit - 1 - origin)
    } else {
        (origin - limit + 1).max(0)..=max.min(origin)
    }
}

/// Minor-axis moves Bresenham has made after `k` major-axis steps.
fn minor_steps(k: i64, major: i64, minor: i64) -> i64 {
    let (k, major, minor) = (i128::from(k), i128::from(major), i128::from(minor));
    ((2 * k * minor + major - 1) / (2 * major)) as i64
}

/// Midpoint circle around `(xm, ym)`. A zero radius lights the centre, a
/// negative radius draws nothing.
///
/// Each octant is walked only over the rows (or columns) it can light on
/// screen, with the arc offset for step `t` taken as `round(sqrt(r² - t²))`,
/// which is exactly the point the incremental midpoint walk picks.
pub fn circle(buf: &mut OffscreenBuffer, xm: i32, ym: i32, radius: i32, px: &EncodedPixel) {
    if radius < 0 {
        return;
    }
    let (xm, ym, r) = (i64::from(xm), i64::from(ym), i64::from(radius));
    let (w, h) = (buf.width(), buf.height());
    if xm + r < 0 || xm - r >= w || ym + r < 0 || ym - r >= h {
        return;
    }

    for sign in [1, -1] {
        for t in visible_steps(ym, sign, h, r) {
            let a = arc_offset(r, t);
            if a < t {
                break;
            }
            buf.write_pixel(xm + a, ym + sign * t, px);
            buf.write_pixel(xm - a, ym + sign * t, px);
        }
        for t in visible_steps(xm, sign, w, r) {
            let a = arc_offset(r, t);
            if a < t {
                break;
            }
            buf.write_pixel(xm + sign * t, ym + a, px);
            buf.write_pixel(xm + sign * t, ym - a, px);
        }
    }
}

/// `round(sqrt(r² - t²))` for `0 <= t <= r`, in integers.
fn arc_offset(r: i64, t: i64) -> i64 {
    let n = 4 * (r * r - t * t) as u128;
    ((isqrt(n) + 1) / 2) as i64
}

fn isqrt(n: u128) -> u128 {
    let mut s = (n as f64).sqrt() as u128;
    while s * s > n {
        s -= 1;
    }
    while (s + 1) * (s + 1) <= n {
        s += 1;
    }
    s
}

/// Outline of a `w` x `h` rectangle with its top-left corner at `(x, y)`.
pub fn rect(buf: &mut OffscreenBuffer, x: i32, y: i32, w: i32, h: i32, px: &EncodedPixel) {
    if w <= 0 || h <= 0 {
        return;
    }
    let (x, y, w, h) = (i64::from(x), i64::from(y), i64::from(w), i64::from(h));
    buf.write_run(x, y, w, px);
    buf.write_run(x, y + h - 1, w, px);
    vertical_run(buf, x, y, h, px);
    vertical_run(buf, x + w - 1, y, h, px);
}

pub fn fill_rect(buf: &mut OffscreenBuffer, x: i32, y: i32, w: i32, h: i32, px: &EncodedPixel) {
    if w <= 0 || h <= 0 {
        return;
    }
    let (x, y, w) = (i64::from(x), i64::from(y), i64::from(w));
    for iy in y.max(0)..y + i64::from(h) {
        if buf.pixel_offset(0, iy).is_none() {
            break;
        }
        buf.write_run(x, iy, w, px);
    }
}

pub fn fill(buf: &mut OffscreenBuffer, px: &EncodedPixel) {
    buf.fill_rows(px);
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::codec::{encode, Color, PixelDepth};
    use crate::geometry::Resolution;

    const W: i64 = 64;
    const H: i64 = 48;

    fn canvas() -> (OffscreenBuffer, EncodedPixel) {
        let res = Resolution::new(W as u32, H as u32, 32).with_stride(W as u32 * 4 + 16);
        (OffscreenBuffer::allocate(&res), encode(Color::RED, PixelDepth::Depth32))
    }

    fn lit(buf: &OffscreenBuffer) -> BTreeSet<(i64, i64)> {
        let mut set = BTreeSet::new();
        for y in 0..H {
            for x in 0..W {
                let off = buf.pixel_offset(x, y).unwrap();
                if buf.as_bytes()[off..off + 4].iter().any(|&b| b != 0) {
                    set.insert((x, y));
                }
            }
        }
        set
    }

    fn padding_untouched(buf: &OffscreenBuffer) -> bool {
        let stride = W as usize * 4 + 16;
        buf.as_bytes()
            .chunks(stride)
            .all(|row| row[W as usize * 4..].iter().all(|&b| b == 0))
    }

    #[test]
    fn set_pixel_writes_encoded_bytes() {
        let (mut buf, px) = canvas();
        for (x, y) in [(0, 0), (63, 0), (0, 47), (63, 47), (17, 23)] {
            set_pixel(&mut buf, x, y, &px);
            let off = buf.pixel_offset(x.into(), y.into()).unwrap();
            assert_eq!(&buf.as_bytes()[off..off + 4], px.as_bytes());
        }
        assert_eq!(lit(&buf).len(), 5);
    }

    #[test]
    fn horizontal_line_clips_at_right_edge() {
        let (mut buf, px) = canvas();
        horizontal_line(&mut buf, 60, 5, 10, &px);
        let expected: BTreeSet<_> = (60..W).map(|x| (x, 5)).collect();
        assert_eq!(lit(&buf), expected);
        assert!(padding_untouched(&buf));
    }

    #[test]
    fn empty_runs_draw_nothing() {
        let (mut buf, px) = canvas();
        horizontal_line(&mut buf, 10, 10, 0, &px);
        horizontal_line(&mut buf, 10, 10, -5, &px);
        vertical_line(&mut buf, 10, 10, 0, &px);
        vertical_line(&mut buf, 10, 10, -5, &px);
        horizontal_line(&mut buf, 0, H as i32, 10, &px);
        vertical_line(&mut buf, W as i32, 0, 10, &px);
        assert!(lit(&buf).is_empty());
    }

    #[test]
    fn vertical_line_clips_at_bottom_edge() {
        let (mut buf, px) = canvas();
        vertical_line(&mut buf, 3, 40, 100, &px);
        let expected: BTreeSet<_> = (40..H).map(|y| (3, y)).collect();
        assert_eq!(lit(&buf), expected);

        let (mut buf, px) = canvas();
        vertical_line(&mut buf, 3, -2, 4, &px);
        assert_eq!(lit(&buf), [(3, 0), (3, 1)].into_iter().collect::<BTreeSet<_>>());
    }

    #[test]
    fn line_is_direction_independent() {
        let cases = [
            (0, 0, 63, 47),
            (5, 40, 60, 2),
            (10, 10, 13, 40),
            (-20, -5, 70, 30),
            (1, 1, 2, 46),
            (0, 0, 7, 3),
            (30, 20, 30, 20),
        ];
        for (x1, y1, x2, y2) in cases {
            let (mut fwd, px) = canvas();
            line(&mut fwd, x1, y1, x2, y2, &px);
            let (mut back, _) = canvas();
            line(&mut back, x2, y2, x1, y1, &px);
            assert_eq!(lit(&fwd), lit(&back), "line {x1},{y1} -> {x2},{y2}");
        }
    }

    #[test]
    fn line_includes_both_endpoints() {
        let (mut buf, px) = canvas();
        line(&mut buf, 2, 3, 20, 11, &px);
        let set = lit(&buf);
        assert!(set.contains(&(2, 3)));
        assert!(set.contains(&(20, 11)));
        // one pixel per column on a shallow line
        assert_eq!(set.len(), 19);
    }

    #[test]
    fn diagonal_line() {
        let (mut buf, px) = canvas();
        line(&mut buf, 0, 0, 10, 10, &px);
        let expected: BTreeSet<_> = (0..=10).map(|i| (i, i)).collect();
        assert_eq!(lit(&buf), expected);
    }

    #[test]
    fn axis_aligned_lines_use_runs() {
        let (mut buf, px) = canvas();
        line(&mut buf, 9, 4, 2, 4, &px);
        assert_eq!(lit(&buf), (2..=9).map(|x| (x, 4)).collect::<BTreeSet<_>>());

        let (mut buf, px) = canvas();
        line(&mut buf, 7, 30, 7, 25, &px);
        assert_eq!(lit(&buf), (25..=30).map(|y| (7, y)).collect::<BTreeSet<_>>());
    }

    /// Incremental Bresenham, every point kept, clipped afterwards.
    fn stepped_line(x1: i64, y1: i64, x2: i64, y2: i64) -> BTreeSet<(i64, i64)> {
        let ((mut x, mut y), (x_end, y_end)) = if (x1, y1) <= (x2, y2) {
            ((x1, y1), (x2, y2))
        } else {
            ((x2, y2), (x1, y1))
        };
        let (dx, dy) = ((x_end - x).abs(), (y_end - y).abs());
        let sx = if x < x_end { 1 } else { -1 };
        let sy = if y < y_end { 1 } else { -1 };
        let mut err = dx - dy;
        let mut set = BTreeSet::new();
        loop {
            set.insert((x, y));
            if x == x_end && y == y_end {
                break;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += sx;
            }
            if e2 < dx {
                err += dx;
                y += sy;
            }
        }
        set.retain(|&(x, y)| (0..W).contains(&x) && (0..H).contains(&y));
        set
    }

    /// Incremental midpoint circle, every point kept, clipped afterwards.
    fn stepped_circle(xm: i64, ym: i64, r: i64) -> BTreeSet<(i64, i64)> {
        let (mut x, mut y, mut err) = (r, 0i64, 1 - r);
        let mut set = BTreeSet::new();
        while x >= y {
            for (dx, dy) in [(x, y), (y, x)] {
                set.extend([(xm + dx, ym + dy), (xm - dx, ym + dy)]);
                set.extend([(xm + dx, ym - dy), (xm - dx, ym - dy)]);
            }
            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
        set.retain(|&(x, y)| (0..W).contains(&x) && (0..H).contains(&y));
        set
    }

    #[test]
    fn line_matches_incremental_bresenham() {
        let coords = [-37, -3, 0, 11, 29, 47, 63, 90];
        for x1 in coords {
            for y1 in coords {
                for x2 in coords {
                    for y2 in [-20, 5, 47, 71] {
                        let (mut buf, px) = canvas();
                        line(&mut buf, x1, y1, x2, y2, &px);
                        let (a, b) = (i64::from(x1), i64::from(y1));
                        let expected = stepped_line(a, b, i64::from(x2), i64::from(y2));
                        assert_eq!(lit(&buf), expected, "line {x1},{y1} -> {x2},{y2}");
                    }
                }
            }
        }
    }

    #[test]
    fn circle_matches_incremental_midpoint() {
        for (xm, ym) in [(32, 24), (0, 0), (-10, 30), (70, -5), (63, 47)] {
            for r in [1, 2, 3, 7, 10, 19, 24, 41, 60, 85] {
                let (mut buf, px) = canvas();
                circle(&mut buf, xm, ym, r, &px);
                let expected = stepped_circle(xm.into(), ym.into(), r.into());
                assert_eq!(lit(&buf), expected, "circle ({xm}, {ym}) r={r}");
            }
        }
    }

    #[test]
    fn far_away_primitives_return_promptly() {
        let (mut buf, px) = canvas();
        line(&mut buf, i32::MIN, i32::MIN, i32::MIN + 1, i32::MAX, &px);
        line(&mut buf, i32::MIN, i32::MAX, i32::MAX, i32::MIN, &px);
        circle(&mut buf, i32::MIN, i32::MIN, 200_000_000, &px);
        circle(&mut buf, 0, 0, i32::MAX, &px);
        assert!(lit(&buf).is_empty());
        assert!(padding_untouched(&buf));
    }

    #[test]
    fn long_line_crossing_the_screen_is_clipped() {
        let (mut buf, px) = canvas();
        line(&mut buf, -1_000_000_000, 10, 1_000_000_000, 11, &px);
        let set = lit(&buf);
        assert_eq!(set.len(), W as usize);
        assert!(set.iter().all(|&(_, y)| y == 10 || y == 11));
    }

    #[test]
    fn circle_is_symmetric_about_its_centre() {
        for (xm, ym, r) in [(32, 24, 10), (32, 24, 1), (30, 20, 23), (5, 5, 12)] {
            let (mut buf, px) = canvas();
            circle(&mut buf, xm, ym, r, &px);
            let set = lit(&buf);
            assert!(!set.is_empty());
            let (xm, ym) = (i64::from(xm), i64::from(ym));
            for &(x, y) in &set {
                for mirrored in [(2 * xm - x, y), (x, 2 * ym - y)] {
                    let inside = (0..W).contains(&mirrored.0) && (0..H).contains(&mirrored.1);
                    assert!(!inside || set.contains(&mirrored), "{mirrored:?} missing for r={r}");
                }
            }
        }
    }

    #[test]
    fn circle_hits_the_axis_extremes() {
        let (mut buf, px) = canvas();
        circle(&mut buf, 32, 24, 10, &px);
        let set = lit(&buf);
        for p in [(42, 24), (22, 24), (32, 34), (32, 14)] {
            assert!(set.contains(&p), "{p:?}");
        }
        assert!(!set.contains(&(32, 24)));
    }

    #[test]
    fn degenerate_circles() {
        let (mut buf, px) = canvas();
        circle(&mut buf, 10, 10, 0, &px);
        assert_eq!(lit(&buf), [(10, 10)].into_iter().collect::<BTreeSet<_>>());

        let (mut buf, px) = canvas();
        circle(&mut buf, 10, 10, -3, &px);
        assert!(lit(&buf).is_empty());
    }

    #[test]
    fn circle_near_edges_is_clipped() {
        let (mut buf, px) = canvas();
        circle(&mut buf, 0, 0, 30, &px);
        circle(&mut buf, i32::MAX, i32::MIN, 5, &px);
        assert!(padding_untouched(&buf));
        assert!(lit(&buf).iter().all(|&(x, y)| x >= 0 && y >= 0));
    }

    #[test]
    fn fill_matches_per_pixel_writes() {
        let (mut filled, px) = canvas();
        fill(&mut filled, &px);

        let (mut pixels, _) = canvas();
        for y in 0..H as i32 {
            for x in 0..W as i32 {
                set_pixel(&mut pixels, x, y, &px);
            }
        }
        assert_eq!(filled.as_bytes(), pixels.as_bytes());
        assert!(padding_untouched(&filled));
    }

    #[test]
    fn rect_outline_and_fill() {
        let (mut buf, px) = canvas();
        rect(&mut buf, 2, 2, 4, 3, &px);
        let expected: BTreeSet<_> = [
            (2, 2), (3, 2), (4, 2), (5, 2),
            (2, 3), (5, 3),
            (2, 4), (3, 4), (4, 4), (5, 4),
        ]
        .into_iter()
        .collect();
        assert_eq!(lit(&buf), expected);

        let (mut buf, px) = canvas();
        fill_rect(&mut buf, -2, 45, 4, 10, &px);
        let expected: BTreeSet<_> = (45..H).flat_map(|y| (0..2).map(move |x| (x, y))).collect();
        assert_eq!(lit(&buf), expected);
    }
}
