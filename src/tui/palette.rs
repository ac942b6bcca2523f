//! Sequential color scale shared by the scatter and heat map panels.

/// Viridis control points, dark to light.
const STOPS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

/// Map `t ∈ [0, 1]` onto the scale. Out-of-range and NaN inputs clamp to the ends.
pub fn viridis(t: f64) -> (u8, u8, u8) {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (STOPS.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(STOPS.len() - 2);
    let u = scaled - i as f64;

    let (r0, g0, b0) = STOPS[i];
    let (r1, g1, b1) = STOPS[i + 1];
    (lerp(r0, r1, u), lerp(g0, g1, u), lerp(b0, b1, u))
}

/// Position of `v` within `[min, max]`, or `0.5` for a degenerate range.
pub fn normalize(v: f64, min: f64, max: f64) -> f64 {
    if !(max > min) {
        return 0.5;
    }
    (v - min) / (max - min)
}

fn lerp(a: u8, b: u8, u: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * u).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ends_hit_the_control_points() {
        assert_eq!(viridis(0.0), STOPS[0]);
        assert_eq!(viridis(1.0), STOPS[4]);
        assert_eq!(viridis(0.5), STOPS[2]);
        assert_eq!(viridis(-3.0), STOPS[0]);
        assert_eq!(viridis(f64::NAN), STOPS[0]);
    }

    #[test]
    fn degenerate_range_maps_to_middle() {
        assert_eq!(normalize(3.0, 3.0, 3.0), 0.5);
        assert_eq!(normalize(15.0, 10.0, 20.0), 0.5);
    }
}
