use rand::Rng;

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let scale = 10_f64.powi(places as i32);
    (value * scale).round() / scale
}

/// Uniform sample from the closed range `[min, max]`, rounded to `places`.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64, places: u32) -> f64 {
    round_to(rng.random_range(min..=max), places)
}

/// Uniform sample rounded to one decimal, the precision most metrics report at.
pub fn uniform1<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    uniform(rng, min, max, 1)
}

/// Uniform sample rounded to two decimals, used for normalized 0-1 values.
pub fn uniform2<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    uniform(rng, min, max, 2)
}
