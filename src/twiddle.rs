//! Morton-order ("twiddled") texture addressing
//!
//! Swizzled-texture hardware stores power-of-two textures with the x/y bit
//! patterns interleaved into a single linear address. For non-square images
//! the twiddle runs inside m×m macro tiles (m = min(w,h)) laid out linearly.

/// Spread the low bits of `n` so bit i lands at bit 2i.
fn spread_bits(n: usize) -> usize {
    let mut out = 0;
    for i in 0..10 {
        out |= (n & (1 << i)) << i;
    }
    out
}

/// Morton-interleaved linear index for (x,y) in a `w`×`h` image.
/// Bit i of y goes to output bit 2i, bit i of x to bit 2i+1.
pub fn twiddled_index(x: usize, y: usize, w: usize, h: usize) -> usize {
    let m = w.min(h);
    let mask = m - 1;
    let z = spread_bits(y & mask) | spread_bits(x & mask) << 1;
    z + (x / m + y / m) * m * m
}

/// Variant for nibble-packed storage: the tile-local x component is divided
/// by 4 before interleaving.
pub fn twiddled_index_4b(x: usize, y: usize, w: usize, h: usize) -> usize {
    let m = w.min(h);
    let mask = m - 1;
    let z = spread_bits(y & mask) | spread_bits((x & mask) / 4) << 1;
    z + (x / m + y / m) * m * m
}
