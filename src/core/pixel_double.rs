use crate::core::geometry::Size;

const BYTES_PER_PIXEL: usize = 4;

/// Replicate each RGBA pixel of `pixels` into a 2x2 block
///
/// The output buffer is 4x the input byte length and the returned size is
/// doubled componentwise. Pure and deterministic. Scaling the cursor
/// hotspot is the caller's responsibility, applied once per doubling pass;
/// passes compose multiplicatively.
pub fn double_pixel_data(pixels: &[u8], size: Size) -> (Vec<u8>, Size) {
    debug_assert_eq!(
        pixels.len(),
        size.buffer_size(),
        "pixel buffer does not match {}x{} RGBA",
        size.width,
        size.height
    );

    let doubled = size.doubled();
    let mut out = vec![0u8; doubled.buffer_size()];

    let src_width = size.width as usize;
    let dst_width = doubled.width as usize;

    for y in 0..size.height as usize {
        for x in 0..src_width {
            let src = (y * src_width + x) * BYTES_PER_PIXEL;
            let pixel = &pixels[src..src + BYTES_PER_PIXEL];
            for dy in 0..2 {
                let dst_row = (y * 2 + dy) * dst_width;
                for dx in 0..2 {
                    let dst = (dst_row + x * 2 + dx) * BYTES_PER_PIXEL;
                    out[dst..dst + BYTES_PER_PIXEL].copy_from_slice(pixel);
                }
            }
        }
    }

    (out, doubled)
}
