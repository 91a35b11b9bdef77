use std::fmt;

use crate::image::Image;

/// Display characters, from most ink to least.
pub const PALETTE: &[u8; 15] = b"#@$%&x*=o+-~,. ";

/// Intensity range mapped onto the palette.
///
/// `None` bounds are taken from the image itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AsciiRange {
    /// Value drawn as the faintest glyph.
    pub min: Option<i64>,
    /// Value drawn as the densest glyph.
    pub max: Option<i64>,
}

impl AsciiRange {
    /// Both bounds computed from the image.
    pub const AUTO: AsciiRange = AsciiRange {
        min: None,
        max: None,
    };

    /// Fixed bounds.
    pub fn fixed(min: i64, max: i64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
}

/// Writes one line per image row, brightest pixels as the densest glyph.
pub fn write_ascii<W, P>(out: &mut W, image: &Image<P>, range: AsciiRange) -> fmt::Result
where
    W: fmt::Write,
    P: Copy + Into<i64>,
{
    let mut values = image.pixels().iter().map(|&p| p.into());
    let (lo, hi) = match values.next() {
        Some(first) => values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))),
        None => (0, 0),
    };
    let min = range.min.unwrap_or(lo);
    let max = range.max.unwrap_or(hi);

    let last = PALETTE.len() as i64 - 1;
    // Caller bounds may sit anywhere in i64
    let delta = (max.saturating_sub(min) / PALETTE.len() as i64).max(1);

    for row in (0..image.rows()).filter_map(|r| image.row(r)) {
        for &p in row {
            let value: i64 = p.into();
            let level = (value.saturating_sub(min) / delta).clamp(0, last);
            out.write_char(char::from(PALETTE[(last - level) as usize]))?;
        }
        out.write_char('\n')?;
    }
    Ok(())
}

/// [`write_ascii`] into a fresh string.
pub fn to_ascii<P: Copy + Into<i64>>(image: &Image<P>, range: AsciiRange) -> String {
    let mut out = String::with_capacity(image.len() + image.rows());
    // Writing to a String cannot fail
    let _ = write_ascii(&mut out, image, range);
    out
}
