use std::fmt;

use crate::image::Image;

/// Writes the image as a MATLAB matrix literal assigned to `Dat`.
pub fn write_matlab<W, P>(out: &mut W, image: &Image<P>) -> fmt::Result
where
    W: fmt::Write,
    P: Copy + fmt::Display,
{
    out.write_str("Dat = [\n")?;
    for row in (0..image.rows()).filter_map(|r| image.row(r)) {
        for p in row {
            write!(out, "{} ", p)?;
        }
        out.write_char('\n')?;
    }
    out.write_str("];\n")
}

/// [`write_matlab`] into a fresh string.
pub fn to_matlab<P: Copy + fmt::Display>(image: &Image<P>) -> String {
    let mut out = String::new();
    let _ = write_matlab(&mut out, image);
    out
}
