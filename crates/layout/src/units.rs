/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// PostScript points per inch.
pub const PT_PER_INCH: f64 = 72.0;

/// Height of one point expressed in millimetres (25.4 / 72).
///
/// Label baselines sit this far below the element origin per point of
/// font size.
pub const PT_TO_MM: f64 = 0.352_777_778;

/// Converts a millimetre length to device pixels at the given DPI.
/// 依指定 DPI 將公釐長度換算為裝置像素。
pub fn mm_to_px(mm: f64, dpi: u32) -> u32 {
    (mm * dpi as f64 / MM_PER_INCH).round() as u32
}

/// Converts millimetres to PostScript points.
pub fn mm_to_pt(mm: f64) -> f64 {
    mm / MM_PER_INCH * PT_PER_INCH
}

/// Converts PostScript points to millimetres.
pub fn pt_to_mm(pt: f64) -> f64 {
    pt / PT_PER_INCH * MM_PER_INCH
}
