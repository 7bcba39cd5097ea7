//! PDF text-string encoding and Helvetica width estimates.

/// Decode a PDF text string (UTF-16BE with BOM, otherwise PDFDocEncoding,
/// which is treated as Latin-1).
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| b as char).collect()
}

/// Encode a field value as a PDF text string: Latin-1 when possible,
/// UTF-16BE with a byte-order mark otherwise.
pub fn encode_text_string(text: &str) -> Vec<u8> {
    if text.chars().all(|c| (c as u32) <= 0xFF) {
        return text.chars().map(|c| c as u8).collect();
    }
    let mut out = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}

/// Bytes for a `Tj` operand in a WinAnsi-encoded standard font.
///
/// Characters outside Latin-1 cannot be shown and become `?`.
pub fn encode_drawn_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) <= 0xFF { c as u8 } else { b'?' })
        .collect()
}

/// Approximate Helvetica advance width for one character, in 1/1000 em.
fn char_width(c: char) -> u32 {
    match c {
        ' ' | '.' | ',' | ':' | ';' | '!' | '\'' | '|' | 'i' | 'j' | 'l' => 278,
        'f' | 't' | 'I' | '/' | '-' | '(' | ')' | '[' | ']' => 333,
        'r' => 333,
        'm' | 'M' | 'W' => 833,
        'w' => 722,
        '@' => 1015,
        '%' => 889,
        '0'..='9' | '$' | '#' | '_' => 556,
        c if c.is_ascii_uppercase() => 667,
        _ => 556,
    }
}

/// Estimated rendered width of `text` at `font_size` points.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text.chars().map(char_width).sum();
    units as f32 * font_size / 1000.0
}

/// Largest font size (between `min` and `max`) at which `text` fits `width`,
/// and the text truncated to fit at that size.
pub fn fit_text(text: &str, width: f32, height: f32, max: f32, min: f32) -> (f32, String) {
    let mut size = max.min(height.max(min));
    while size > min && text_width(text, size) > width {
        size = (size - 0.5).max(min);
    }

    if text_width(text, size) <= width {
        return (size, text.to_string());
    }

    let mut fitted = String::new();
    for c in text.chars() {
        fitted.push(c);
        if text_width(&fitted, size) > width {
            fitted.pop();
            break;
        }
    }
    (size, fitted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_round_trips_without_bom() {
        let encoded = encode_text_string("Café");
        assert_eq!(encoded, b"Caf\xe9");
        assert_eq!(decode_text_string(&encoded), "Café");
    }

    #[test]
    fn wide_characters_use_utf16() {
        let encoded = encode_text_string("José ✓");
        assert_eq!(&encoded[..2], &[0xFE, 0xFF]);
        assert_eq!(decode_text_string(&encoded), "José ✓");
    }

    #[test]
    fn drawn_text_replaces_unrepresentable_chars() {
        assert_eq!(encode_drawn_text("OK ✓"), b"OK ?");
    }

    #[test]
    fn fit_shrinks_before_truncating() {
        let text = "Jane Q. Buyer and John Q. Buyer";
        let full = text_width(text, 10.0);
        let (size, fitted) = fit_text(text, full * 0.8, 14.0, 10.0, 6.0);
        assert!(size < 10.0 && size >= 6.0);
        assert_eq!(fitted, text);
    }

    #[test]
    fn fit_truncates_at_floor() {
        let (size, fitted) = fit_text("A very long description of terms", 20.0, 14.0, 10.0, 6.0);
        assert_eq!(size, 6.0);
        assert!(fitted.len() < 10);
        assert!(text_width(&fitted, size) <= 20.0);
    }
}
