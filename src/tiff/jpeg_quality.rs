//! JPEG quality estimation from quantization tables
//!
//! A JPEGTables payload embeds the quantization tables the codec was
//! configured with, which is enough to estimate the original quality
//! setting without touching any pixel data.

/// Estimates JPEG quality from a JPEGTables byte run
///
/// Locates the first FF DB quantization-table marker and examines the
/// first table only.  The low nibble of the precision/id byte must be
/// zero; the full byte selects 8- versus 16-bit table entries.  Returns
/// None on any parsing failure.
pub fn estimate_jpeg_quality(jpeg_tables: &[u8]) -> Option<i64> {
    let marker = jpeg_tables.windows(2).position(|w| w == [0xFF, 0xDB])?;
    let tables = &jpeg_tables[marker + 2..];
    if tables.len() < 2 {
        return None;
    }
    let length = u16::from_be_bytes([tables[0], tables[1]]) as usize;
    let tables = tables.get(2..length)?;
    let precision = *tables.first()?;
    if precision & 0xF != 0 {
        return None;
    }
    let values: Vec<u64> = if precision != 0 {
        let raw = tables.get(1..1 + 128)?;
        raw.chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]) as u64)
            .collect()
    } else {
        let raw = tables.get(1..1 + 64)?;
        raw.iter().map(|&b| b as u64).collect()
    };
    if values[58] < 100 {
        return Some((100.0 - values[58] as f64 / 2.0) as i64);
    }
    if values[15] == 0 {
        return None;
    }
    Some((5000.0 / 2.5 / values[15] as f64) as i64)
}

#[cfg(test)]
mod tests {
    use super::estimate_jpeg_quality;

    fn tables_payload(values: &[u8; 64]) -> Vec<u8> {
        let mut payload = vec![0xFF, 0xD8, 0xFF, 0xDB];
        payload.extend_from_slice(&(67u16).to_be_bytes());
        payload.push(0); // 8-bit table 0
        payload.extend_from_slice(values);
        payload
    }

    #[test]
    fn estimates_from_low_values() {
        let mut table = [0u8; 64];
        table[58] = 20;
        assert_eq!(estimate_jpeg_quality(&tables_payload(&table)), Some(90));
    }

    #[test]
    fn estimates_from_divisor() {
        let mut table = [255u8; 64];
        table[15] = 40;
        assert_eq!(estimate_jpeg_quality(&tables_payload(&table)), Some(50));
    }

    #[test]
    fn rejects_missing_marker() {
        assert_eq!(estimate_jpeg_quality(&[0xFF, 0xD8, 0x00, 0x01]), None);
    }

    #[test]
    fn rejects_second_table_id() {
        let mut payload = vec![0xFF, 0xDB];
        payload.extend_from_slice(&(67u16).to_be_bytes());
        payload.push(1); // table id 1 in the low nibble
        payload.extend_from_slice(&[0u8; 64]);
        assert_eq!(estimate_jpeg_quality(&payload), None);
    }
}
