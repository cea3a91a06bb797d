//! Sample decoding
//!
//! Two input encodings are understood:
//!
//! - **CSV text**: one sample per row taken from the first column. Every
//!   field on a row must still be numeric. Blank lines and lines starting
//!   with `#` are ignored.
//! - **Raw f32**: little-endian 32-bit floats, one real sample each.

use crate::types::{AnalysisError, AnalysisResult, SampleBuffer};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Parse comma-separated sample text.
///
/// Line numbers in [`AnalysisError::NonNumeric`] are 1-based.
pub fn parse_csv_samples(text: &str) -> AnalysisResult<SampleBuffer> {
    let mut samples = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split(',').map(|field| parse_field(field, idx + 1));
        if let Some(first) = fields.next() {
            samples.push(first?);
        }
        for field in fields {
            field?;
        }
    }

    if samples.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    Ok(samples)
}

fn parse_field(field: &str, line: usize) -> AnalysisResult<f64> {
    let field = field.trim();
    field
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AnalysisError::NonNumeric {
            line,
            value: field.to_string(),
        })
}

/// Read little-endian f32 samples until end of input
pub fn read_f32_samples<R: Read>(mut reader: R) -> AnalysisResult<SampleBuffer> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| AnalysisError::Computation(format!("failed to read samples: {}", e)))?;

    if bytes.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    if bytes.len() % 4 != 0 {
        return Err(AnalysisError::InvalidParameter(format!(
            "raw f32 input length {} is not a multiple of 4 bytes",
            bytes.len()
        )));
    }

    let mut values = vec![0f32; bytes.len() / 4];
    let mut cursor = &bytes[..];
    cursor
        .read_f32_into::<LittleEndian>(&mut values)
        .map_err(|e| AnalysisError::Computation(format!("failed to decode samples: {}", e)))?;

    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            if v.is_finite() {
                Ok(v as f64)
            } else {
                Err(AnalysisError::NonNumeric {
                    line: i + 1,
                    value: v.to_string(),
                })
            }
        })
        .collect()
}

/// Write samples as little-endian f32
pub fn write_f32_samples<W: Write>(mut writer: W, samples: &[f64]) -> std::io::Result<()> {
    for &sample in samples {
        writer.write_f32::<LittleEndian>(sample as f32)?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv() {
        let text = "# capture 1\n0.5\n\n-1.25, 3.0\n  2e-3 \n";
        assert_eq!(parse_csv_samples(text).unwrap(), vec![0.5, -1.25, 0.002]);
    }

    #[test]
    fn test_parse_csv_rejects_text() {
        let err = parse_csv_samples("1.0\n2.0\nabc\n").unwrap_err();
        assert_eq!(
            err,
            AnalysisError::NonNumeric {
                line: 3,
                value: "abc".to_string()
            }
        );
        assert!(err.is_input_error());

        assert!(parse_csv_samples("1.0\nNaN\n").is_err());
    }

    #[test]
    fn test_parse_csv_checks_every_column() {
        assert_eq!(
            parse_csv_samples("1.0,abc\n2.0,3.0\n"),
            Err(AnalysisError::NonNumeric {
                line: 1,
                value: "abc".to_string()
            })
        );
        assert_eq!(
            parse_csv_samples("1.0,2.0\n3.0,\n"),
            Err(AnalysisError::NonNumeric {
                line: 2,
                value: String::new()
            })
        );
        assert_eq!(
            parse_csv_samples("1.0,2.0,3.0\n-4.0,5e1,6\n").unwrap(),
            vec![1.0, -4.0]
        );
    }

    #[test]
    fn test_parse_csv_empty() {
        assert_eq!(parse_csv_samples(""), Err(AnalysisError::EmptyInput));
        assert_eq!(
            parse_csv_samples("# only comments\n\n"),
            Err(AnalysisError::EmptyInput)
        );
    }

    #[test]
    fn test_f32_roundtrip() {
        let samples = vec![0.0, 1.5, -0.25, 1000.0];
        let mut buf = Vec::new();
        write_f32_samples(&mut buf, &samples).unwrap();
        assert_eq!(buf.len(), 16);
        assert_eq!(read_f32_samples(&buf[..]).unwrap(), samples);
    }

    #[test]
    fn test_f32_bad_length() {
        assert_eq!(read_f32_samples(&[][..]), Err(AnalysisError::EmptyInput));
        assert!(matches!(
            read_f32_samples(&[0u8, 0, 0, 0, 1][..]),
            Err(AnalysisError::InvalidParameter(_))
        ));
    }
}
