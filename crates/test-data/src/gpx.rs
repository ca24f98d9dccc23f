//! GPX document generation from sample points.
//!
//! Generates GPX 1.1 XML with one track whose segments are the given point
//! lists. Elevation and time elements are written only when present.

use crate::SamplePoint;

/// Generates a GPX 1.1 XML document with one `<trkseg>` per entry of `segments`.
pub fn generate_gpx(segments: &[Vec<SamplePoint>], track_name: &str) -> Vec<u8> {
    let mut gpx = header(track_name);

    gpx.push_str("  <trk>\n");
    gpx.push_str(&format!("    <name>{}</name>\n", escape_xml(track_name)));
    for segment in segments {
        gpx.push_str("    <trkseg>\n");
        for point in segment {
            push_point(&mut gpx, point);
        }
        gpx.push_str("    </trkseg>\n");
    }
    gpx.push_str("  </trk>\n");
    gpx.push_str("</gpx>\n");

    gpx.into_bytes()
}

fn header(name: &str) -> String {
    let mut gpx = String::new();
    gpx.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    gpx.push('\n');
    gpx.push_str(r#"<gpx version="1.1" creator="gpx-courses-test-data""#);
    gpx.push_str(r#" xmlns="http://www.topografix.com/GPX/1/1">"#);
    gpx.push('\n');
    gpx.push_str("  <metadata>\n");
    gpx.push_str(&format!("    <name>{}</name>\n", escape_xml(name)));
    gpx.push_str("  </metadata>\n");
    gpx
}

fn push_point(gpx: &mut String, point: &SamplePoint) {
    gpx.push_str(&format!(
        r#"      <trkpt lat="{:.7}" lon="{:.7}">"#,
        point.lat, point.lon
    ));
    gpx.push('\n');

    if let Some(ele) = point.elevation {
        gpx.push_str(&format!("        <ele>{:.2}</ele>\n", ele));
    }

    if let Some(ts) = point.timestamp {
        let formatted = ts
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default();
        gpx.push_str(&format!("        <time>{}</time>\n", formatted));
    }

    gpx.push_str("      </trkpt>\n");
}

/// Escapes XML special characters in a string.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Documents a GPX parser must reject.
pub mod malformed {
    use super::{generate_gpx, header};
    use crate::SamplePoint;

    /// Plain text with a `.gpx` name.
    pub fn not_xml() -> Vec<u8> {
        b"Activity exported from a watch that forgot the XML".to_vec()
    }

    /// A document cut off in the middle of a track point.
    pub fn truncated() -> Vec<u8> {
        let mut gpx = header("Truncated");
        gpx.push_str("  <trk>\n    <trkseg>\n      <trkpt lat=\"48.85\" lon=");
        gpx.into_bytes()
    }

    /// Well-formed GPX whose only track has no points.
    pub fn no_track_points() -> Vec<u8> {
        generate_gpx(&[Vec::new()], "Empty")
    }

    /// A latitude beyond the pole.
    pub fn out_of_range() -> Vec<u8> {
        generate_gpx(
            &[vec![SamplePoint::new(48.85, 2.35), SamplePoint::new(91.5, 2.35)]],
            "Out Of Range",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn test_generate_gpx_basic() {
        let now = OffsetDateTime::now_utc();
        let points = vec![
            SamplePoint {
                lat: 48.8500,
                lon: 2.3500,
                elevation: Some(35.0),
                timestamp: Some(now),
            },
            SamplePoint {
                lat: 48.8510,
                lon: 2.3510,
                elevation: Some(36.0),
                timestamp: Some(now + time::Duration::seconds(60)),
            },
        ];

        let gpx = generate_gpx(&[points], "Canal Run");
        let gpx_str = String::from_utf8(gpx).unwrap();

        assert!(gpx_str.contains(r#"version="1.1""#));
        assert!(gpx_str.contains("<name>Canal Run</name>"));
        assert!(gpx_str.contains(r#"lat="48.8500000""#));
        assert!(gpx_str.contains(r#"lon="2.3500000""#));
        assert!(gpx_str.contains("<ele>35.00</ele>"));
        assert!(gpx_str.contains("<time>"));
    }

    #[test]
    fn test_generate_gpx_escapes_special_chars() {
        let gpx = generate_gpx(&[vec![SamplePoint::new(40.0, -105.0)]], "Hills & <Dales>");
        let gpx_str = String::from_utf8(gpx).unwrap();

        assert!(gpx_str.contains("Hills &amp; &lt;Dales&gt;"));
    }

    #[test]
    fn test_generate_gpx_without_optional_fields() {
        let gpx = generate_gpx(&[vec![SamplePoint::new(40.0, -105.0)]], "Simple Track");
        let gpx_str = String::from_utf8(gpx).unwrap();

        assert!(!gpx_str.contains("<ele>"));
        assert!(!gpx_str.contains("<time>"));
        assert!(gpx_str.contains(r#"lat="40.0000000""#));
    }

    #[test]
    fn test_multiple_segments_read_back() {
        let first = vec![SamplePoint::new(1.0, 1.0), SamplePoint::new(1.1, 1.0)];
        let second = vec![SamplePoint::new(2.0, 1.0).with_elevation(12.5)];
        let bytes = generate_gpx(&[first, second], "Two Parts");

        let parsed = ::gpx::read(bytes.as_slice()).unwrap();
        assert_eq!(parsed.tracks.len(), 1);
        assert_eq!(parsed.tracks[0].segments.len(), 2);
        assert_eq!(parsed.tracks[0].segments[1].points[0].elevation, Some(12.5));
    }

    #[test]
    fn test_malformed_documents_rejected_or_empty() {
        assert!(::gpx::read(malformed::not_xml().as_slice()).is_err());
        assert!(::gpx::read(malformed::truncated().as_slice()).is_err());

        let empty = ::gpx::read(malformed::no_track_points().as_slice()).unwrap();
        assert!(empty.tracks.iter().all(|t| t.segments.iter().all(|s| s.points.is_empty())));
    }
}
