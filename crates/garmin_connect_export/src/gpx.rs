//! Sanity check for downloaded GPX files.
//!
//! Activities without GPS data (treadmill runs, indoor rides) still come back
//! as a valid GPX document, just without any `<trkpt>` elements.

use quick_xml::Reader;
use quick_xml::events::Event;

/// Count the `<trkpt>` elements in a GPX document.
pub fn count_track_points(data: &[u8]) -> Result<usize, quick_xml::Error> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();
    let mut count = 0;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"trkpt" => {
                count += 1;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(count)
}

/// Log whether the file carries track points. Never fails the export.
pub fn report(activity_id: i64, data: &[u8]) {
    match count_track_points(data) {
        Ok(0) => tracing::info!(activity_id, "Done. No track points found."),
        Ok(n) => tracing::info!(activity_id, track_points = n, "Done. GPX data saved."),
        Err(e) => tracing::warn!(activity_id, error = %e, "Done. GPX file could not be parsed."),
    }
}
