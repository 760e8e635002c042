use crate::constants::GPX_CREATOR;
use crate::error::{AppError, Result};
use crate::models::Coordinates;
use geo::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};

/// GPX 1.1 document with a single track and segment, positions only
pub fn encode_gpx(path: &[Coordinates], name: Option<&str>) -> Result<Vec<u8>> {
    let mut gpx = Gpx::default();
    gpx.version = GpxVersion::Gpx11;
    gpx.creator = Some(GPX_CREATOR.to_string());

    let mut track = Track::new();
    track.name = name.map(str::to_string);

    let mut segment = TrackSegment::new();
    segment.points = path
        .iter()
        .map(|c| Waypoint::new(Point::new(c.lng, c.lat)))
        .collect();

    track.segments.push(segment);
    gpx.tracks.push(track);

    let mut buffer = Vec::new();
    gpx::write(&gpx, &mut buffer).map_err(AppError::encoding)?;
    Ok(buffer)
}
