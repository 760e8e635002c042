use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{ActivityMetadata, Coordinates, Telemetry};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use rand::Rng;
use std::io::Cursor;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Garmin TrainingCenterDatabase v2 document for one lap.
///
/// `telemetry` must be distance-aware: sample `i` describes the end of
/// segment `i`, so trackpoint `i` sits at `path[i + 1]`.
pub fn encode_tcx<R: Rng + ?Sized>(
    path: &[Coordinates],
    telemetry: &Telemetry,
    metadata: &ActivityMetadata,
    rng: &mut R,
) -> Result<Vec<u8>> {
    let series = [
        ("elapsed_s", telemetry.elapsed_s.len()),
        ("speed_kmh", telemetry.speed_kmh.len()),
        ("heart_rate_bpm", telemetry.heart_rate_bpm.len()),
        ("altitude_m", telemetry.altitude_m.len()),
        ("distance_m", telemetry.distance_m.len()),
    ];
    if let Some((name, len)) = series
        .iter()
        .find(|(_, len)| path.is_empty() || *len != path.len() - 1)
    {
        return Err(AppError::Encoding(format!(
            "Telemetry {} has {} samples for a {}-point path",
            name,
            len,
            path.len()
        )));
    }

    let start = format_time(metadata.start_time)?;
    let calories = rng.random_range(CALORIES_MIN..CALORIES_MAX);
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("TrainingCenterDatabase");
    root.push_attribute(("xmlns", TCX_NAMESPACE));
    root.push_attribute(("xmlns:ns3", TCX_ACTIVITY_EXTENSION_NAMESPACE));
    write(&mut writer, Event::Start(root))?;
    open(&mut writer, "Activities")?;

    let mut activity = BytesStart::new("Activity");
    activity.push_attribute(("Sport", metadata.activity.tcx_sport()));
    write(&mut writer, Event::Start(activity))?;
    text_element(&mut writer, "Id", &start)?;

    let mut lap = BytesStart::new("Lap");
    lap.push_attribute(("StartTime", start.as_str()));
    write(&mut writer, Event::Start(lap))?;
    text_element(
        &mut writer,
        "TotalTimeSeconds",
        &telemetry.total_seconds().to_string(),
    )?;
    text_element(
        &mut writer,
        "DistanceMeters",
        &(telemetry.total_distance_m() as u64).to_string(),
    )?;
    text_element(&mut writer, "Calories", &calories.to_string())?;
    text_element(&mut writer, "Intensity", "Active")?;
    text_element(&mut writer, "TriggerMethod", "Manual")?;

    open(&mut writer, "Track")?;
    for (i, point) in path.iter().skip(1).enumerate() {
        write_trackpoint(&mut writer, point, telemetry, i, metadata.start_time)?;
    }
    close(&mut writer, "Track")?;
    close(&mut writer, "Lap")?;

    if let Some(name) = &metadata.name {
        text_element(&mut writer, "Notes", name)?;
    }

    close(&mut writer, "Activity")?;
    close(&mut writer, "Activities")?;
    close(&mut writer, "TrainingCenterDatabase")?;

    Ok(writer.into_inner().into_inner())
}

fn write_trackpoint(
    writer: &mut XmlWriter,
    point: &Coordinates,
    telemetry: &Telemetry,
    i: usize,
    start_time: OffsetDateTime,
) -> Result<()> {
    let time = start_time + Duration::seconds(telemetry.elapsed_s[i] as i64);

    open(writer, "Trackpoint")?;
    text_element(writer, "Time", &format_time(time)?)?;

    open(writer, "Position")?;
    text_element(writer, "LatitudeDegrees", &point.lat.to_string())?;
    text_element(writer, "LongitudeDegrees", &point.lng.to_string())?;
    close(writer, "Position")?;

    text_element(
        writer,
        "AltitudeMeters",
        &format!("{:.1}", telemetry.altitude_m[i]),
    )?;
    text_element(
        writer,
        "DistanceMeters",
        &format!("{:.1}", telemetry.distance_m[i]),
    )?;

    open(writer, "HeartRateBpm")?;
    text_element(
        writer,
        "Value",
        &(telemetry.heart_rate_bpm[i].round().max(0.0) as u32).to_string(),
    )?;
    close(writer, "HeartRateBpm")?;

    open(writer, "Extensions")?;
    open(writer, "ns3:TPX")?;
    text_element(
        writer,
        "ns3:Speed",
        &format!("{:.2}", telemetry.speed_kmh[i] / 3.6),
    )?;
    close(writer, "ns3:TPX")?;
    close(writer, "Extensions")?;

    close(writer, "Trackpoint")
}

fn format_time(time: OffsetDateTime) -> Result<String> {
    time.format(&Rfc3339).map_err(AppError::encoding)
}

fn write(writer: &mut XmlWriter, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(AppError::encoding)
}

fn open(writer: &mut XmlWriter, name: &str) -> Result<()> {
    write(writer, Event::Start(BytesStart::new(name)))
}

fn close(writer: &mut XmlWriter, name: &str) -> Result<()> {
    write(writer, Event::End(BytesEnd::new(name)))
}

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    open(writer, name)?;
    write(writer, Event::Text(BytesText::new(text)))?;
    close(writer, name)
}
