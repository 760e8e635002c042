use loopgen::config::Config;
use loopgen::constants::DEFAULT_CANDIDATE_COUNT;
use loopgen::models::{
    ActivityKind, ActivityMetadata, ChartSeries, Coordinates, DistanceMeters, LoopRouteRequest,
    Pace,
};
use loopgen::services::activity_export::ExportFormat;
use loopgen::services::route_generator::LoopSearch;
use loopgen::AppState;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_AVG_SPEED_KMH: f64 = 10.0;
const DEFAULT_AVG_HEART_RATE_BPM: f64 = 140.0;

fn print_help() {
    eprintln!(
        "\
Usage: generate --lat=LAT --lng=LNG --distance-km=KM [OPTIONS]

Options:
  --lat=LAT             Start latitude (required)
  --lng=LNG             Start longitude (required)
  --distance-km=KM      Target loop length in km (required)
  --count=N             Routes to generate (default: {count})
  --activity=KIND       running, biking or walking (default: running)
  --speed=KMH           Average speed in km/h (default: {speed})
  --hr=BPM              Average heart rate (default: {hr})
  --format=FMT          tcx, gpx or both (default: tcx)
  --out=DIR             Output directory (default: .)
  --seed=N              Seed for reproducible routes and telemetry
  --help                Show this help message

Route provider settings are read from the environment (ROUTE_PROVIDER, ORS_API_KEY, ...).",
        count = DEFAULT_CANDIDATE_COUNT,
        speed = DEFAULT_AVG_SPEED_KMH,
        hr = DEFAULT_AVG_HEART_RATE_BPM,
    );
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    let prefix = format!("--{}=", name);
    args.iter().find_map(|a| a.strip_prefix(prefix.as_str()))
}

fn parse_flag<T: std::str::FromStr>(args: &[String], name: &str) -> Result<Option<T>, String> {
    match flag(args, name) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| format!("Invalid --{}: '{}'", name, value)),
        None => Ok(None),
    }
}

fn required_flag<T: std::str::FromStr>(args: &[String], name: &str) -> Result<T, String> {
    parse_flag(args, name)?.ok_or_else(|| format!("Missing --{}", name))
}

fn parse_formats(value: &str) -> Result<Vec<ExportFormat>, String> {
    if value.eq_ignore_ascii_case("both") {
        return Ok(vec![ExportFormat::Tcx, ExportFormat::Gpx]);
    }
    Ok(vec![value.parse()?])
}

fn print_chart_summary(series: &ChartSeries) {
    if series.elapsed_s.is_empty() {
        return;
    }
    let samples = series.elapsed_s.len() as f64;
    let avg_speed = series.speed_kmh.iter().sum::<f64>() / samples;
    let avg_hr = series.heart_rate_bpm.iter().sum::<f64>() / samples;
    let min_hr = series
        .heart_rate_bpm
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    let max_hr = series
        .heart_rate_bpm
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    println!("Telemetry for route 1:");
    println!("  samples:    {}", series.elapsed_s.len());
    println!(
        "  duration:   {}s",
        series.elapsed_s.last().copied().unwrap_or(0)
    );
    println!("  avg speed:  {:.1} km/h", avg_speed);
    println!(
        "  heart rate: avg {:.0}, min {:.0}, max {:.0} bpm",
        avg_hr, min_hr, max_hr
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (less verbose for the CLI)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loopgen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI args
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--help") {
        print_help();
        return Ok(());
    }

    let lat: f64 = required_flag(&args, "lat")?;
    let lng: f64 = required_flag(&args, "lng")?;
    let distance_km: f64 = required_flag(&args, "distance-km")?;
    let count: Option<usize> = parse_flag(&args, "count")?;
    let activity: ActivityKind = parse_flag(&args, "activity")?.unwrap_or_default();
    let avg_speed_kmh: f64 = parse_flag(&args, "speed")?.unwrap_or(DEFAULT_AVG_SPEED_KMH);
    let avg_heart_rate_bpm: f64 = parse_flag(&args, "hr")?.unwrap_or(DEFAULT_AVG_HEART_RATE_BPM);
    let formats = parse_formats(flag(&args, "format").unwrap_or("tcx"))?;
    let out_dir = PathBuf::from(flag(&args, "out").unwrap_or("."));
    let seed: Option<u64> = parse_flag(&args, "seed")?;

    let config = Config::from_env().map_err(|e| format!("Config error: {}", e))?;
    let state = AppState::from_config(&config)?;

    let request = LoopRouteRequest {
        start_point: Coordinates::new(lat, lng)?,
        distance_km,
        activity,
        count,
        distance_tolerance_pct: None,
        max_attempts: None,
        seed,
    };
    request.validate(&config.route_generator)?;

    let pace = Pace {
        avg_speed_kmh,
        avg_heart_rate_bpm,
    };
    pace.validate()?;
    let metadata = ActivityMetadata {
        activity,
        start_time: OffsetDateTime::now_utc(),
        name: None,
    };

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let search = LoopSearch::from_request(&request, &config.route_generator);
    let generation = state
        .route_generator
        .generate_loop_routes(&search, &mut rng)
        .await;

    if generation.routes.is_empty() {
        println!(
            "{}",
            generation.message.as_deref().unwrap_or("No route found.")
        );
        return Ok(());
    }

    std::fs::create_dir_all(&out_dir)?;

    for (index, route) in generation.routes.iter().enumerate() {
        println!(
            "Route {}: {}, {} points (seed {})",
            index + 1,
            DistanceMeters(route.distance_m).to_km(),
            route.path.len(),
            route.seed
        );
        for format in &formats {
            let bytes = state
                .exporter
                .export(*format, &route.path, &pace, &metadata, &mut rng)?;
            let file = out_dir.join(format.file_name(index + 1));
            std::fs::write(&file, bytes)?;
            println!("  -> {}", file.display());
        }
    }

    let series = state
        .exporter
        .chart_series(&generation.routes[0].path, &pace, &mut rng);
    print_chart_summary(&series);

    Ok(())
}
