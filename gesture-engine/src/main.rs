//! Gesture Recognizer - hand gesture recognition from centroid traces

use gesture_engine::app::cli::{Cli, Commands, ConfigAction};
use gesture_engine::app::config::Config;
use gesture_engine::capture::ring_buffer::CentroidRingBuffer;
use gesture_engine::capture::trace_file::{load_points, parse_point_line, CentroidTrace};
use gesture_engine::capture::types::{CentroidSample, CentroidSource};
use gesture_engine::capture::SyntheticTrace;
use gesture_engine::geometry::Point;
use gesture_engine::pipeline::{EngineStats, GestureEngine, GestureListener, GestureReport};
use gesture_engine::recognition::{builtin_registry, Classifier, Recognition, ScoringMode, MAX_DIM};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    // Initialize tracing (--verbose enables debug-level output)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load config
    let config = if let Some(path) = &cli.config {
        Config::load(path)?
    } else {
        Config::load_default()?
    };

    // Execute command
    match cli.command {
        Commands::Replay {
            input,
            mode,
            threshold,
            json,
        } => {
            run_replay(&input, mode, threshold, json, &config)?;
        }
        Commands::Listen {
            mode,
            threshold,
            record,
        } => {
            run_listen(mode, threshold, record, &config)?;
        }
        Commands::Classify { input, mode } => {
            run_classify(&input, mode, &config)?;
        }
        Commands::Demo { mode, size, speed } => {
            run_demo(mode, size, speed, &config)?;
        }
        Commands::Templates { detailed } => {
            run_templates(detailed)?;
        }
        Commands::Traces { detailed } => {
            run_traces(detailed)?;
        }
        Commands::Init { force } => {
            run_init(force, &config)?;
        }
        Commands::Config { action } => {
            run_config(action, &config)?;
        }
    }

    Ok(())
}

/// Copy of `config` with command-line overrides applied
fn effective_config(
    config: &Config,
    mode: Option<ScoringMode>,
    threshold: Option<f64>,
) -> anyhow::Result<Config> {
    let mut config = config.clone();
    if let Some(mode) = mode {
        config.recognition.scoring_mode = mode;
    }
    if threshold.is_some() {
        config.recognition.rejection_threshold = threshold;
    }
    config.validate()?;
    Ok(config)
}

/// Prints one line per classified gesture
struct ReportPrinter {
    json: bool,
    printed: usize,
}

impl ReportPrinter {
    fn new(json: bool) -> Self {
        Self { json, printed: 0 }
    }
}

impl GestureListener for ReportPrinter {
    fn on_gesture_classified(&mut self, report: &GestureReport) {
        self.printed += 1;

        if self.json {
            match serde_json::to_string(report) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to serialize report: {}", e),
            }
            return;
        }

        let frames = format!("[frames {:>6}-{:<6}]", report.start_frame, report.end_frame);
        match (&report.recognition, &report.error) {
            (_, Some(error)) => println!("{} failed: {}", frames, error),
            (Recognition::Match { template, score }, None) => {
                println!("{} {:<12} score {:.3}", frames, template, score)
            }
            (Recognition::NoMatch { best_score: Some(best) }, None) => {
                println!("{} no match     best {:.3}", frames, best)
            }
            (Recognition::NoMatch { best_score: None }, None) => {
                println!("{} no match", frames)
            }
        }
    }
}

fn print_stats(stats: &EngineStats) {
    println!("\nFrames processed: {}", stats.frames);
    println!(
        "Segments: {} started, {} classified, {} discarded",
        stats.segments_started, stats.segments_completed, stats.segments_discarded
    );
    println!(
        "Results: {} matched, {} unmatched, {} failed",
        stats.matches, stats.no_matches, stats.failures
    );
}

fn run_replay(
    input: &std::path::Path,
    mode: Option<ScoringMode>,
    threshold: Option<f64>,
    json: bool,
    config: &Config,
) -> anyhow::Result<()> {
    info!("Replaying trace {:?}", input);

    if !input.exists() {
        anyhow::bail!("Trace file not found: {:?}", input);
    }

    let trace = CentroidTrace::load(input)?;
    let mut config = effective_config(config, mode, threshold)?;

    // A trace knows the frame it was captured in better than the config does
    if let Some((width, height)) = trace.frame_size() {
        config.camera.width = width;
        config.camera.height = height;
    }

    info!(
        "Loaded {} samples ({}x{} frame, {} scoring)",
        trace.len(),
        config.camera.width,
        config.camera.height,
        config.recognition.scoring_mode
    );

    let mut engine = GestureEngine::from_config(&config)?;
    let mut printer = ReportPrinter::new(json);
    let stats = engine.run(&mut trace.into_source(), &mut printer)?;

    if !json {
        print_stats(&stats);
    }

    Ok(())
}

/// Source that keeps a copy of every sample it hands out
struct TeeSource<S> {
    inner: S,
    seen: Vec<CentroidSample>,
}

impl<S: CentroidSource> CentroidSource for TeeSource<S> {
    fn next_centroid(&mut self) -> Option<CentroidSample> {
        let sample = self.inner.next_centroid()?;
        self.seen.push(sample);
        Some(sample)
    }
}

fn run_listen(
    mode: Option<ScoringMode>,
    threshold: Option<f64>,
    record: Option<String>,
    config: &Config,
) -> anyhow::Result<()> {
    let config = effective_config(config, mode, threshold)?;
    let mut engine = GestureEngine::from_config(&config)?;

    // Create ring buffer for centroid hand-off
    let buffer = CentroidRingBuffer::with_capacity(config.capture.ring_buffer_size)?;
    let stats_handle = buffer.stats();
    let (mut producer, consumer) = buffer.split();

    // Set up Ctrl+C handler
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_handler = stop_flag.clone();

    ctrlc::set_handler(move || {
        stop_flag_handler.store(true, Ordering::SeqCst);
    })?;

    // Reader thread: stdin lines -> ring buffer. Dropping the producer at
    // EOF ends the stream once the engine has drained it.
    let reader_stop = stop_flag.clone();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for (line_no, line) in stdin.lock().lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            };
            match parse_point_line(&line) {
                Ok(Some(point)) => {
                    let sample = CentroidSample::new(producer.next_frame(), point);
                    if !producer.push_waiting(sample, &reader_stop) {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("Skipping line {}: {}", line_no + 1, e),
            }
        }
    });

    info!(
        "Listening for centroids on stdin ({}x{} frame, {} scoring). Press Ctrl+C to stop",
        config.camera.width, config.camera.height, config.recognition.scoring_mode
    );

    let mut source = TeeSource {
        inner: consumer.with_stop_flag(stop_flag),
        seen: Vec::new(),
    };
    let mut printer = ReportPrinter::new(false);
    let stats = engine.run(&mut source, &mut printer)?;

    print_stats(&stats);
    let refused = stats_handle.pushes_refused.load(Ordering::Relaxed);
    if refused > 0 {
        info!("Reader waited on a full buffer {} times", refused);
    }

    if let Some(name) = record {
        let traces_dir = Cli::traces_dir();
        std::fs::create_dir_all(&traces_dir)?;

        let output_path = traces_dir.join(format!("{}.json", name));
        CentroidTrace::new(source.seen)
            .with_frame_size(config.camera.width, config.camera.height)
            .save(&output_path)?;
        info!("Saved trace to {:?}", output_path);
    }

    Ok(())
}

fn run_classify(
    input: &std::path::Path,
    mode: Option<ScoringMode>,
    config: &Config,
) -> anyhow::Result<()> {
    if !input.exists() {
        anyhow::bail!("Point file not found: {:?}", input);
    }

    let points = load_points(input)?;
    let config = effective_config(config, mode, None)?;
    let classifier = Classifier::new(builtin_registry()?, config.recognition.scoring_mode)
        .with_rejection_threshold(config.recognition.rejection_threshold);

    info!("Classifying {} points", points.len());
    let classification = classifier.classify(&points)?;

    println!("{:<14} {:>12} {:>12} {:>12}", "template", "score", "min dist", "max dist");
    for entry in &classification.scores {
        println!(
            "{:<14} {:>12.3} {:>12.3} {:>12.3}",
            entry.template, entry.score.score, entry.score.min_distance, entry.score.max_distance
        );
    }

    match &classification.recognition {
        Recognition::Match { template, score } => {
            println!("\nBest match: {} (score {:.3})", template, score)
        }
        Recognition::NoMatch { best_score } => match best_score {
            Some(best) => println!("\nNo match (best score {:.3})", best),
            None => println!("\nNo match"),
        },
    }

    Ok(())
}

fn run_demo(
    mode: Option<ScoringMode>,
    size: f64,
    speed: f64,
    config: &Config,
) -> anyhow::Result<()> {
    if !(size > 0.0 && speed > 0.0) {
        anyhow::bail!("size and speed must be positive");
    }

    let config = effective_config(config, mode, None)?;
    let registry = builtin_registry()?;
    let center = Point::new(
        config.camera.width as f64 / 2.0,
        config.camera.height as f64 / 2.0,
    );

    let mut builder = SyntheticTrace::new(center).dwell(8);
    let mut expected = Vec::with_capacity(registry.len());
    for template in registry.iter() {
        let path_px = template.total_length() * size / MAX_DIM;
        let frames = ((path_px / speed).ceil() as usize).max(2);
        builder = builder.trace(template.raw_points(), size, frames)?.dwell(10);
        expected.push(template.name().to_string());
    }
    let trace = builder.build();

    info!(
        "Demo: {} gestures, {} frames, {} scoring",
        expected.len(),
        trace.len(),
        config.recognition.scoring_mode
    );

    let mut engine = GestureEngine::from_config(&config)?;
    let mut reports: Vec<GestureReport> = Vec::new();
    let stats = engine.run(&mut trace.into_source(), &mut |report: &GestureReport| {
        reports.push(report.clone())
    })?;

    let mut correct = 0;
    for (index, name) in expected.iter().enumerate() {
        let got = reports
            .get(index)
            .and_then(|r| r.recognition.template())
            .unwrap_or("-");
        let verdict = if got == name { "ok" } else { "MISS" };
        if got == name {
            correct += 1;
        }
        println!("  {:<12} -> {:<12} {}", name, got, verdict);
    }
    println!("\n{}/{} recognised", correct, expected.len());
    print_stats(&stats);

    Ok(())
}

fn run_templates(detailed: bool) -> anyhow::Result<()> {
    let registry = builtin_registry()?;

    println!("Templates ({}):", registry.len());
    for template in registry.iter() {
        if detailed {
            let bounds = template.bounding_box();
            println!(
                "  {:<12} ({} samples, length {:.1}, scaled {:.0}x{:.0})",
                template.name(),
                template.sample_count(),
                template.total_length(),
                bounds.width(),
                bounds.height()
            );
        } else {
            println!("  {}", template.name());
        }
    }

    Ok(())
}

fn run_traces(detailed: bool) -> anyhow::Result<()> {
    let traces_dir = Cli::traces_dir();

    if !traces_dir.exists() {
        println!("No traces found in {}", traces_dir.display());
        println!("Record one with: gesture-rec listen --record <name>");
        return Ok(());
    }

    println!("Traces in {:?}:", traces_dir);

    let mut entries: Vec<_> = std::fs::read_dir(&traces_dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|ext| ext == "json").unwrap_or(false))
        .collect();

    entries.sort_by_key(|e| e.path());

    for entry in &entries {
        let path = entry.path();
        let file_name = path.file_name().unwrap_or_default().to_string_lossy();

        if detailed {
            match CentroidTrace::load(&path) {
                Ok(trace) => {
                    let frame = trace
                        .frame_size()
                        .map(|(w, h)| format!("{}x{}", w, h))
                        .unwrap_or_else(|| "unknown frame".to_string());
                    println!("  {}  ({} samples, {})", file_name, trace.len(), frame);
                }
                Err(_) => {
                    let fs_meta = entry.metadata()?;
                    println!("  {}  ({} bytes, failed to parse)", file_name, fs_meta.len());
                }
            }
        } else {
            println!("  {}", file_name);
        }
    }

    if entries.is_empty() {
        println!("  (none)");
    }

    Ok(())
}

fn run_init(force: bool, config: &Config) -> anyhow::Result<()> {
    let config_path = Config::default_path();

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {:?}. Use --force to overwrite.",
            config_path
        );
    }

    config.save_default()?;
    println!("Created config at {:?}", config_path);
    println!("\nConfig content:\n{}", config.to_toml()?);

    std::fs::create_dir_all(Cli::traces_dir())?;
    println!("\nCreated directory:");
    println!("  Traces: {:?}", Cli::traces_dir());

    Ok(())
}

fn run_config(action: ConfigAction, config: &Config) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = config.to_toml()?;
            println!("Configuration ({:?}):\n", Config::default_path());
            println!("{}", toml_str);
        }
        ConfigAction::Get { key } => {
            let toml_str = config.to_toml()?;
            match find_toml_value(&toml_str, &key) {
                Some(v) => println!("{} = {}", key, v),
                None => {
                    anyhow::bail!("Configuration key '{}' not found or not set", key);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let config_path = Config::default_path();
            if !config_path.exists() {
                anyhow::bail!("No config file found. Run 'gesture-rec init' first.");
            }

            // Load, modify, check, and save
            let mut toml_content = std::fs::read_to_string(&config_path)?;
            if !set_toml_value(&mut toml_content, &key, &value) {
                anyhow::bail!("Failed to set '{}'. Section may not exist in config.", key);
            }
            let updated: Config = toml::from_str(&toml_content)
                .map_err(|e| anyhow::anyhow!("Invalid value for '{}': {}", key, e))?;
            updated.validate()?;

            std::fs::write(&config_path, &toml_content)?;
            println!("Set {} = {}", key, value);
        }
        ConfigAction::Reset { force } => {
            let config_path = Config::default_path();

            if config_path.exists() && !force {
                println!("Config exists at {:?}", config_path);
                println!("Use --force to reset to defaults");
                return Ok(());
            }

            Config::default().save_default()?;
            println!("Configuration reset to defaults at {:?}", config_path);
        }
    }

    Ok(())
}

/// Simple TOML value lookup by dotted key
fn find_toml_value<'a>(toml_str: &'a str, key: &str) -> Option<&'a str> {
    let (section_name, leaf_key) = split_key(key)?;

    // Top-level keys live before the first section header
    let mut in_section = section_name.is_empty();

    for line in toml_str.lines() {
        let trimmed = line.trim();

        if let Some(section) = section_header(trimmed) {
            in_section = section == section_name;
            continue;
        }

        if in_section {
            if let Some(eq_pos) = trimmed.find('=') {
                if trimmed[..eq_pos].trim() == leaf_key {
                    return Some(trimmed[eq_pos + 1..].trim());
                }
            }
        }
    }

    None
}

/// Simple TOML value setter by dotted key.
///
/// Replaces the key if present, otherwise appends it to the end of its
/// section. Returns false when the section itself is missing.
fn set_toml_value(toml_str: &mut String, key: &str, value: &str) -> bool {
    let Some((section_name, leaf_key)) = split_key(key) else {
        return false;
    };

    let mut in_section = section_name.is_empty();
    let mut section_seen = in_section;
    let mut insert_at = None;
    let mut found = false;

    let mut new_lines: Vec<String> = Vec::new();

    for line in toml_str.lines() {
        let trimmed = line.trim();

        if let Some(section) = section_header(trimmed) {
            if in_section && !found && insert_at.is_none() {
                insert_at = Some(trimmed_end(&new_lines));
            }
            in_section = section == section_name;
            section_seen |= in_section;
        } else if in_section && !found {
            if let Some(eq_pos) = trimmed.find('=') {
                if trimmed[..eq_pos].trim() == leaf_key {
                    new_lines.push(format!("{} = {}", leaf_key, value));
                    found = true;
                    continue;
                }
            }
        }

        new_lines.push(line.to_string());
    }

    if !found {
        if !section_seen {
            return false;
        }
        let at = insert_at.unwrap_or_else(|| trimmed_end(&new_lines));
        new_lines.insert(at, format!("{} = {}", leaf_key, value));
    }

    *toml_str = new_lines.join("\n");
    // Ensure trailing newline
    if !toml_str.ends_with('\n') {
        toml_str.push('\n');
    }

    true
}

fn split_key(key: &str) -> Option<(&str, &str)> {
    match key.rsplit_once('.') {
        Some((section, leaf)) if !section.is_empty() && !leaf.is_empty() => Some((section, leaf)),
        Some(_) => None,
        None if !key.is_empty() => Some(("", key)),
        None => None,
    }
}

fn section_header(trimmed: &str) -> Option<&str> {
    trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .map(str::trim)
}

/// Index just past the last non-blank line
fn trimmed_end(lines: &[String]) -> usize {
    lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(0, |i| i + 1)
}
