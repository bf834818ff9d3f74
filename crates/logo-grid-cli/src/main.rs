use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use image::{DynamicImage, ImageFormat, ImageReader};
use logo_grid_core::{GridConfig, GridLayout, InputImage, compose_grid, plan_grid};
use serde::Deserialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "logo-grid",
    about = "Arrange logos into an evenly spaced grid image",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compose logos into a grid image
    Compose(GridArgs),
    /// Layout-only export (no image): compute placements and write JSON
    Layout(GridArgs),
    /// Trim transparent borders of each input and write the results
    Trim(TrimArgs),
}

#[derive(Parser, Debug, Clone)]
struct GridArgs {
    // Input/Output
    /// Input files or directories. Files keep their order; directories expand sorted by path
    #[arg(required = true, help_heading = "Input/Output")]
    inputs: Vec<PathBuf>,
    /// Output directory
    #[arg(short, long, default_value = ".", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Output file name; `.png` is appended unless it already ends in png/jpg/jpeg
    #[arg(short, long, default_value = "logo_grid", help_heading = "Input/Output")]
    name: String,
    /// YAML config file path (values in the file override flags)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
    /// Reorder inputs: comma-separated 1-based positions, e.g. `3,1,2`
    #[arg(long, value_delimiter = ',', help_heading = "Input/Output")]
    order: Vec<usize>,

    // Grid
    /// Cell width in px
    #[arg(long, default_value_t = 450, value_parser = clap::value_parser!(u32).range(100..=1000), help_heading = "Grid")]
    cell_width: u32,
    /// Cell height in px
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u32).range(100..=1000), help_heading = "Grid")]
    cell_height: u32,
    /// Space between columns and around the grid (left/right) in px
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(i32).range(0..=100), help_heading = "Grid")]
    cell_padding: i32,
    /// Number of rows
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..=10), help_heading = "Grid")]
    rows: u32,
    /// Space between rows in px (negative overlaps rows)
    #[arg(long, default_value_t = -50, allow_negative_numbers = true, value_parser = clap::value_parser!(i32).range(-100..=100), help_heading = "Grid")]
    row_padding: i32,
    /// Extra space above the first and below the last row in px
    #[arg(long, default_value_t = 0, allow_negative_numbers = true, value_parser = clap::value_parser!(i32).range(-100..=100), help_heading = "Grid")]
    outer_padding: i32,
    /// Background color as hex RRGGBB
    #[arg(long, default_value = "ffffff", value_parser = parse_hex_color, help_heading = "Grid")]
    background: [u8; 3],

    // Image Processing
    /// Do not trim transparent borders
    #[arg(long, default_value_t = false, help_heading = "Image Processing")]
    no_trim: bool,
    /// Trim alpha threshold (0..=255)
    #[arg(long, default_value_t = 0, help_heading = "Image Processing")]
    trim_threshold: u8,
    /// Prepare cells in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Image Processing")]
    parallel: bool,
    /// Refuse canvases with more pixels than this
    #[arg(long, help_heading = "Image Processing")]
    max_pixels: Option<u64>,

    // Export
    /// Also write the layout (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_layout: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct TrimArgs {
    /// Input files or directories
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output directory (file names are kept)
    #[arg(short, long, default_value = "trimmed")]
    out_dir: PathBuf,
    /// Trim alpha threshold (0..=255)
    #[arg(long, default_value_t = 0)]
    trim_threshold: u8,
}

/// The output file name was empty. Reported separately from layout errors.
#[derive(Debug, thiserror::Error)]
#[error("missing output file name: pass a non-empty --name")]
struct MissingOutputName;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Compose(args) => run_compose(args, cli.progress && !cli.quiet),
        Commands::Layout(args) => run_layout(args, cli.progress && !cli.quiet),
        Commands::Trim(args) => run_trim(args, cli.progress && !cli.quiet),
    }
}

fn run_compose(cli: &GridArgs, show_progress: bool) -> anyhow::Result<()> {
    let file_name = normalize_output_name(&cli.name)?;
    let cfg = build_config(cli)?;
    if cli.print_config {
        return print_config(&cfg, &cli.print_config_format);
    }

    let inputs = gather_inputs(cli, show_progress)?;
    info!(count = inputs.len(), "loaded input images");
    check_canvas_budget(&cfg, inputs.len(), cli.max_pixels)?;

    let out = compose_grid(&inputs, &cfg)?;
    let stats = out.stats();
    info!(
        width = out.image.width(),
        height = out.image.height(),
        columns = stats.columns,
        rows = stats.rows,
        coverage = format!("{:.2}%", stats.coverage * 100.0),
        "grid composed"
    );

    if cli.dry_run {
        println!("{}", stats.summary());
        return Ok(());
    }

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
    let out_path = cli.out_dir.join(&file_name);
    let format = ImageFormat::from_path(&out_path).unwrap_or(ImageFormat::Png);
    out.image
        .save_with_format(&out_path, format)
        .with_context(|| format!("write {}", out_path.display()))?;
    info!(?out_path, "grid written");

    if let Some(layout_path) = &cli.export_layout {
        write_layout(&out.layout, layout_path)?;
    }
    Ok(())
}

fn run_layout(cli: &GridArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(cli)?;
    if cli.print_config {
        return print_config(&cfg, &cli.print_config_format);
    }
    let inputs = gather_inputs(cli, show_progress)?;
    info!(count = inputs.len(), "loaded input images");

    let layout = plan_grid(&inputs, &cfg)?;
    let stats = layout.stats();
    println!("{}", stats.summary());
    if cli.dry_run {
        return Ok(());
    }

    let json_path = match &cli.export_layout {
        Some(p) => p.clone(),
        None => {
            fs::create_dir_all(&cli.out_dir)
                .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
            cli.out_dir.join(format!("{}.json", layout_stem(&cli.name)?))
        }
    };
    write_layout(&layout, &json_path)
}

fn run_trim(cli: &TrimArgs, show_progress: bool) -> anyhow::Result<()> {
    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
    let paths = gather_paths(&cli.inputs, &[], &[])?;
    let inputs = load_images_with_progress(&paths, show_progress)?;
    for (path, inp) in paths.iter().zip(&inputs) {
        let trimmed = logo_grid_core::trim_with_threshold(&inp.image, cli.trim_threshold);
        let file_name = path
            .file_name()
            .with_context(|| format!("no file name in {}", path.display()))?;
        let out_path = cli.out_dir.join(file_name);
        trimmed
            .save(&out_path)
            .with_context(|| format!("write {}", out_path.display()))?;
        debug!(
            ?out_path,
            from = ?(inp.image.width(), inp.image.height()),
            to = ?(trimmed.width(), trimmed.height()),
            "trimmed"
        );
    }
    info!(count = inputs.len(), out_dir = ?cli.out_dir, "trimmed images written");
    Ok(())
}

fn build_config(cli: &GridArgs) -> anyhow::Result<GridConfig> {
    let cfg = GridConfig {
        cell_width: cli.cell_width,
        cell_height: cli.cell_height,
        cell_padding: cli.cell_padding,
        rows: cli.rows,
        row_padding: cli.row_padding,
        outer_vertical_padding: cli.outer_padding,
        trim: !cli.no_trim,
        trim_threshold: cli.trim_threshold,
        background: cli.background,
        parallel: cli.parallel,
    };
    // config file values override flags
    let cfg = if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        y.into_grid_config(cfg)?
    } else {
        cfg
    };
    cfg.validate()?;
    Ok(cfg)
}

fn print_config(cfg: &GridConfig, format: &str) -> anyhow::Result<()> {
    match format {
        "yaml" => println!("{}", serde_yaml::to_string(cfg)?),
        _ => println!("{}", serde_json::to_string_pretty(cfg)?),
    }
    Ok(())
}

fn write_layout(layout: &GridLayout, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&logo_grid_core::to_json(layout))?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    info!(?path, cells = layout.cells.len(), "layout written");
    Ok(())
}

fn check_canvas_budget(cfg: &GridConfig, count: usize, max_pixels: Option<u64>) -> anyhow::Result<()> {
    let Some(limit) = max_pixels else {
        return Ok(());
    };
    let size = cfg.canvas_size(count)?;
    if size.area() > limit {
        anyhow::bail!(
            "canvas {}x{} ({} px) exceeds --max-pixels {}",
            size.w,
            size.h,
            size.area(),
            limit
        );
    }
    Ok(())
}

/// Canonical output file name: non-empty, ending in a supported image extension.
fn normalize_output_name(name: &str) -> Result<String, MissingOutputName> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MissingOutputName);
    }
    let lower = name.to_ascii_lowercase();
    if [".png", ".jpg", ".jpeg"].iter().any(|ext| lower.ends_with(ext)) {
        Ok(name.to_string())
    } else {
        Ok(format!("{}.png", name))
    }
}

fn layout_stem(name: &str) -> Result<String, MissingOutputName> {
    let file = normalize_output_name(name)?;
    Ok(Path::new(&file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file.as_str())
        .to_string())
}

fn parse_hex_color(s: &str) -> Result<[u8; 3], String> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("expected RRGGBB, got {:?}", s));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("bad color {:?}: {}", s, e))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

fn gather_inputs(cli: &GridArgs, show_progress: bool) -> anyhow::Result<Vec<InputImage>> {
    let paths = gather_paths(&cli.inputs, &cli.include, &cli.exclude)?;
    let paths = apply_order(paths, &cli.order)?;
    if paths.is_empty() {
        anyhow::bail!("no input images found");
    }
    load_images_with_progress(&paths, show_progress)
}

/// Picks inputs by 1-based position. Positions may repeat; an empty order keeps everything.
fn apply_order(paths: Vec<PathBuf>, order: &[usize]) -> anyhow::Result<Vec<PathBuf>> {
    if order.is_empty() {
        return Ok(paths);
    }
    order
        .iter()
        .map(|&pos| {
            pos.checked_sub(1)
                .and_then(|i| paths.get(i))
                .cloned()
                .with_context(|| format!("--order position {} is out of range 1..={}", pos, paths.len()))
        })
        .collect()
}

fn gather_paths(
    inputs: &[PathBuf],
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    // Build glob matchers
    let mut inc_set = None;
    if !include.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in include {
            b.add(Glob::new(pat)?);
        }
        inc_set = Some(b.build()?);
    }
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }
    let mut list: Vec<PathBuf> = Vec::new();
    for path in inputs {
        if path.is_file() {
            if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
                list.push(path.to_path_buf());
            }
        } else if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .map(|e| e.into_path())
                .filter(|p| {
                    p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p)
                })
                .collect();
            found.sort();
            list.extend(found);
        } else {
            anyhow::bail!("input not found: {}", path.display());
        }
    }
    Ok(list)
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg")
    )
}

fn load_images_with_progress(paths: &[PathBuf], progress: bool) -> anyhow::Result<Vec<InputImage>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        // a skipped image would shift every later cell, so decoding failures abort
        let img = load_image(p).with_context(|| format!("decode {}", p.display()))?;
        if img.width() == 0 || img.height() == 0 {
            warn!(?p, "image has no pixels");
        }
        let key = p.to_string_lossy().replace('\\', "/");
        list.push(InputImage::new(key, img));
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_image(p: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct YamlConfig {
    cell_width: Option<u32>,
    cell_height: Option<u32>,
    cell_padding: Option<i32>,
    rows: Option<u32>,
    row_padding: Option<i32>,
    outer_vertical_padding: Option<i32>,
    trim: Option<bool>,
    trim_threshold: Option<u8>,
    background: Option<String>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_grid_config(self, mut cfg: GridConfig) -> anyhow::Result<GridConfig> {
        if let Some(v) = self.cell_width {
            cfg.cell_width = v;
        }
        if let Some(v) = self.cell_height {
            cfg.cell_height = v;
        }
        if let Some(v) = self.cell_padding {
            cfg.cell_padding = v;
        }
        if let Some(v) = self.rows {
            cfg.rows = v;
        }
        if let Some(v) = self.row_padding {
            cfg.row_padding = v;
        }
        if let Some(v) = self.outer_vertical_padding {
            cfg.outer_vertical_padding = v;
        }
        if let Some(v) = self.trim {
            cfg.trim = v;
        }
        if let Some(v) = self.trim_threshold {
            cfg.trim_threshold = v;
        }
        if let Some(v) = self.background {
            cfg.background = parse_hex_color(&v).map_err(anyhow::Error::msg)?;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_gets_png_suffix() {
        assert_eq!(normalize_output_name("logo_grid").unwrap(), "logo_grid.png");
        assert_eq!(normalize_output_name(" sponsors ").unwrap(), "sponsors.png");
        assert_eq!(normalize_output_name("grid.PNG").unwrap(), "grid.PNG");
        assert_eq!(normalize_output_name("grid.jpeg").unwrap(), "grid.jpeg");
        assert_eq!(normalize_output_name("grid.webp").unwrap(), "grid.webp.png");
    }

    #[test]
    fn empty_output_name_is_its_own_error() {
        assert!(normalize_output_name("").is_err());
        assert!(normalize_output_name("   ").is_err());
        assert_eq!(layout_stem("grid.png").unwrap(), "grid");
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("ffffff").unwrap(), [255, 255, 255]);
        assert_eq!(parse_hex_color("#0a141e").unwrap(), [10, 20, 30]);
        assert!(parse_hex_color("fff").is_err());
        assert!(parse_hex_color("gggggg").is_err());
    }

    #[test]
    fn order_picks_positions() {
        let paths: Vec<PathBuf> = ["a.png", "b.png", "c.png"].iter().map(PathBuf::from).collect();
        let out = apply_order(paths.clone(), &[3, 1, 1]).unwrap();
        assert_eq!(out, vec![paths[2].clone(), paths[0].clone(), paths[0].clone()]);
        assert_eq!(apply_order(paths.clone(), &[]).unwrap(), paths);
        assert!(apply_order(paths.clone(), &[0]).is_err());
        assert!(apply_order(paths, &[4]).is_err());
    }

    #[test]
    fn yaml_overrides_flags() {
        let y: YamlConfig =
            serde_yaml::from_str("rows: 3\nrow_padding: -20\nbackground: '000000'\n").unwrap();
        let cfg = y.into_grid_config(GridConfig::default()).unwrap();
        assert_eq!(cfg.rows, 3);
        assert_eq!(cfg.row_padding, -20);
        assert_eq!(cfg.background, [0, 0, 0]);
        assert_eq!(cfg.cell_width, 450);
    }

    #[test]
    fn canvas_budget() {
        let cfg = GridConfig::default();
        assert!(check_canvas_budget(&cfg, 4, None).is_ok());
        assert!(check_canvas_budget(&cfg, 4, Some(1050 * 550)).is_ok());
        assert!(check_canvas_budget(&cfg, 4, Some(1000)).is_err());
    }

    #[test]
    fn directories_expand_sorted_and_files_keep_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.jpg", "notes.txt", "c.jpeg"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let found = gather_paths(&[dir.path().to_path_buf()], &[], &[]).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["a.jpg", "b.png", "c.jpeg"]);

        let explicit = vec![dir.path().join("c.jpeg"), dir.path().join("a.jpg")];
        assert_eq!(gather_paths(&explicit, &[], &[]).unwrap(), explicit);

        let filtered = gather_paths(&[dir.path().to_path_buf()], &[], &["**/b.png".into()]).unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn compose_writes_a_png() {
        let dir = tempfile::tempdir().unwrap();
        let logo = image::RgbaImage::from_pixel(20, 10, image::Rgba([0, 0, 0, 255]));
        let input = dir.path().join("logo.png");
        logo.save(&input).unwrap();

        let args = GridArgs::try_parse_from([
            "compose",
            input.to_str().unwrap(),
            "--out-dir",
            dir.path().to_str().unwrap(),
            "--name",
            "sponsors",
            "--rows",
            "1",
        ])
        .unwrap();
        run_compose(&args, false).unwrap();
        let out = image::open(dir.path().join("sponsors.png")).unwrap();
        assert_eq!((out.width(), out.height()), (550, 300));
    }
}
