use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use gridboard_core::geometry::CellSize;
use gridboard_layout::{EngineConfig, LayoutEngine, LoadOutcome, SizePreset, WidgetId, WidgetKind};
use serde::Serialize;
use serde_json::Value;

use crate::error::{CliError, Result};
use crate::profile::list_profile_names;
use crate::render::{describe_conflict, describe_strategy, render_legend, render_map};
use crate::store::{StoredDashboard, read_existing, write_document};

fn parse_kind(raw: &str) -> std::result::Result<WidgetKind, String> {
    WidgetKind::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = WidgetKind::ALL.iter().map(|kind| kind.as_str()).collect();
        format!("unknown widget type {raw:?} (expected one of {})", known.join(", "))
    })
}

fn parse_preset(raw: &str) -> std::result::Result<SizePreset, String> {
    SizePreset::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = SizePreset::ALL.iter().map(|preset| preset.as_str()).collect();
        format!("unknown size preset {raw:?} (expected one of {})", known.join(", "))
    })
}

fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

#[derive(Debug, Clone, Args)]
pub struct DocArgs {
    /// Dashboard document (JSON).
    pub path: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct WidgetArgs {
    /// Dashboard document (JSON).
    pub path: PathBuf,
    /// Widget id.
    pub id: String,
}

#[derive(Debug, Clone, Args)]
pub struct InitArgs {
    pub path: PathBuf,
    /// Overwrite an existing document.
    #[arg(long)]
    pub force: bool,
    /// Start with no widgets instead of the built-in layout.
    #[arg(long)]
    pub empty: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ShowArgs {
    pub path: PathBuf,
    /// Emit a JSON summary instead of the text map.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    pub path: PathBuf,
    #[arg(value_parser = parse_kind)]
    pub kind: WidgetKind,
    /// Size preset; defaults to the type's own.
    #[arg(long, value_parser = parse_preset)]
    pub preset: Option<SizePreset>,
}

#[derive(Debug, Clone, Args)]
pub struct PresetArgs {
    pub path: PathBuf,
    pub id: String,
    #[arg(value_parser = parse_preset)]
    pub preset: SizePreset,
}

#[derive(Debug, Clone, Args)]
pub struct RescaleArgs {
    pub path: PathBuf,
    /// New cell size in pixels.
    pub cell_size: u16,
}

#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    /// Dashboard to replace; created if missing.
    pub path: PathBuf,
    /// Exported document or bare widget array to import.
    pub source: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    pub path: PathBuf,
    /// Write here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShowSummary<'a> {
    source: &'a LoadOutcome,
    cols: u16,
    rows: u16,
    cell_size: u16,
    mobile_layout: bool,
    widgets: &'a [gridboard_layout::Widget],
    conflicts: Vec<gridboard_layout::LayoutConflict>,
}

pub fn run_init(args: InitArgs, config: EngineConfig, out: &mut dyn Write) -> Result<()> {
    if args.path.exists() && !args.force {
        return Err(CliError::AlreadyExists { path: args.path });
    }
    let engine = if args.empty {
        LayoutEngine::new(config)
    } else {
        LayoutEngine::with_default_layout(config)
    };
    write_document(&args.path, &engine, None)?;
    let grid = engine.grid();
    writeln!(
        out,
        "wrote {}: {} widgets on a {}x{} grid",
        args.path.display(),
        engine.widgets().len(),
        grid.cols,
        grid.rows
    )?;
    Ok(())
}

/// Lenient: an unusable document is reported and the built-in layout is shown.
pub fn run_show(args: ShowArgs, config: EngineConfig, out: &mut dyn Write) -> Result<()> {
    let content = read_existing(&args.path)?;
    let saved_mobile = serde_json::from_str::<Value>(&content)
        .ok()
        .and_then(|value| value.get("isMobileLayout").and_then(Value::as_bool));
    let mobile = saved_mobile.unwrap_or(config.mobile_layout);
    let mut engine = LayoutEngine::new(config.mobile_layout(mobile));
    let outcome = engine.load_json(&content);
    let grid = engine.grid();

    if args.json {
        let summary = ShowSummary {
            source: &outcome,
            cols: grid.cols,
            rows: grid.rows,
            cell_size: engine.cell_size().px(),
            mobile_layout: engine.is_mobile_layout(),
            widgets: engine.widgets(),
            conflicts: engine.conflicts(),
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
        return Ok(());
    }

    if let LoadOutcome::Defaulted { reason } = &outcome {
        writeln!(out, "warning: {reason}; showing the built-in layout")?;
    }
    let mode = if engine.is_mobile_layout() { "mobile" } else { "desktop" };
    writeln!(
        out,
        "{}x{} grid at {}px ({mode})",
        grid.cols,
        grid.rows,
        engine.cell_size().px()
    )?;
    write!(out, "{}", render_map(engine.widgets(), grid))?;
    write!(out, "{}", render_legend(engine.widgets(), None))?;
    let conflicts = engine.conflicts();
    if conflicts.is_empty() {
        writeln!(out, "no conflicts")?;
    } else {
        writeln!(out, "conflicts:")?;
        for conflict in &conflicts {
            writeln!(out, "  {}", describe_conflict(conflict))?;
        }
    }
    Ok(())
}

pub fn run_sort(args: DocArgs, config: EngineConfig, out: &mut dyn Write) -> Result<()> {
    let mut stored = StoredDashboard::open(&args.path, config)?;
    stored.engine.auto_sort()?;
    stored.save()?;
    writeln!(out, "sorted {} widgets", stored.engine.widgets().len())?;
    Ok(())
}

pub fn run_add(args: AddArgs, config: EngineConfig, out: &mut dyn Write) -> Result<()> {
    let mut stored = StoredDashboard::open(&args.path, config)?;
    let preset = args.preset.unwrap_or(args.kind.default_preset());
    let id = stored.engine.add_widget_with_preset(args.kind, preset, now_ms())?;
    stored.save()?;
    writeln!(out, "added {id}")?;
    Ok(())
}

pub fn run_remove(args: WidgetArgs, config: EngineConfig, out: &mut dyn Write) -> Result<()> {
    let mut stored = StoredDashboard::open(&args.path, config)?;
    let removed = stored.engine.remove_widget(&WidgetId::new(args.id))?;
    stored.save()?;
    writeln!(out, "removed {}", removed.id)?;
    Ok(())
}

pub fn run_preset(args: PresetArgs, config: EngineConfig, out: &mut dyn Write) -> Result<()> {
    let mut stored = StoredDashboard::open(&args.path, config)?;
    let id = WidgetId::new(args.id);
    let strategy = stored.engine.apply_preset(&id, args.preset)?;
    stored.save()?;
    writeln!(out, "{id} resized to {}: {}", args.preset, describe_strategy(&strategy))?;
    Ok(())
}

pub fn run_rescale(args: RescaleArgs, config: EngineConfig, out: &mut dyn Write) -> Result<()> {
    let cell = CellSize::new(args.cell_size)
        .ok_or_else(|| CliError::invalid("cell size must be at least 1px"))?;
    let mut stored = StoredDashboard::open(&args.path, config)?;
    let warning = stored.engine.set_cell_size(cell);
    stored.save()?;
    let grid = stored.engine.grid();
    writeln!(out, "rescaled to {}px: {}x{} grid", cell.px(), grid.cols, grid.rows)?;
    if let Some(warning) = warning {
        writeln!(out, "warning: {warning}; run `gridboard sort` once there is room")?;
    }
    Ok(())
}

pub fn run_minimize(args: WidgetArgs, config: EngineConfig, out: &mut dyn Write) -> Result<()> {
    let mut stored = StoredDashboard::open(&args.path, config)?;
    let id = WidgetId::new(args.id);
    if stored.engine.minimize(&id)? {
        stored.save()?;
        writeln!(out, "minimized {id}")?;
    } else {
        writeln!(out, "{id} is already minimized")?;
    }
    Ok(())
}

pub fn run_restore(args: WidgetArgs, config: EngineConfig, out: &mut dyn Write) -> Result<()> {
    let mut stored = StoredDashboard::open(&args.path, config)?;
    let id = WidgetId::new(args.id);
    if stored.engine.restore(&id)? {
        stored.save()?;
        writeln!(out, "restored {id}")?;
    } else {
        writeln!(out, "{id} is not minimized")?;
    }
    Ok(())
}

/// Maximize is view state only; the document is not rewritten.
pub fn run_maximize(args: WidgetArgs, config: EngineConfig, out: &mut dyn Write) -> Result<()> {
    let mut stored = StoredDashboard::open(&args.path, config)?;
    let id = WidgetId::new(args.id);
    stored.engine.maximize(&id)?;
    let grid = stored.engine.grid();
    write!(out, "{}", render_legend(stored.engine.widgets(), Some(id.as_str())))?;
    writeln!(out, "{id} fills the {}x{} grid while maximized", grid.cols, grid.rows)?;
    Ok(())
}

pub fn run_import(args: ImportArgs, config: EngineConfig, out: &mut dyn Write) -> Result<()> {
    let payload = read_existing(&args.source)?;
    let mut stored = StoredDashboard::open_or_empty(&args.path, config)?;
    let (report, shared) = stored.engine.import_json(&payload, now_ms())?;
    stored.shared = shared;
    stored.save()?;

    writeln!(
        out,
        "imported {} widgets ({} dropped{})",
        report.accepted,
        report.dropped,
        if report.sorted { ", re-packed to fit" } else { "" }
    )?;
    for warning in &report.warnings {
        writeln!(out, "  {}", serde_json::to_string(warning)?)?;
    }
    Ok(())
}

pub fn run_export(args: ExportArgs, config: EngineConfig, out: &mut dyn Write) -> Result<()> {
    let stored = StoredDashboard::open(&args.path, config)?;
    match args.output {
        Some(path) => {
            write_document(&path, &stored.engine, stored.shared.clone())?;
            writeln!(out, "exported {} widgets to {}", stored.engine.widgets().len(), path.display())?;
        }
        None => writeln!(out, "{}", stored.engine.export_json(stored.shared.clone())?)?,
    }
    Ok(())
}

pub fn print_profiles(out: &mut dyn Write) -> Result<()> {
    for name in list_profile_names() {
        writeln!(out, "{name}")?;
    }
    Ok(())
}

pub fn print_presets(config: &EngineConfig, out: &mut dyn Write) -> Result<()> {
    for preset in SizePreset::ALL {
        let target = preset.target_px();
        let (cols, rows) = preset.spans(config.cell_size, (1, 1));
        writeln!(
            out,
            "{:<7} {}x{}px -> {cols}x{rows} cells at {}px",
            preset.as_str(),
            target.width,
            target.height,
            config.cell_size.px()
        )?;
    }
    Ok(())
}
