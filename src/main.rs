//! `tdv`: print a filtered, projected table of a JSON, YAML or CSV document

use clap::{Parser, ValueEnum};
use comfy_table::{Cell, Color, ContentArrangement, Table};
use std::error::Error as StdError;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tdviewer::config::ViewerConfig;
use tdviewer::core::value::value_to_string;
use tdviewer::parsers::{default_plugins, detect_parser, find_parser, ParseStatus};
use tdviewer::query::{Query, SortDirection};
use tdviewer::store::{PresetStore, ValueColorStore};
use tdviewer::table::{
    collect_column_statistics, materialize_rows, row_to_object, rows_to_csv,
    should_expand_columns, TablePage, TableView,
};
use tdviewer::tree::{NodePath, PathResolver};
use tdviewer::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "tdv", version, about = "Inspect semi-structured data as a table")]
struct Args {
    /// Input file; `-` reads standard input
    file: PathBuf,

    /// Configuration file (YAML or TOML)
    #[arg(long, env = "TDV_CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Query file (YAML or JSON) with field queries, sort and paging
    #[arg(long)]
    query: Option<PathBuf>,

    /// Input format name (JSON, YAML, CSV); detected when omitted
    #[arg(long)]
    parser: Option<String>,

    /// Apply the saved preset with this name
    #[arg(long)]
    preset_name: Option<String>,

    /// Preset store file, overrides the configured one
    #[arg(long)]
    presets: Option<PathBuf>,

    #[arg(long)]
    limit: Option<usize>,

    #[arg(long)]
    offset: Option<usize>,

    /// Sort by this field
    #[arg(long)]
    sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    desc: bool,

    /// Node whose children become rows
    #[arg(long)]
    path: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Print column statistics of the filtered rows instead of the page
    #[arg(long)]
    stats: bool,
}

fn init_logging(config: &ViewerConfig) {
    let env = env_logger::Env::default().default_filter_or(config.logging.level.as_str());
    let mut builder = env_logger::Builder::from_env(env);
    if config.logging.format == "json" {
        builder.format(|buf, record| {
            let line = serde_json::json!({
                "level": record.level().to_string(),
                "target": record.target(),
                "message": record.args().to_string(),
            });
            writeln!(buf, "{}", line)
        });
    }
    let _ = builder.try_init();
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    Ok(fs::read_to_string(path)?)
}

fn load_query(path: &Path, default_limit: usize) -> Result<Query> {
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(Query::new().with_limit(default_limit));
    }
    let query: Query = serde_yaml::from_str(&text).map_err(|e| {
        Error::InvalidInput(format!("Invalid query file {}: {}", path.display(), e))
    })?;
    Ok(query)
}

/// `#rrggbb` as a terminal color
fn hex_color(text: &str) -> Option<Color> {
    let hex = text.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

fn render_table(page: &TablePage, colors: &ValueColorStore, offset: usize) -> String {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(page.columns.iter().map(|c| c.header.clone()));

    for row in &page.rows {
        table.add_row(page.columns.iter().map(|column| {
            let text = row.get(&column.field).map(value_to_string).unwrap_or_default();
            let mut cell = Cell::new(&text);
            if let Some((bg, fg)) = colors.style_for(&column.field, &text) {
                if let Some(color) = hex_color(&bg) {
                    cell = cell.bg(color);
                }
                if let Some(color) = hex_color(&fg) {
                    cell = cell.fg(color);
                }
            }
            cell
        }));
    }

    let first = if page.rows.is_empty() { 0 } else { offset + 1 };
    format!(
        "{}\nrows {}-{} of {}",
        table,
        first,
        offset + page.rows.len(),
        page.total
    )
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => ViewerConfig::load_with_precedence(Some(path))?,
        None => tdviewer::config::loader::auto_load()?,
    };
    init_logging(&config);

    let text = read_input(&args.file)?;
    let plugins = default_plugins();
    let plugin = match &args.parser {
        Some(name) => find_parser(&plugins, name)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown parser: {}", name)))?,
        None => detect_parser(&plugins, &text)
            .ok_or_else(|| Error::InvalidInput("No parser available".to_string()))?,
    };
    log::debug!("parsing {} as {}", args.file.display(), plugin.name());

    let parsed = plugin.parse(&text);
    match parsed.status {
        ParseStatus::Error => return Err(Error::Parse(parsed.message)),
        ParseStatus::Warn => log::warn!("{}", parsed.message),
        ParseStatus::Success => {}
    }
    let root = parsed
        .root()
        .ok_or_else(|| Error::Parse(parsed.message.clone()))?;

    let node = match &args.path {
        Some(path) => PathResolver::new().resolve(&root, None, &NodePath::from(path.as_str())),
        None => root,
    };
    log::debug!("selected node {}", node.path_as_string());

    let expand = should_expand_columns(
        &node,
        config.table.expand_threshold,
        config.table.max_expand_columns,
    );
    let rows = materialize_rows(&node, expand);

    let mut query = match &args.query {
        Some(path) => load_query(path, config.table.default_limit)?,
        None => Query::new().with_limit(config.table.default_limit),
    };

    let mut view = TableView::new(config.build_processor());

    if let Some(name) = &args.preset_name {
        let store_path = args
            .presets
            .clone()
            .or_else(|| config.presets.storage_path.clone())
            .ok_or_else(|| Error::ConfigurationError("No preset store configured".to_string()))?;
        let store = PresetStore::load_from_file(&store_path)?;
        let preset = store
            .find_by_name(name)
            .ok_or_else(|| Error::PresetNotFound(name.clone()))?;

        view.apply_preset_columns(&preset.columns);
        for (field, fq) in &preset.field_queries {
            query
                .field_queries
                .entry(field.clone())
                .or_insert_with(|| fq.clone());
        }
        if query.has_identity_js_query() {
            query.js_query = preset.js_query.clone();
        }
        if query.extended_fields.is_empty() {
            query.extended_fields = preset.extended_fields.clone();
        }
    }

    if let Some(limit) = args.limit {
        query.limit = limit;
    }
    if let Some(offset) = args.offset {
        query.offset = offset;
    }
    if let Some(field) = &args.sort {
        let dir = if args.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        query = query.with_sort(field.clone(), dir);
    }

    let mut colors = match &config.presets.colors_path {
        Some(path) => ValueColorStore::load_from_file(path)?,
        None => ValueColorStore::new(),
    };
    for (field, fq) in &query.field_queries {
        if let Some(field_colors) = fq.value_colors.clone() {
            colors.set_field_colors(field, Some(field_colors));
        }
    }

    view = view.with_query(query);
    let page = view.refresh(&rows);
    let mut stdout = io::stdout().lock();

    if args.stats {
        let data = view.last_result().map(|r| r.data.as_slice()).unwrap_or(&[]);
        let fields: Vec<String> = page.columns.iter().map(|c| c.field.clone()).collect();
        let stats = collect_column_statistics(data, &fields);
        writeln!(stdout, "{}", serde_json::to_string_pretty(&stats)?)?;
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => {
            let rendered = render_table(&page, &colors, view.query().offset);
            writeln!(stdout, "{}", rendered)?;
        }
        OutputFormat::Json => {
            let objects: Vec<serde_json::Value> = page
                .rows
                .iter()
                .map(|row| row_to_object(row, &page.columns, true))
                .collect();
            writeln!(stdout, "{}", serde_json::to_string_pretty(&objects)?)?;
        }
        OutputFormat::Csv => {
            let columns: Vec<_> = page.columns.iter().collect();
            write!(stdout, "{}", rows_to_csv(&page.rows, &columns)?)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let mut message = e.to_string();
            let mut source = e.source();
            while let Some(cause) = source {
                message.push_str(&format!(": {}", cause));
                source = cause.source();
            }
            log::error!("{}", message);
            eprintln!("tdv: {}", message);
            ExitCode::FAILURE
        }
    }
}
