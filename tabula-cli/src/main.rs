use std::fs::{self, File};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Deserialize;
use serde_json::Value;
use simplelog::{Config, LevelFilter, WriteLogger};

use tabula::config::{DataSource, GroupBy, PagingMode};
use tabula::model::{Column, Path, RowId};
use tabula::paging::PageChange;
use tabula::sort::{Direction, SortEntry, SortSpec};
use tabula::{StateStore, Table, TableConfig};

mod paths;
mod view;

use view::TextMeasure;

#[derive(Parser, Debug)]
#[command(author, version, about = "Render JSON records through the tabula table engine")]
struct Args {
    /// JSON file with `columns` and `rows`
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Identifier the table state is persisted under
    #[arg(short, long, default_value = "default")]
    table: String,

    /// Dotted path of the row ID
    #[arg(long, default_value = "id")]
    id_field: String,

    /// Sort key as FIELD or FIELD:desc; repeat for secondary keys
    #[arg(short, long)]
    sort: Vec<String>,

    /// Group rows by the value at this path
    #[arg(short, long)]
    group_by: Option<String>,

    /// Filter as FIELD=QUERY; repeatable
    #[arg(short, long)]
    filter: Vec<String>,

    /// Page to show
    #[arg(short, long)]
    page: Option<u32>,

    /// Rows per page
    #[arg(short = 'n', long)]
    page_size: Option<usize>,

    /// Treat the rows as the full data set and page them locally
    #[arg(long)]
    client: bool,

    /// Use cursor paging with these before/after tokens
    #[arg(long, num_args = 2, value_names = ["BEFORE", "AFTER"])]
    cursor: Option<Vec<String>>,

    /// Select rows by render index; repeatable
    #[arg(long)]
    select: Vec<usize>,

    /// Available width in terminal columns
    #[arg(short, long, default_value_t = 100.0)]
    width: f64,

    /// Print emitted events as JSON lines
    #[arg(long)]
    events: bool,

    /// State file (defaults to the platform data directory)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Forget persisted state for this table before running
    #[arg(long)]
    reset: bool,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Deserialize)]
struct Input {
    columns: Vec<ColumnSpec>,
    rows: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColumnSpec {
    field: String,
    title: Option<String>,
    width: Option<f64>,
    min_width: Option<f64>,
    grow: Option<f64>,
    width_group: Option<String>,
    sorter: Option<String>,
    #[serde(default = "default_true")]
    sortable: bool,
    #[serde(default = "default_true")]
    visible: bool,
}

fn default_true() -> bool {
    true
}

impl From<ColumnSpec> for Column {
    fn from(spec: ColumnSpec) -> Self {
        let mut column = Column::new(spec.field);
        column.title = spec.title;
        column.width = spec.width;
        column.min_width = spec.min_width;
        column.width_grow = spec.grow;
        column.width_group = spec.width_group;
        column.sorter = spec.sorter;
        column.sortable = spec.sortable;
        column.visible = spec.visible;
        column
    }
}

fn parse_sort(keys: &[String]) -> SortSpec {
    keys.iter()
        .map(|key| match key.rsplit_once(':') {
            Some((field, dir)) if dir.eq_ignore_ascii_case("desc") => SortEntry::desc(field),
            Some((field, dir)) if dir.eq_ignore_ascii_case("asc") => SortEntry::asc(field),
            _ => SortEntry::new(key.as_str(), Direction::Asc),
        })
        .collect::<Vec<_>>()
        .into()
}

fn init_logging(level: LevelFilter) -> Result<()> {
    let path = paths::log_file().unwrap_or_else(|| PathBuf::from("tabula.log"));
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    WriteLogger::init(level, Config::default(), file)?;
    Ok(())
}

fn load_store(path: Option<&PathBuf>) -> Result<StateStore> {
    let Some(path) = path.filter(|p| p.exists()) else {
        return Ok(StateStore::new());
    };
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    match StateStore::restore(&bytes) {
        Ok(store) => Ok(store),
        Err(e) => {
            log::warn!("Discarding unreadable state {}: {}", path.display(), e);
            Ok(StateStore::new())
        }
    }
}

fn save_store(store: &StateStore, path: Option<&PathBuf>) -> Result<()> {
    let Some(path) = path else {
        log::warn!("No data directory; state not saved");
        return Ok(());
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, store.snapshot()?).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level)?;

    let input: Input = serde_json::from_slice(
        &fs::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?,
    )
    .context("parsing input")?;
    if input.columns.is_empty() {
        bail!("input declares no columns");
    }

    let state_path = args.state.clone().or_else(paths::state_file);
    let store = load_store(state_path.as_ref())?;
    if args.reset {
        store.remove(&args.table);
    }

    let mut config = TableConfig::new(&args.table).with_id_field(&args.id_field);
    if let Some(size) = args.page_size {
        config = config.with_page_size(size);
    }
    if args.client {
        config = config.with_data_source(DataSource::Client);
    }
    if args.cursor.is_some() {
        config = config.with_paging_mode(PagingMode::Cursor);
    }
    if let Some(group_by) = &args.group_by {
        config = config.with_group_by(GroupBy::field(Path::parse(group_by)?));
    }

    let mut table = Table::mount(config, store)?;
    table.set_columns(input.columns.into_iter().map(Column::from).collect());

    if !args.sort.is_empty() {
        table.set_sorting(parse_sort(&args.sort));
    }
    if let Some(size) = args.page_size {
        table.on_page_change(PageChange::size(size));
    }
    if let Some(page) = args.page {
        table.on_page_change(PageChange::page(page));
    }

    let total = input.rows.len();
    let applied = table.set_rows(input.rows);
    if !args.client {
        table.set_total_elements(total);
    }
    if let Some(tokens) = &args.cursor {
        let token = |i: usize| tokens.get(i).filter(|t| !t.is_empty()).cloned();
        table.set_cursor(token(0), token(1));
    }
    if !applied.dropped_selection.is_empty() {
        log::info!("Dropped stale selection: {:?}", applied.dropped_selection);
    }

    for filter in &args.filter {
        let Some((field, query)) = filter.split_once('=') else {
            bail!("filter '{}' is not FIELD=QUERY", filter);
        };
        table.set_filter(field, query);
    }
    if !args.select.is_empty() {
        let ids: Vec<RowId> = args
            .select
            .iter()
            .filter_map(|&i| table.row_at(i).and_then(|row| row.id.clone()))
            .collect();
        table.set_selection(&ids);
    }

    table.set_viewport_width(args.width, Instant::now());
    let measure = TextMeasure::new(table.columns(), table.rows());
    if !table.update_layout(&measure) {
        log::warn!("Layout deferred for width {}", args.width);
    }

    for line in view::render(&table) {
        println!("{line}");
    }
    let info = table.page_info();
    match info.total_pages {
        Some(pages) => println!("page {}/{} ({} rows)", info.page, pages, info.total_elements),
        None => println!(
            "page {}{}",
            info.page,
            if info.is_last_page { " (last)" } else { "" }
        ),
    }

    if args.events {
        for event in table.drain_events() {
            println!("{}", serde_json::to_string(&event)?);
        }
    }

    let store = table.unmount();
    save_store(&store, state_path.as_ref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sort_keys() {
        let spec = parse_sort(&["team".to_string(), "age:DESC".to_string()]);
        assert_eq!(spec.order_of("team"), Some((Direction::Asc, 1)));
        assert_eq!(spec.order_of("age"), Some((Direction::Desc, 2)));
    }

    #[test]
    fn test_column_spec_defaults() {
        let spec: ColumnSpec =
            serde_json::from_str(r#"{ "field": "name", "minWidth": 12 }"#).unwrap();
        let column = Column::from(spec);
        assert!(column.sortable);
        assert!(column.visible);
        assert_eq!(column.min_width, Some(12.0));
    }
}
