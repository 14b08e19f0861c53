// src/main.rs

use std::io;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use csvview::cli::{init_logging, Args};
use csvview::columns::ColumnSchema;
use csvview::config::ViewerConfig;
use csvview::data_loader::{get_loader, DataLoader, TableData};
use csvview::export::export_to_path;
use csvview::filter::FilterKind;
use csvview::loader::{read_table, Loader};
use csvview::tui_app::TuiApp;
use csvview::virtual_table::VirtualTable;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args)?;
    let config = ViewerConfig::from_args(&args);

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let parser: Arc<dyn DataLoader> = Arc::from(get_loader(config.format, Some(config.delimiter)));

    let data = match &config.file {
        Some(path) => runtime
            .block_on(read_table(path, parser.as_ref()))
            .with_context(|| format!("could not open {}", path.display()))?,
        None => TableData::default(),
    };

    let mut view = if config.all_columns {
        VirtualTable::from_headers(data, config.row_cap)
    } else {
        VirtualTable::new(data, ColumnSchema::standard(), config.row_cap)
    };
    for column in &config.numeric_columns {
        view.set_filter_kind(column, FilterKind::GreaterThan)?;
    }
    for (column, value) in &config.filters {
        view.set_filter(column, value)?;
    }

    if let Some(out) = &config.export {
        let written = export_to_path(&view, out)?;
        info!(rows = written, path = %out.display(), "export finished");
        return Ok(());
    }

    let loader = Loader::new(runtime.handle().clone(), parser);
    let mut app = TuiApp::new(view, loader, &config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    terminal.hide_cursor()?;

    let result = app.main_loop(&mut terminal);

    terminal.show_cursor()?;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result?;
    Ok(())
}
