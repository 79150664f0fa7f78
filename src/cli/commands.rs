//! Command dispatch: wires CLI arguments to the header service

use std::io::{self, Write};

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::services::{HeaderService, Section};
use crate::cli::args::{Cli, Commands, ConfigCommands, LayoutArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path};
use crate::domain::{ColumnId, NoopLifecycle, RecordingLifecycle};
use crate::infrastructure::ServiceContainer;
use crate::tree_traits::{SectionView, TreeNodeConvert};

pub fn execute_command(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Tree { layout }) => cmd_tree(container, layout),
        Some(Commands::Rebuild { layout }) => cmd_rebuild(container, layout),
        Some(Commands::Config { command }) => cmd_config(container, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see --help".to_string(),
        )),
    }
}

fn load_service(container: &ServiceContainer, layout: &LayoutArgs) -> CliResult<HeaderService> {
    let tree = container.load_tree(layout.file.as_deref(), !layout.no_balance)?;
    debug!(
        columns = tree.columns().len(),
        depth = tree.depth(),
        "definitions loaded"
    );
    Ok(container.header_service(tree))
}

fn apply_layout(service: &mut HeaderService, layout: &LayoutArgs) -> CliResult<()> {
    if let Some(id) = layout.hide.iter().find(|id| layout.show.contains(id)) {
        return Err(CliError::InvalidArgs(format!(
            "column '{}' is both hidden and shown",
            id
        )));
    }
    let state = service.state_mut();
    for id in &layout.hide {
        state.set_visible(&ColumnId::new(id.as_str()), false)?;
    }
    for id in &layout.show {
        state.set_visible(&ColumnId::new(id.as_str()), true)?;
    }
    for (id, pinned) in &layout.pin {
        state.set_pinned(&ColumnId::new(id.as_str()), *pinned)?;
    }
    for (id, index) in &layout.moves {
        state.move_column(&ColumnId::new(id.as_str()), *index)?;
    }
    Ok(())
}

fn render(out: &mut impl Write, service: &HeaderService, container: &ServiceContainer) -> CliResult<()> {
    let display = &container.settings.display;
    for section in Section::DISPLAY_ORDER {
        if service.roots(section).is_empty() {
            continue;
        }
        output::info(out, &SectionView::new(service, section, display).to_tree_string())?;
    }
    output::header(
        out,
        &format!("{} header row(s)", service.header_row_count()),
    )?;
    Ok(())
}

#[instrument(skip(container))]
fn cmd_tree(container: &ServiceContainer, layout: &LayoutArgs) -> CliResult<()> {
    let mut service = load_service(container, layout)?;
    apply_layout(&mut service, layout)?;
    service.refresh(&mut NoopLifecycle)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render(&mut out, &service, container)
}

#[instrument(skip(container))]
fn cmd_rebuild(container: &ServiceContainer, layout: &LayoutArgs) -> CliResult<()> {
    let mut service = load_service(container, layout)?;
    let mut lifecycle = RecordingLifecycle::new();
    let initial = service.refresh(&mut lifecycle)?;
    debug!(created = initial.created.len(), "initial build");
    if !layout.has_changes() {
        debug!("no layout changes, every group is reused");
    }

    apply_layout(&mut service, layout)?;
    let stats = service.refresh(&mut lifecycle)?;
    debug!(
        created = lifecycle.created.len(),
        destroyed = lifecycle.destroyed.len(),
        "lifecycle totals"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    output::header(
        &mut out,
        &format!(
            "rebuild: {} created, {} reused, {} destroyed",
            stats.created.len(),
            stats.reused.len(),
            stats.destroyed.len()
        ),
    )?;
    for id in &stats.created {
        output::created(&mut out, id)?;
    }
    for id in &stats.reused {
        output::reused(&mut out, id)?;
    }
    for id in &stats.destroyed {
        output::destroyed(&mut out, id)?;
    }
    render(&mut out, &service, container)
}

fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match command {
        ConfigCommands::Show => {
            let toml = container.settings.to_toml()?;
            output::info(&mut out, toml.trim_end())?;
        }
        ConfigCommands::Path => {
            let global = global_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(unavailable)".to_string());
            output::info(&mut out, &format!("global: {}", global))?;
            output::info(
                &mut out,
                &format!("local:  {}", local_config_path().display()),
            )?;
        }
    }
    Ok(())
}
