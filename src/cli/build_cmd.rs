//! Build command: tickets in, OmniPlan package out

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::{EpicMap, PlanBuilder, ProcessIds, Ticket};
use crate::jira::JiraExport;
use crate::omniplan;
use crate::storage::{Config, PlanPackage, TicketFile};

pub struct BuildArgs {
    pub project: String,
    pub input: PathBuf,
    pub epics: Option<PathBuf>,
    pub epic_group: bool,
    pub milestone_done: bool,
    pub out_dir: PathBuf,
    pub stdout: bool,
}

pub fn run(output: &Output, args: BuildArgs) -> Result<()> {
    let config = Config::load()?;
    let options = config.build_options(args.epic_group, args.milestone_done);
    tracing::debug!(?options, input = %args.input.display(), "building plan");

    let (tickets, epics) = load_input(
        &config,
        &args.input,
        args.epics.as_deref(),
        options.group_by_epic,
    )?;

    let ids = ProcessIds::new();
    let plan = PlanBuilder::new(&ids, args.project.clone())
        .options(options)
        .build(&tickets, &epics);

    if args.stdout {
        omniplan::serialize(io::stdout().lock(), &plan.scenario)
            .context("Failed to write plan to stdout")?;
        return Ok(());
    }

    let package = PlanPackage::in_dir(&args.out_dir, &args.project);
    package.write(&plan.scenario)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "package": package.dir().display().to_string(),
            "tickets": tickets.len(),
            "epics": epics.len(),
            "tasks": plan.scenario.tasks.len(),
            "resources": plan.scenario.resources.len(),
            "unresolved": plan.warnings,
        }));
    } else {
        output.success(&format!("Created OmniPlan package: {}", package.dir().display()));
    }

    Ok(())
}

/// Reads tickets and epics, choosing the format by file extension
fn load_input(
    config: &Config,
    input: &Path,
    epics_path: Option<&Path>,
    group_by_epic: bool,
) -> Result<(Vec<Ticket>, EpicMap)> {
    if TicketFile::is_jsonl(input) {
        let tickets = TicketFile::new(input).read_all()?;
        let epics = match epics_path {
            Some(path) => read_epics(path)?,
            None => EpicMap::new(),
        };
        return Ok((tickets, epics));
    }

    let mapping = config.field_mapping(group_by_epic)?;
    let export = JiraExport::from_path(input)?;
    let tickets = export.tickets(&mapping);

    // epics that came back in the same search
    let mut epics = export.epics_for(tickets.iter().map(|t| t.epic_key.as_str()));
    if let Some(path) = epics_path {
        epics.extend(read_epics(path)?);
    }

    Ok((tickets, epics))
}

fn read_epics(path: &Path) -> Result<EpicMap> {
    if TicketFile::is_jsonl(path) {
        return Ok(TicketFile::new(path).read_epics()?);
    }

    Ok(JiraExport::from_path(path)?.into_epic_map())
}
