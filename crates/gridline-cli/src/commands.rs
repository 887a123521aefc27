//! Command handlers. Each returns the text to print on stdout.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use gridline_query::{
    from_query_string, log_create, log_delete, log_export, log_filter, log_update,
    to_query_string, AuditFilter, AuditSink, FileStore, FilterCondition, SavedFilterPatch,
    SavedFilterSet, SortOrder, TableQuery,
};
use serde_json::Value as Json;

use crate::audit_log::FileAuditSink;
use crate::cli::{AuditArgs, Cli, Command, FiltersCommand, OutputFormat, QueryArgs};
use crate::config::Settings;
use crate::output::{render_audit, render_conditions, render_filters, render_page};

const SAVED_FILTER_RESOURCE: &str = "saved_filter";
const AUDIT_LOG_RESOURCE: &str = "audit_log";

/// Resolves settings and runs the selected command.
pub fn run(cli: Cli) -> Result<String> {
    let settings = Settings::resolve(&cli.global)?;
    match cli.command {
        Command::Query(args) => query(&settings, args),
        Command::Filters { command } => filters(&settings, command),
        Command::Encode { conditions } => Ok(format!("{}\n", to_query_string(&conditions))),
        Command::Decode { query, format } => {
            Ok(render_conditions(&from_query_string(&query), format)?)
        }
        Command::Audit(args) => audit(&settings, args),
    }
}

/// Reads a JSON file that must hold an array.
pub fn read_records(path: &Path) -> Result<Vec<Json>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let json: Json = serde_json::from_str(&text)
        .with_context(|| format!("parsing {} as JSON", path.display()))?;
    match json {
        Json::Array(records) => Ok(records),
        other => bail!(
            "{} holds a JSON {}, expected an array of records",
            path.display(),
            json_kind(&other)
        ),
    }
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn open_store(settings: &Settings) -> Result<FileStore> {
    FileStore::open(&settings.store_dir)
        .with_context(|| format!("opening store at {}", settings.store_dir.display()))
}

fn load_saved(settings: &Settings, store: &FileStore) -> SavedFilterSet {
    SavedFilterSet::load(store, settings.engine.storage_key.clone())
}

/// Merges conditions from a query string and `--where` flags, in that order.
fn collect_conditions(filter: Option<&str>, flags: Vec<FilterCondition>) -> Vec<FilterCondition> {
    let mut conditions = filter.map(from_query_string).unwrap_or_default();
    conditions.extend(flags);
    conditions
}

fn query(settings: &Settings, args: QueryArgs) -> Result<String> {
    let settings = settings.clone().with_overrides(args.strict, args.page_size);
    let records = read_records(&args.file)?;

    let mut conditions = Vec::new();
    if let Some(name) = &args.saved {
        let store = open_store(&settings)?;
        let set = load_saved(&settings, &store);
        let saved = set
            .find(name)
            .with_context(|| format!("no saved filter named '{name}'"))?;
        conditions.extend(saved.conditions.iter().cloned());
    }
    conditions.extend(collect_conditions(args.filter.as_deref(), args.conditions));

    let mut table = TableQuery::from_config(&settings.engine)
        .conditions(conditions)
        .search(args.search)
        .page(args.page);
    if let Some(field) = args.sort {
        let order = if args.desc { SortOrder::Desc } else { SortOrder::Asc };
        table = table.sort_by(field).order(order);
    }

    let page = table.run(&records).context("running query")?;
    tracing::debug!(
        file = %args.file.display(),
        matched = page.total_items,
        page = page.current_page,
        "query finished"
    );

    if !table.condition_list().is_empty() || !table.search_text().is_empty() {
        let mut sink = FileAuditSink::new(&settings.store_dir);
        log_filter(
            &mut sink,
            &args.file.display().to_string(),
            &to_query_string(table.condition_list()),
            page.total_items,
            &settings.user,
        );
    }

    Ok(render_page(&page, args.format)?)
}

fn filters(settings: &Settings, command: FiltersCommand) -> Result<String> {
    let store = open_store(settings)?;
    let mut set = load_saved(settings, &store);
    let mut sink = FileAuditSink::new(&settings.store_dir);

    match command {
        FiltersCommand::Save {
            name,
            description,
            conditions,
            filter,
        } => {
            let conditions = collect_conditions(filter.as_deref(), conditions);
            if conditions.is_empty() {
                bail!("nothing to save: pass --where or --filter");
            }

            let before = set.find_by_name(&name).cloned();
            let saved = match &before {
                Some(before) => {
                    let mut patch = SavedFilterPatch::new().conditions(&conditions);
                    if description.is_some() {
                        patch = patch.description(description);
                    }
                    set.update(&before.id, patch)?.clone()
                }
                None => set.save_current(&name, &conditions, description).clone(),
            };
            set.flush(&store).context("writing saved filters")?;

            match before {
                Some(before) => log_update(
                    &mut sink,
                    SAVED_FILTER_RESOURCE,
                    &saved.id,
                    serde_json::to_value(&before)?,
                    serde_json::to_value(&saved)?,
                    &settings.user,
                ),
                None => log_create(
                    &mut sink,
                    SAVED_FILTER_RESOURCE,
                    &saved.id,
                    serde_json::to_value(&saved)?,
                    &settings.user,
                ),
            };
            Ok(format!("Saved filter '{}' ({})\n", saved.name, saved.id))
        }

        FiltersCommand::List { format } => Ok(render_filters(set.filters(), format)?),

        FiltersCommand::Show { filter } => {
            let saved = set
                .find(&filter)
                .with_context(|| format!("no saved filter named '{filter}'"))?;
            Ok(format!("{}\n", to_query_string(&saved.conditions)))
        }

        FiltersCommand::Delete { filter } => {
            let id = set
                .find(&filter)
                .map(|f| f.id.clone())
                .with_context(|| format!("no saved filter named '{filter}'"))?;
            let Some(removed) = set.delete(&id) else {
                bail!("no saved filter named '{filter}'");
            };
            set.flush(&store).context("writing saved filters")?;
            log_delete(
                &mut sink,
                SAVED_FILTER_RESOURCE,
                &removed.id,
                serde_json::to_value(&removed)?,
                &settings.user,
            );
            Ok(format!("Deleted filter '{}'\n", removed.name))
        }
    }
}

fn audit(settings: &Settings, args: AuditArgs) -> Result<String> {
    let mut sink = FileAuditSink::new(&settings.store_dir);
    let criteria = AuditFilter {
        user_id: args.user,
        action: args.action,
        resource: args.resource,
        status: args.status,
        ..AuditFilter::default()
    };
    let events = sink.query(&criteria);
    let rendered = render_audit(&events, args.format)?;

    if args.format == OutputFormat::Csv {
        log_export(
            &mut sink,
            AUDIT_LOG_RESOURCE,
            "csv",
            events.len(),
            &settings.user,
        );
    }
    Ok(rendered)
}
