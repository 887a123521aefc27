//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use gridline_query::{AuditAction, AuditStatus, ConditionValue, FilterCondition, KEY_SEPARATOR};

/// Query JSON record files and manage saved filters.
#[derive(Debug, Parser)]
#[command(name = "gridline", version, about, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// YAML configuration file.
    #[arg(long, global = true, env = "GRIDLINE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory saved filters and the audit log are kept in [default: .gridline].
    #[arg(long, global = true, value_name = "DIR")]
    pub store_dir: Option<PathBuf>,

    /// Raise the log level (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Filter, search, sort and page a JSON array of objects.
    Query(QueryArgs),

    /// Manage saved filters.
    Filters {
        #[command(subcommand)]
        command: FiltersCommand,
    },

    /// Encode conditions as a query string.
    Encode {
        /// Condition as `field__operator=value`.
        #[arg(long = "where", value_name = "CONDITION", value_parser = parse_where)]
        conditions: Vec<FilterCondition>,
    },

    /// Decode a query string into conditions.
    Decode {
        /// Query string, with or without the leading `?`.
        query: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show or export the audit log.
    Audit(AuditArgs),
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// JSON file holding an array of objects.
    pub file: PathBuf,

    /// Case-insensitive text matched against every field.
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Condition as `field__operator=value`; the value is read as JSON when it parses.
    #[arg(short = 'w', long = "where", value_name = "CONDITION", value_parser = parse_where)]
    pub conditions: Vec<FilterCondition>,

    /// Conditions as a query string, e.g. `status__equals=active&age__gt=30`.
    #[arg(long, value_name = "QS")]
    pub filter: Option<String>,

    /// Saved filter to apply, by name or id.
    #[arg(long, value_name = "NAME")]
    pub saved: Option<String>,

    /// Field to sort by.
    #[arg(long, value_name = "FIELD")]
    pub sort: Option<String>,

    /// Sort descending.
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Page to show, starting at 1.
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Records per page.
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Reject unknown operators instead of ignoring them.
    #[arg(long)]
    pub strict: bool,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Debug, Subcommand)]
pub enum FiltersCommand {
    /// Save a set of conditions under a name.
    Save {
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short = 'w', long = "where", value_name = "CONDITION", value_parser = parse_where)]
        conditions: Vec<FilterCondition>,

        #[arg(long, value_name = "QS")]
        filter: Option<String>,
    },

    /// List saved filters.
    List {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print a saved filter as a query string.
    Show {
        /// Name or id.
        filter: String,
    },

    /// Delete a saved filter.
    Delete {
        /// Name or id.
        filter: String,
    },
}

#[derive(Debug, Args)]
pub struct AuditArgs {
    #[arg(long, value_parser = parse_action)]
    pub action: Option<AuditAction>,

    #[arg(long)]
    pub resource: Option<String>,

    #[arg(long)]
    pub user: Option<String>,

    #[arg(long, value_parser = parse_status)]
    pub status: Option<AuditStatus>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,
}

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Csv,
    Text,
}

/// Parses `field__operator=value`.
///
/// The value is taken as JSON when it parses (`40`, `true`, `null`,
/// `[18,65]`) and as a plain string otherwise.
pub fn parse_where(raw: &str) -> Result<FilterCondition, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field{KEY_SEPARATOR}operator=value, got '{raw}'"))?;
    let mut parts = key.split(KEY_SEPARATOR);
    let field = parts.next().unwrap_or_default();
    let operator = parts.next().unwrap_or_default();
    if field.is_empty() || operator.is_empty() || parts.next().is_some() {
        return Err(format!(
            "expected field{KEY_SEPARATOR}operator before '=', got '{key}'"
        ));
    }

    let value: ConditionValue = match serde_json::from_str::<serde_json::Value>(value) {
        Ok(json) if !json.is_object() => json.into(),
        _ => value.into(),
    };
    Ok(FilterCondition::new(field, operator, value))
}

fn parse_action(raw: &str) -> Result<AuditAction, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| format!("unknown audit action '{raw}'"))
}

fn parse_status(raw: &str) -> Result<AuditStatus, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| format!("unknown audit status '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use gridline_query::Operator;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn where_values_prefer_json() {
        let c = parse_where("age__between=[18,65]").unwrap();
        assert_eq!(c.field, "age");
        assert_eq!(c.operator, Operator::Between);
        assert_eq!(c.value, ConditionValue::from((18, 65)));

        let c = parse_where("consented__equals=true").unwrap();
        assert_eq!(c.value, ConditionValue::Bool(true));

        let c = parse_where("site__equals=null").unwrap();
        assert!(c.value.is_null());
    }

    #[test]
    fn where_values_fall_back_to_text() {
        let c = parse_where("status__equals=active").unwrap();
        assert_eq!(c.value, ConditionValue::from("active"));

        let c = parse_where("note__contains=a=b").unwrap();
        assert_eq!(c.value, ConditionValue::from("a=b"));

        let c = parse_where(r#"meta__equals={"a":1}"#).unwrap();
        assert_eq!(c.value, ConditionValue::from(r#"{"a":1}"#));
    }

    #[test]
    fn malformed_where_is_rejected() {
        assert!(parse_where("status").is_err());
        assert!(parse_where("status=active").is_err());
        assert!(parse_where("__equals=x").is_err());
        assert!(parse_where("a__b__c=x").is_err());
    }

    #[test]
    fn audit_filters_parse_snake_case() {
        assert_eq!(parse_action("bulk_delete").unwrap(), AuditAction::BulkDelete);
        assert!(parse_action("explode").is_err());
        assert_eq!(parse_status("failure").unwrap(), AuditStatus::Failure);
    }

    #[test]
    fn query_defaults() {
        let cli = Cli::try_parse_from(["gridline", "query", "data.json"]).unwrap();
        let Command::Query(args) = cli.command else {
            panic!("expected query");
        };
        assert_eq!(args.page, 1);
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.conditions.is_empty());
        assert!(!args.desc);
    }
}
