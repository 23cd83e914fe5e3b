//! Command implementations for rowdiff CLI

use crate::adapter::{DatabaseAdapter, DuckDbAdapter};
use crate::cli::{Commands, CompareArgs, OutputFormat};
use crate::comparator::{self, ComparisonSpec};
use crate::config::{BackendConfig, ComparisonProfile};
use crate::error::{Result, RowdiffError};
use crate::model::ComparisonResult;
use crate::output::{JsonFormatter, PrettyPrinter};
use crate::progress::ProgressReporter;
use crate::query::Source;
use crate::report;

/// Execute a command
pub fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Compare(args) => compare_command(&args),
        Commands::Fields {
            connection,
            table,
            format,
        } => fields_command(&connection, &table, &format),
    }
}

/// Compare two tables or queries
fn compare_command(args: &CompareArgs) -> Result<()> {
    let output_format = OutputFormat::parse(&args.format).map_err(RowdiffError::invalid_input)?;
    let profile = build_profile(args)?;

    if let Some(path) = &args.save_profile {
        profile.save(path)?;
        log::info!("Saved comparison profile to {}", path.display());
    }

    let spec = spec_from_profile(&profile);
    let mut progress = match output_format {
        OutputFormat::Pretty => ProgressReporter::new_for_compare(&format!(
            "Comparing {} with {}...",
            spec.source_a, spec.source_b
        )),
        OutputFormat::Json => ProgressReporter::new_minimal(),
    };

    // Dropping the reporter on an early return clears the spinner
    let result = run_comparison(&profile, &spec, DuckDbAdapter::open)?;

    if let Some(path) = &profile.csv_report {
        progress.stage("Writing CSV report...");
        report::export_csv(&result, path)?;
    }
    progress.finish(&format!(
        "Compared {} and {} rows",
        result.row_count_a, result.row_count_b
    ));

    match output_format {
        OutputFormat::Pretty => {
            PrettyPrinter::print_comparison(&result, args.detailed);
            if let Some(path) = &profile.csv_report {
                println!("\n💾 CSV report saved to: {}", path.display());
            }
        }
        OutputFormat::Json => println!("{}", JsonFormatter::format(&result)?),
    }

    Ok(())
}

/// Open the adapters a profile needs, compare, and close every adapter that
/// was opened whatever the outcome.
///
/// When source and target are the same connection one adapter serves both
/// sides. A failure to close is logged; it never hides the comparison result.
pub fn run_comparison<A, F>(
    profile: &ComparisonProfile,
    spec: &ComparisonSpec,
    open: F,
) -> Result<ComparisonResult>
where
    A: DatabaseAdapter,
    F: Fn(&BackendConfig) -> Result<A>,
{
    let mut adapter_a = open(&profile.source)?;

    let result = if profile.target() == &profile.source {
        comparator::compare(spec, &adapter_a, &adapter_a)
    } else {
        open(profile.target()).and_then(|mut adapter_b| {
            let result = comparator::compare(spec, &adapter_a, &adapter_b);
            close_adapter(&mut adapter_b);
            result
        })
    };

    close_adapter(&mut adapter_a);
    result
}

fn close_adapter(adapter: &mut dyn DatabaseAdapter) {
    if let Err(e) = adapter.close() {
        log::warn!("Failed to close {} connection: {}", adapter.backend(), e);
    }
}

/// Show the columns and primary key of a table
fn fields_command(connection: &str, table: &str, format: &str) -> Result<()> {
    let output_format = OutputFormat::parse(format).map_err(RowdiffError::invalid_input)?;
    let config = BackendConfig::parse(connection)?;
    let mut adapter = DuckDbAdapter::open(&config)?;

    let source = Source::table(table);
    let fields = adapter.fields(&source)?;
    let primary_keys = adapter.primary_keys(&source)?;
    adapter.close()?;

    match output_format {
        OutputFormat::Pretty => PrettyPrinter::print_fields(&source, &fields, &primary_keys),
        OutputFormat::Json => println!(
            "{}",
            JsonFormatter::format_fields(&source, &fields, &primary_keys)?
        ),
    }

    Ok(())
}

/// Merge command-line options over an optional profile file.
pub fn build_profile(args: &CompareArgs) -> Result<ComparisonProfile> {
    let base = args
        .profile
        .as_deref()
        .map(ComparisonProfile::load)
        .transpose()?;

    let source = match (&args.source, &base) {
        (Some(conn), _) => BackendConfig::parse(conn)?,
        (None, Some(profile)) => profile.source.clone(),
        (None, None) => {
            return Err(RowdiffError::invalid_input(
                "A source connection is required (--source or --profile)",
            ))
        }
    };

    let target = match &args.target {
        Some(conn) => Some(BackendConfig::parse(conn)?),
        None if args.source.is_some() => None,
        None => base.as_ref().and_then(|p| p.target.clone()),
    };

    let table1 = side_source(
        args.table1.as_deref(),
        args.query1.as_deref(),
        base.as_ref().map(|p| &p.table1),
        1,
    )?;
    let table2 = side_source(
        args.table2.as_deref(),
        args.query2.as_deref(),
        base.as_ref().map(|p| &p.table2),
        2,
    )?;

    let pick_list = |cli: &Vec<String>, saved: Option<&Vec<String>>| -> Vec<String> {
        if cli.is_empty() {
            saved.cloned().unwrap_or_default()
        } else {
            cli.clone()
        }
    };
    let pick = |cli: &Option<String>, saved: Option<&Option<String>>| -> Option<String> {
        cli.clone().or_else(|| saved.cloned().flatten())
    };

    Ok(ComparisonProfile {
        source,
        target,
        table1,
        table2,
        fields: pick_list(&args.fields, base.as_ref().map(|p| &p.fields)),
        exclude: pick_list(&args.exclude, base.as_ref().map(|p| &p.exclude)),
        filter: pick(&args.filter, base.as_ref().map(|p| &p.filter)),
        filter_a: pick(&args.filter1, base.as_ref().map(|p| &p.filter_a)),
        filter_b: pick(&args.filter2, base.as_ref().map(|p| &p.filter_b)),
        csv_report: args
            .csv_report
            .clone()
            .or_else(|| base.as_ref().and_then(|p| p.csv_report.clone())),
    })
}

fn side_source(
    table: Option<&str>,
    query: Option<&str>,
    saved: Option<&Source>,
    side: u8,
) -> Result<Source> {
    match (table, query, saved) {
        (Some(table), _, _) => Ok(Source::table(table)),
        (None, Some(query), _) => Ok(Source::query(query)),
        (None, None, Some(saved)) => Ok(saved.clone()),
        (None, None, None) => Err(RowdiffError::invalid_input(format!(
            "No table{} given: use --table{} or --query{}",
            side, side, side
        ))),
    }
}

/// Comparison description for a profile
pub fn spec_from_profile(profile: &ComparisonProfile) -> ComparisonSpec {
    ComparisonSpec {
        source_a: profile.table1.clone(),
        source_b: profile.table2.clone(),
        fields: profile.fields.clone(),
        exclude: profile.exclude.clone(),
        filter: profile.filter.clone(),
        filter_a: profile.filter_a.clone(),
        filter_b: profile.filter_b.clone(),
    }
}
