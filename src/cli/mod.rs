pub mod audit;
pub mod context;
pub mod groups;
pub mod init;
pub mod render;
pub mod schema;
pub mod session;
pub mod sheets;
pub mod summary;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::Result;
use crate::importer::{load_table, SourceOptions};
use crate::models::{QuickEntry, SemanticRole};
use crate::session::Session;
use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "medicao",
    about = "Measurement reports: infer columns, merge quick entries, audit and summarize."
)]
pub struct Cli {
    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a settings file with the defaults (outlier k, keywords, ...).
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
    /// List the sheets of a workbook.
    Sheets {
        /// Path to CSV or XLSX file
        file: String,
    },
    /// Show which column was bound to each role.
    Schema {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        mapping: MappingArgs,
    },
    /// Totals, averages, trend and progress to target.
    Summary {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        mapping: MappingArgs,
        #[command(flatten)]
        analysis: AnalysisArgs,
        /// Also print the measurement curve (date, quantity)
        #[arg(long)]
        series: bool,
        /// Also print the last N active rows
        #[arg(long)]
        rows: Option<usize>,
    },
    /// Flag outliers and negative quantities.
    Audit {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        mapping: MappingArgs,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
    /// Rank groups (discipline, activity) by measured quantity.
    Groups {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        mapping: MappingArgs,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
    /// Print the context an assistant would receive for a question.
    Context {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        mapping: MappingArgs,
        #[command(flatten)]
        analysis: AnalysisArgs,
        /// The question to ask about the data
        #[arg(long)]
        question: String,
        /// Number of trailing rows to include
        #[arg(long = "excerpt-rows")]
        excerpt_rows: Option<usize>,
    },
    /// Interactive session: add quick entries and watch the numbers move.
    Session {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        mapping: MappingArgs,
    },
}

#[derive(Args, Clone)]
pub struct SourceArgs {
    /// Path to CSV or XLSX file
    pub file: String,
    /// Sheet to read (default: first sheet)
    #[arg(long)]
    pub sheet: Option<String>,
    /// Rows above the header row
    #[arg(long = "skip-rows", default_value = "0")]
    pub skip_rows: usize,
}

impl SourceArgs {
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.file)
    }

    pub fn options(&self) -> SourceOptions {
        SourceOptions {
            sheet: self.sheet.clone(),
            skip_rows: self.skip_rows,
        }
    }
}

#[derive(Args, Clone, Default)]
pub struct MappingArgs {
    /// Column to use as the date
    #[arg(long = "date-col")]
    pub date_col: Option<String>,
    /// Column to use as the measured quantity
    #[arg(long = "quantity-col")]
    pub quantity_col: Option<String>,
    /// Column to use as the monetary value
    #[arg(long = "value-col")]
    pub value_col: Option<String>,
    /// Column to group by (discipline, activity)
    #[arg(long = "group-col")]
    pub group_col: Option<String>,
}

impl MappingArgs {
    pub fn overrides(&self) -> Vec<(SemanticRole, String)> {
        [
            (SemanticRole::Date, &self.date_col),
            (SemanticRole::Quantity, &self.quantity_col),
            (SemanticRole::MonetaryValue, &self.value_col),
            (SemanticRole::Discipline, &self.group_col),
        ]
        .into_iter()
        .filter_map(|(role, col)| col.clone().map(|c| (role, c)))
        .collect()
    }
}

#[derive(Args, Clone, Default)]
pub struct AnalysisArgs {
    /// Quick entry to merge, repeatable: DATE,QUANTITY[,VALUE]
    #[arg(long = "entry", value_name = "DATE,QTY[,VALUE]")]
    pub entries: Vec<String>,
    /// Target total (default: total times the configured factor)
    #[arg(long)]
    pub target: Option<f64>,
    /// Skip the outlier and negative-value checks
    #[arg(long = "no-audit")]
    pub no_audit: bool,
    /// Outlier multiplier (standard deviations above the mean)
    #[arg(long)]
    pub k: Option<f64>,
    /// Only rows whose group column equals this value
    #[arg(long)]
    pub filter: Option<String>,
    /// How many groups to rank
    #[arg(long)]
    pub top: Option<usize>,
}

/// Loads the file into a fresh session and applies command-line choices.
pub(crate) fn open_session(
    settings: &Settings,
    source: &SourceArgs,
    mapping: &MappingArgs,
    analysis: &AnalysisArgs,
) -> Result<Session> {
    let mut session = Session::new(settings);
    session.load_table(load_table(&source.path(), &source.options())?);
    for (role, column) in mapping.overrides() {
        session.set_override(role, &column)?;
    }
    for raw in &analysis.entries {
        session.submit(raw.parse::<QuickEntry>()?);
    }
    if analysis.no_audit {
        session.audit.enabled = false;
    }
    if let Some(k) = analysis.k {
        session.audit.outlier_k = k;
    }
    if let Some(top) = analysis.top {
        session.top_groups = top;
    }
    session.target = analysis.target;
    session.group_filter = analysis.filter.clone();
    Ok(session)
}
