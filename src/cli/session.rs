use colored::Colorize;
use dialoguer::{Input, Select};

use crate::cli::summary::print_panel;
use crate::cli::{open_session, render, AnalysisArgs, MappingArgs, SourceArgs};
use crate::error::Result;
use crate::models::{QuickEntry, SemanticRole};
use crate::session::Session;
use crate::settings::load_settings;

const MENU_ITEMS: &[&str] = &[
    "Show summary",
    "Add a quick entry",
    "Top activities",
    "Toggle audit",
    "Set target",
    "Filter by group",
    "Override a column",
    "Ask a question",
    "Quit",
];

const QUIT: usize = 8;

pub fn run(source: &SourceArgs, mapping: &MappingArgs) -> Result<()> {
    let settings = load_settings();
    let mut session = open_session(&settings, source, mapping, &AnalysisArgs::default())?;

    loop {
        println!();
        let choice = Select::new()
            .with_prompt("What next?")
            .items(MENU_ITEMS)
            .default(0)
            .interact()
            .unwrap_or(QUIT);

        match choice {
            0 => show_summary(&session, &settings.currency_symbol),
            1 => add_entry(&mut session),
            2 => show_groups(&session),
            3 => {
                session.audit.enabled = !session.audit.enabled;
                let state = if session.audit.enabled { "on" } else { "off" };
                println!("Audit {state}");
            }
            4 => set_target(&mut session),
            5 => set_filter(&mut session),
            6 => override_column(&mut session),
            7 => ask(&session),
            _ => break,
        }
    }

    let pending = session.entries().len();
    if pending > 0 {
        println!(
            "{}",
            format!("{pending} quick entries discarded with the session.").yellow()
        );
    }
    Ok(())
}

fn show_summary(session: &Session, currency: &str) {
    match session.analyze() {
        Some(analysis) => print_panel(&analysis, currency),
        None => println!("{}", "No table loaded.".red()),
    }
}

fn show_groups(session: &Session) {
    match session.analyze().and_then(|a| a.groups) {
        Some(groups) => println!("Top Activities\n{}", render::groups_table(&groups)),
        None => println!("{}", "No discipline/activity column found.".yellow()),
    }
}

fn add_entry(session: &mut Session) {
    let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
    let date: String = Input::new()
        .with_prompt("Date")
        .default(today)
        .interact_text()
        .unwrap_or_default();
    let quantity: String = Input::new()
        .with_prompt("Quantity")
        .default("0".to_string())
        .interact_text()
        .unwrap_or_default();
    let value: String = Input::new()
        .with_prompt("Value")
        .default("0".to_string())
        .interact_text()
        .unwrap_or_default();

    match format!("{date},{quantity},{value}").parse::<QuickEntry>() {
        Ok(entry) => {
            session.submit(entry);
            println!("{}", "\u{2192} Entry added".green());
        }
        Err(e) => println!("{}", e.to_string().red()),
    }
}

fn set_target(session: &mut Session) {
    let raw: String = Input::new()
        .with_prompt("Target total (blank for automatic)")
        .allow_empty(true)
        .interact_text()
        .unwrap_or_default();
    let raw = raw.trim();
    if raw.is_empty() {
        session.target = None;
        return;
    }
    match raw.parse::<f64>() {
        Ok(t) => session.target = Some(t),
        Err(_) => println!("{}", "Not a number, target unchanged.".red()),
    }
}

fn set_filter(session: &mut Session) {
    let groups = session
        .analyze()
        .and_then(|a| a.groups)
        .unwrap_or_default();
    if groups.is_empty() {
        println!("{}", "No groups to filter by.".yellow());
        return;
    }
    let mut items: Vec<String> = vec!["(all)".to_string()];
    items.extend(groups.into_iter().map(|g| g.group));
    let idx = Select::new()
        .with_prompt("Group")
        .items(&items)
        .default(0)
        .interact()
        .unwrap_or(0);
    session.group_filter = (idx > 0).then(|| items[idx].clone());
}

fn override_column(session: &mut Session) {
    let Some(columns) = session.table().map(|t| t.columns.clone()) else {
        return;
    };
    let role_names: Vec<&str> = SemanticRole::ALL.iter().map(|r| r.name()).collect();
    let Ok(role_idx) = Select::new()
        .with_prompt("Role")
        .items(&role_names)
        .interact()
    else {
        return;
    };
    let Ok(col_idx) = Select::new()
        .with_prompt("Column")
        .items(&columns)
        .interact()
    else {
        return;
    };
    if let Err(e) = session.set_override(SemanticRole::ALL[role_idx], &columns[col_idx]) {
        println!("{}", e.to_string().red());
    }
}

fn ask(session: &Session) {
    let question: String = Input::new()
        .with_prompt("Question")
        .interact_text()
        .unwrap_or_default();
    if let Some(context) = session.context(&question) {
        println!("{}\n{context}", "\u{2500}".repeat(60));
    }
}
