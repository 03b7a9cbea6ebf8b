//! Table output formatting for CLI commands
//!
//! Renders the package catalog, phase quotas and session event logs using
//! comfy-table. Colors are dropped for NO_COLOR and dumb terminals.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use crate::application::EngineEvent;
use crate::domain::models::Package;

use super::truncate;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// One row per package with its per-phase targets.
    pub fn format_packages(&self, packages: &[Package]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&[
            "ID",
            "Name",
            "Phase 1",
            "Phase 2",
            "Phase 3",
            "Questions",
            "Hours",
        ]));

        for package in packages {
            let mut row = vec![
                Cell::new(&package.id).add_attribute(Attribute::Bold),
                Cell::new(&package.name),
            ];
            row.extend(package.phases.iter().map(|phase| {
                let survey = if phase.satisfaction_survey { " ★" } else { "" };
                Cell::new(format!("{}{survey}", phase.target_questions))
            }));
            row.push(Cell::new(package.total_target()));
            row.push(Cell::new(format!("{:.1}", f64::from(package.total_minutes()) / 60.0)));
            table.add_row(row);
        }

        table.to_string()
    }

    /// Category quotas of every phase of `package`.
    pub fn format_phases(&self, package: &Package) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["Phase", "Category", "Min", "Max", "Target", "Minutes"]));

        for phase in &package.phases {
            for (i, category) in phase.categories.iter().enumerate() {
                let (name, target, minutes) = if i == 0 {
                    (
                        phase.phase.name().to_string(),
                        phase.target_questions.to_string(),
                        phase.duration_minutes.to_string(),
                    )
                } else {
                    (String::new(), String::new(), String::new())
                };
                table.add_row(vec![
                    Cell::new(name),
                    Cell::new(&category.id),
                    Cell::new(category.min_questions),
                    Cell::new(category.max_questions),
                    Cell::new(target),
                    Cell::new(minutes),
                ]);
            }
        }

        table.to_string()
    }

    /// Numbered event log.
    pub fn format_events(&self, events: &[EngineEvent]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["#", "Event", "Detail"]));

        for (i, event) in events.iter().enumerate() {
            let kind = if self.use_colors {
                Cell::new(event.kind()).fg(event_color(event))
            } else {
                Cell::new(event.kind())
            };
            table.add_row(vec![
                Cell::new(i + 1),
                kind,
                Cell::new(truncate(&event.to_string(), 90)),
            ]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|t| Cell::new(t).add_attribute(Attribute::Bold))
        .collect()
}

/// Check if color output is supported
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}

fn event_color(event: &EngineEvent) -> Color {
    match event {
        EngineEvent::AnswersUpdated { .. } | EngineEvent::QuestionAsked { .. } => Color::White,
        EngineEvent::PhaseBadge { .. } | EngineEvent::Completed { .. } => Color::Green,
        EngineEvent::ScopeRedirect { .. } | EngineEvent::GenerationFailed { .. } => Color::Red,
        EngineEvent::EndWarning { .. } | EngineEvent::EndConfirmation { .. } => Color::Yellow,
        EngineEvent::Abandoned { .. } => Color::DarkGrey,
        _ => Color::Cyan,
    }
}
