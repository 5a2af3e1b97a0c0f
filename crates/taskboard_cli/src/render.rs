use tabled::builder::Builder;
use tabled::settings::Style;
use taskboard_core::BoardView;
use taskboard_core::config::Palette;
use taskboard_core::model::{Task, TaskPhase};
use taskboard_core::stats::Stats;

pub const TITLE: &str = "TASK LIST";
pub const PLACEHOLDER: &str = "write a new task";
pub const ADD_LABEL: &str = "[ADD]";
pub const COMPLETE_LABEL: &str = "[COMPLETE]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
}

pub fn completed_tone(percent: u32) -> Tone {
    if percent >= 50 {
        Tone::Positive
    } else {
        Tone::Negative
    }
}

pub fn pending_tone(percent: u32) -> Tone {
    match completed_tone(percent) {
        Tone::Positive => Tone::Negative,
        Tone::Negative => Tone::Positive,
    }
}

fn paint(palette: &Palette, tone: Tone, text: &str) -> String {
    match tone {
        Tone::Positive => palette.positive(text),
        Tone::Negative => palette.negative(text),
    }
}

/// Draws the whole board: title, summary tiles, input row and visible rows.
pub fn render_board(view: &BoardView<'_>, palette: &Palette) -> String {
    let mut out = String::new();
    out.push_str(TITLE);
    out.push_str("\n\n");
    out.push_str(&render_tiles(&view.stats, palette));
    out.push('\n');
    out.push_str(&render_input(view.input, palette));
    out.push('\n');
    if !view.tasks.is_empty() {
        out.push_str(&render_tasks(&view.tasks, palette));
        out.push('\n');
    }
    out
}

pub fn render_tiles(stats: &Stats, palette: &Palette) -> String {
    let completed = format!("{}%", stats.completed_pct);
    let pending = format!("{}%", stats.pending_pct);

    let mut builder = Builder::default();
    builder.push_record(vec![
        "Total tasks".to_string(),
        "Completed".to_string(),
        "Pending".to_string(),
    ]);
    builder.push_record(vec![
        stats.total.to_string(),
        paint(palette, completed_tone(stats.completed_pct), &completed),
        paint(palette, pending_tone(stats.pending_pct), &pending),
    ]);

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

pub fn render_input(input: &str, palette: &Palette) -> String {
    let field = if input.is_empty() {
        palette.mutedize(PLACEHOLDER)
    } else {
        input.to_string()
    };

    let mut builder = Builder::default();
    builder.push_record(vec![format!("> {field}"), ADD_LABEL.to_string()]);
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

pub fn render_tasks(tasks: &[&Task], palette: &Palette) -> String {
    let mut builder = Builder::default();
    for task in tasks {
        let (name, action) = match task.phase() {
            TaskPhase::Active => (task.name.clone(), COMPLETE_LABEL.to_string()),
            TaskPhase::Completed | TaskPhase::Hidden => (palette.struck(&task.name), String::new()),
        };
        builder.push_record(vec![task.id.to_string(), name, action]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// One-line summary used by `stats`.
pub fn render_stats_line(stats: &Stats, palette: &Palette) -> String {
    let completed = format!("{}%", stats.completed_pct);
    let pending = format!("{}%", stats.pending_pct);
    format!(
        "total: {}  completed: {}  pending: {}",
        stats.total,
        paint(palette, completed_tone(stats.completed_pct), &completed),
        paint(palette, pending_tone(stats.pending_pct), &pending),
    )
}

pub fn view_json(view: &BoardView<'_>) -> serde_json::Value {
    serde_json::json!({
        "stats": view.stats,
        "input": view.input,
        "tasks": view.tasks,
    })
}
