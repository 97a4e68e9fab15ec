use chrono::Utc;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use kq_quest::titles::find_title;

use super::Context;

pub fn run(ctx: &Context, session: Option<&str>) -> Result<(), String> {
    let id = match session {
        Some(id) => Some(id.to_string()),
        None => ctx.load_pending()?.map(|p| p.session_id),
    };
    let Some(id) = id else {
        println!("  No session yet. Run `kq scene` first.");
        return Ok(());
    };

    let mut app = ctx.app();
    let Some(state) = app.session(&id, Utc::now()).map_err(|e| e.to_string())? else {
        println!("  Session {id} has expired or does not exist.");
        return Ok(());
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Session", state.user_id.as_str()]);
    table.add_row(vec!["Total EXP".to_string(), state.total_exp.to_string()]);
    table.add_row(vec!["Visits".to_string(), state.visit_count.to_string()]);
    table.add_row(vec!["Stays".to_string(), state.stay_count.to_string()]);
    table.add_row(vec![
        "Combo".to_string(),
        format!("{} (best {})", state.combo_streak, state.max_combo),
    ]);
    table.add_row(vec!["Stay streak".to_string(), state.stay_streak.to_string()]);
    table.add_row(vec![
        "Last EXP".to_string(),
        state
            .last_exp
            .map(|e| e.to_string())
            .unwrap_or_else(|| "—".to_string()),
    ]);
    println!("{table}");

    println!();
    if state.history.is_empty() {
        println!("  {}", "No choices yet.".dimmed());
    } else {
        println!("  {} {}", "History:".bold(), state.history.join(" → "));
    }

    println!();
    println!("  {} ({})", "Titles".bold(), state.titles_earned.len());
    for id in &state.titles_earned {
        match find_title(id) {
            Some(title) => println!("  {} {}", title.icon, title.name),
            None => println!("  {id}"),
        }
    }
    Ok(())
}
