use comfy_table::{ContentArrangement, Table};
use kq_core::Difficulty;

use super::Context;

pub fn run(ctx: &Context) -> Result<(), String> {
    let days = ctx.stats_log().load().map_err(|e| e.to_string())?;

    if days.is_empty() {
        println!("  No statistics recorded.");
        return Ok(());
    }

    let mut header = vec!["Date", "Visits", "Avg OPI", "Users"];
    header.extend(Difficulty::all().iter().map(|d| d.as_str()));

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);

    for (date, day) in &days {
        let mut row = vec![
            date.to_string(),
            day.visits.to_string(),
            day.average_opi()
                .map(|avg| format!("{avg:.1}"))
                .unwrap_or_else(|| "—".to_string()),
            day.unique_users.len().to_string(),
        ];
        row.extend(Difficulty::all().iter().map(|&d| day.count(d).to_string()));
        table.add_row(row);
    }

    println!("{table}");
    println!();
    println!("  {} days", days.len());
    Ok(())
}
