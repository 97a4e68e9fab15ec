use chrono::Utc;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use kq_quest::scene::OfferedChoice;

use super::{Context, Pending};

pub async fn run(ctx: &Context, session: Option<&str>) -> Result<(), String> {
    let now = Utc::now();
    let outcome = ctx.reading(now).await?;

    let resume = match session {
        Some(id) => Some(id.to_string()),
        None => ctx.load_pending()?.map(|p| p.session_id),
    };

    let mut app = ctx.app();
    let view = app
        .show_scene(resume.as_deref(), &outcome.reading, now)
        .map_err(|e| e.to_string())?;
    let scene = &view.scene;

    println!();
    println!(
        "  {} {}  {}  {}",
        "OPI".bold(),
        view.reading.value.to_string().bold(),
        super::paint(scene.difficulty),
        format!("({}, {})", view.reading.source, scene.time_of_day).dimmed()
    );
    println!("  {}", scene.difficulty.tip().dimmed());
    println!();
    println!("  {}", scene.message);
    if let Some(line) = &scene.offline_message {
        println!("  {}", line.dimmed());
    }
    if let Some(event) = scene.special_event {
        println!("  {} {}", event.icon, event.text.yellow());
    }
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Key", "Action", "Base", "Risk", "Hint"]);
    for choice in scene.choices.stay.iter().chain(&scene.choices.out) {
        table.add_row(row(choice));
    }
    println!("{table}");
    if scene.choices.out.is_empty() {
        println!("  {}", "Too crowded to go out.".dimmed());
    }

    println!();
    println!(
        "  Session {}  visit {}  {} EXP  combo {}",
        view.session_id.dimmed(),
        view.visit_count,
        view.total_exp,
        view.combo_streak
    );
    println!("  Next: {}", "kq play <key>".bold());

    ctx.save_pending(&Pending {
        session_id: view.session_id,
        csrf_token: view.csrf_token,
        opi: view.reading.value.value(),
    })
}

fn row(choice: &OfferedChoice) -> Vec<String> {
    let action = choice.action;
    vec![
        action.key.to_string(),
        format!("{} {}", action.icon, action.label),
        action.base_reward.to_string(),
        action
            .risk
            .map(|r| r.to_string())
            .unwrap_or_else(|| "—".to_string()),
        choice
            .bonus_hint
            .map(|b| format!("+{b}?"))
            .unwrap_or_else(|| "—".to_string()),
    ]
}
