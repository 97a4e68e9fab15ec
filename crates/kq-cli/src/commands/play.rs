use chrono::Utc;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use kq_quest::validate::Redirect;
use kq_quest::{ResultForm, ResultView, Submission};

use super::Context;

pub fn run(
    ctx: &Context,
    choice: &str,
    opi: Option<String>,
    csrf: Option<String>,
    session: Option<String>,
) -> Result<(), String> {
    let pending = ctx.load_pending()?;
    let form = ResultForm {
        choice: Some(choice.to_string()),
        opi: opi.or_else(|| pending.as_ref().map(|p| p.opi.to_string())),
        csrf_token: csrf.or_else(|| pending.as_ref().map(|p| p.csrf_token.clone())),
        session_id: session.or_else(|| pending.as_ref().map(|p| p.session_id.clone())),
    };

    let mut app = ctx.app();
    match app
        .submit_result(&form, Utc::now())
        .map_err(|e| e.to_string())?
    {
        Submission::Accepted(view) => {
            print_result(&view);
            Ok(())
        }
        Submission::Rejected(rejection) => {
            println!("  {}", Redirect(rejection));
            Err(format!("submission rejected: {rejection}"))
        }
    }
}

fn print_result(view: &ResultView) {
    let reward = &view.reward;
    let name = view
        .action
        .map(|a| format!("{} {}", a.icon, a.label))
        .unwrap_or_else(|| view.choice.to_string());

    println!();
    println!("  {name}");
    println!("  {}", view.message.bold());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["", "EXP"]);
    table.add_row(vec!["Base".to_string(), reward.base.to_string()]);
    table.add_row(vec![
        format!("{} ×{}", reward.difficulty.label(), reward.multiplier),
        format!("{:.1}", reward.scaled()),
    ]);
    for bonus in &reward.bonuses {
        table.add_row(vec![bonus.label.clone(), format!("+{}", bonus.value)]);
    }
    table.add_row(vec!["Total".to_string(), reward.total.to_string()]);
    println!("{table}");

    for title in &view.new_titles {
        println!(
            "  {} {} {}",
            title.icon,
            "New title:".yellow().bold(),
            title.name
        );
    }

    println!();
    println!(
        "  {} EXP total  combo {} (best {})  {} titles",
        view.total_exp.to_string().bold(),
        view.combo_streak,
        view.max_combo,
        view.titles_count
    );
    println!("  {}", view.encouragement.dimmed());
}
