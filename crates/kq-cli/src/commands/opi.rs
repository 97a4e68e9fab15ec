use chrono::Utc;
use colored::Colorize;

use super::Context;

pub async fn run(ctx: &Context) -> Result<(), String> {
    let outcome = ctx.reading(Utc::now()).await?;
    let reading = &outcome.reading;
    let difficulty = reading.difficulty();

    println!(
        "  {} {}  {}",
        "OPI".bold(),
        reading.value.to_string().bold(),
        super::paint(difficulty)
    );
    println!("  {}", difficulty.tip());
    println!(
        "  {}",
        format!(
            "source: {}  attempts: {}  at {}",
            reading.source,
            outcome.attempts,
            reading.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )
        .dimmed()
    );
    if let Some(failure) = &outcome.failure {
        println!("  {} {failure}", "offline:".yellow());
    }
    Ok(())
}
