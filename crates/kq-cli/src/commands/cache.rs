use super::Context;

pub fn clear(ctx: &Context) -> Result<(), String> {
    let removed = ctx.cache().clear().map_err(|e| e.to_string())?;
    println!("  Removed {removed} cache entries.");
    Ok(())
}

pub fn gc(ctx: &Context) -> Result<(), String> {
    let removed = ctx.cache().gc().map_err(|e| e.to_string())?;
    println!("  Removed {removed} expired cache entries.");
    Ok(())
}
