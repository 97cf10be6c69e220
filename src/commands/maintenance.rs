//! Well-known key maintenance: `stats`, `clear-expired`, `clear-all`.

use anyhow::Result;
use sealcache::WellKnownKey;
use std::process::ExitCode;

use super::Context;

pub async fn stats(ctx: &Context, json: bool) -> Result<ExitCode> {
    let stats = ctx.store.stats().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("Store ({})", ctx.store.backend_name());
    println!("==============");
    if let Some(ns) = ctx.store.namespace() {
        println!("Namespace:   {ns}");
    }
    println!("Total:       {}", stats.total_items);
    println!("Valid:       {}", stats.valid_items);
    println!("Expired:     {}", stats.expired_items);
    if stats.corrupt_items() > 0 {
        println!("Unreadable:  {}", stats.corrupt_items());
    }
    if !stats.keys.is_empty() {
        println!("Keys:        {}", stats.keys.join(", "));
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn clear_expired(ctx: &Context) -> Result<ExitCode> {
    let cleared = ctx.store.clear_expired(WellKnownKey::ALL).await;

    if cleared == 0 {
        println!("No expired entries.");
    } else {
        println!("Evicted {cleared} expired entr{}", if cleared == 1 { "y" } else { "ies" });
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn clear_all(ctx: &Context, yes: bool) -> Result<ExitCode> {
    if !yes {
        anyhow::bail!(
            "Refusing to remove every well-known key without confirmation\n\n\
             Re-run with --yes to proceed"
        );
    }

    let failed = ctx.store.clear_all(WellKnownKey::ALL).await;
    if failed.is_empty() {
        println!("Cleared {} well-known keys", WellKnownKey::ALL.len());
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("Failed to clear: {}", failed.join(", "));
        Ok(ExitCode::FAILURE)
    }
}
