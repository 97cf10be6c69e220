//! Single-key commands: `set`, `get`, `rm`, `has`, `info`.

use anyhow::{Context as _, Result};
use serde_json::Value;
use std::process::ExitCode;

use super::{Context, format_ms, ttl};

/// Parses the CLI value: JSON with `--json`, else a plain string.
pub(crate) fn parse_value(raw: &str, json: bool) -> Result<Value> {
    if json {
        serde_json::from_str(raw).with_context(|| format!("VALUE is not valid JSON: {raw}"))
    } else {
        Ok(Value::String(raw.to_string()))
    }
}

/// Renders a stored value: strings bare, everything else as pretty JSON.
pub(crate) fn render_value(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Ok(serde_json::to_string_pretty(other)?),
    }
}

pub async fn set(
    ctx: &Context,
    key: &str,
    raw: &str,
    ttl_secs: Option<u64>,
    json: bool,
) -> Result<ExitCode> {
    let value = parse_value(raw, json)?;
    ctx.store.set(key, &value, ttl(ttl_secs)).await?;
    Ok(ExitCode::SUCCESS)
}

pub async fn get(ctx: &Context, key: &str) -> Result<ExitCode> {
    match ctx.store.get::<Value>(key).await? {
        Some(value) => {
            println!("{}", render_value(&value)?);
            Ok(ExitCode::SUCCESS)
        },
        None => Ok(ExitCode::from(1)),
    }
}

pub async fn remove(ctx: &Context, key: &str) -> Result<ExitCode> {
    ctx.store.remove(key).await?;
    Ok(ExitCode::SUCCESS)
}

pub async fn has(ctx: &Context, key: &str) -> Result<ExitCode> {
    if ctx.store.has(key).await {
        println!("yes");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("no");
        Ok(ExitCode::from(1))
    }
}

pub async fn info(ctx: &Context, key: &str, json: bool) -> Result<ExitCode> {
    let Some(info) = ctx.store.item_info(key).await? else {
        if json {
            println!("null");
        } else {
            println!("{key}: not found");
        }
        return Ok(ExitCode::from(1));
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("Key:         {key}");
    println!("Written:     {}", format_ms(info.timestamp));
    match info.expires_at {
        Some(exp) => println!("Expires:     {}", format_ms(exp)),
        None => println!("Expires:     never"),
    }
    println!("Expired:     {}", if info.is_expired { "yes" } else { "no" });
    Ok(ExitCode::SUCCESS)
}
