use anyhow::{bail, Context, Result};
use plan_core::{Constants, YieldFit};
use std::collections::HashMap;

const VALID_KEYS: &[&str] = &[
    "gathering_tea_bonus",
    "processing_tea_bonus",
    "gourmet_tea_bonus",
    "artisan_tea_bonus",
    "community_gathering_base",
    "community_gathering_per_level",
    "max_house_room_level",
    "trial_fit",
    "trial_z_score",
    "debounce_ms",
    "max_expansion_steps",
];

/// Parses repeated `key=value` flags. Values are JSON, so `0.2`, `8` and
/// `"linear"` all work; a bare word is taken as a string.
pub fn parse_overrides(pairs: &[String]) -> Result<HashMap<String, serde_json::Value>> {
    pairs
        .iter()
        .map(|pair| {
            let (key, raw) = pair
                .split_once('=')
                .with_context(|| format!("override '{pair}' is not of the form key=value"))?;
            let raw = raw.trim();
            let value = serde_json::from_str(raw)
                .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
            Ok((key.trim().to_string(), value))
        })
        .collect()
}

pub fn apply_overrides(
    constants: &mut Constants,
    overrides: &HashMap<String, serde_json::Value>,
) -> Result<()> {
    for (key, value) in overrides {
        match key.as_str() {
            "gathering_tea_bonus" => constants.gathering_tea_bonus = as_fraction(key, value)?,
            "processing_tea_bonus" => constants.processing_tea_bonus = as_fraction(key, value)?,
            "gourmet_tea_bonus" => constants.gourmet_tea_bonus = as_fraction(key, value)?,
            "artisan_tea_bonus" => constants.artisan_tea_bonus = as_fraction(key, value)?,
            "community_gathering_base" => {
                constants.community_gathering_base = as_f64(key, value)?;
            }
            "community_gathering_per_level" => {
                constants.community_gathering_per_level = as_f64(key, value)?;
            }
            "max_house_room_level" => constants.max_house_room_level = as_u32(key, value)?,
            "trial_fit" => constants.trial_fit = as_fit(key, value)?,
            "trial_z_score" => constants.trial_z_score = as_f64(key, value)?,
            "debounce_ms" => constants.debounce_ms = as_u64(key, value)?,
            "max_expansion_steps" => constants.max_expansion_steps = as_u64(key, value)?,
            _ => bail!(
                "unknown override key '{key}'. Valid keys: {}",
                VALID_KEYS.join(", ")
            ),
        }
        tracing::info!(key = %key, value = %value, "constant overridden");
    }
    Ok(())
}

fn as_f64(key: &str, value: &serde_json::Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| anyhow::anyhow!("override '{key}': expected a number, got {value}"))
}

/// Tea bonuses scale a multiplier; artisan at 1.0 would divide by zero.
fn as_fraction(key: &str, value: &serde_json::Value) -> Result<f64> {
    let val = as_f64(key, value)?;
    if !(0.0..1.0).contains(&val) {
        bail!("override '{key}': expected a value in [0, 1), got {val}");
    }
    Ok(val)
}

fn as_u64(key: &str, value: &serde_json::Value) -> Result<u64> {
    value.as_u64().ok_or_else(|| {
        anyhow::anyhow!("override '{key}': expected a positive integer, got {value}")
    })
}

fn as_u32(key: &str, value: &serde_json::Value) -> Result<u32> {
    let val = as_u64(key, value)?;
    u32::try_from(val)
        .map_err(|_| anyhow::anyhow!("override '{key}': value {val} exceeds u32 range"))
}

fn as_fit(key: &str, value: &serde_json::Value) -> Result<YieldFit> {
    match value.as_str() {
        Some("power_law" | "power-law") => Ok(YieldFit::power_law()),
        Some("linear") => Ok(YieldFit::linear()),
        _ => bail!("override '{key}': expected \"power_law\" or \"linear\", got {value}"),
    }
}
