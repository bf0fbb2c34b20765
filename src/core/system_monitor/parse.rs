//! Parsers for OS introspection command output.
//!
//! These read fixed lines and columns of `wmic`, `top -bn1`, `free` and
//! `df -P /`. Any change in the output shape is reported as an error.

use regex::Regex;
use once_cell::sync::Lazy;

use super::metrics::used_percent;
use crate::error::{NullBatchError, Result};

fn shape_error(command: &str, detail: &str) -> NullBatchError {
    NullBatchError::metric_collection(format!("unexpected `{}` output: {}", command, detail))
}

fn parse_u64(command: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| shape_error(command, &format!("{:?}: {}", value.trim(), e)))
}

fn parse_f32(command: &str, value: &str) -> Result<f32> {
    value
        .trim()
        .replace(',', ".")
        .parse::<f32>()
        .map_err(|e| shape_error(command, &format!("{:?}: {}", value.trim(), e)))
}

/// Lines without the blank ones `wmic` pads its output with
fn content_lines(output: &str) -> Vec<&str> {
    output
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect()
}

/// `wmic cpu get loadpercentage`: header, then the load on the second line
pub fn parse_wmic_cpu(output: &str) -> Result<f32> {
    let lines = content_lines(output);
    let value = lines
        .get(1)
        .ok_or_else(|| shape_error("wmic cpu", "missing value line"))?;
    parse_f32("wmic cpu", value)
}

/// `wmic OS get FreePhysicalMemory,TotalVisibleMemorySize /Value`
pub fn parse_wmic_memory(output: &str) -> Result<f32> {
    let mut free = None;
    let mut total = None;

    for line in content_lines(output) {
        match line.split_once('=') {
            Some(("FreePhysicalMemory", v)) => free = Some(parse_u64("wmic OS", v)?),
            Some(("TotalVisibleMemorySize", v)) => total = Some(parse_u64("wmic OS", v)?),
            _ => {}
        }
    }

    match (total, free) {
        (Some(total), Some(free)) if total > 0 => Ok(used_percent(total, free)),
        _ => Err(shape_error("wmic OS", "missing memory values")),
    }
}

/// `wmic logicaldisk get size,freespace`: columns come back as `FreeSpace  Size`
pub fn parse_wmic_disk(output: &str) -> Result<f32> {
    let lines = content_lines(output);
    let row = lines
        .get(1)
        .ok_or_else(|| shape_error("wmic logicaldisk", "missing disk row"))?;
    let cols: Vec<&str> = row.split_whitespace().collect();
    if cols.len() < 2 {
        return Err(shape_error("wmic logicaldisk", row));
    }

    let free = parse_u64("wmic logicaldisk", cols[0])?;
    let total = parse_u64("wmic logicaldisk", cols[1])?;
    if total == 0 {
        return Err(shape_error("wmic logicaldisk", "zero disk size"));
    }
    Ok(used_percent(total, free))
}

static CPU_IDLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]+(?:[.,][0-9]+)?)\s*%?\s*id").expect("valid cpu idle regex")
});

/// `top -bn1`: third line is `%Cpu(s):  3.1 us,  1.0 sy, ... 95.2 id, ...`.
/// Load is everything that is not idle.
pub fn parse_top_cpu(output: &str) -> Result<f32> {
    let line = output
        .lines()
        .nth(2)
        .ok_or_else(|| shape_error("top", "missing cpu line"))?;

    if !line.contains("Cpu") {
        return Err(shape_error("top", line));
    }

    let idle = CPU_IDLE
        .captures(line)
        .and_then(|c| c.get(1))
        .ok_or_else(|| shape_error("top", line))?;

    let idle = parse_f32("top", idle.as_str())?;
    Ok((100.0 - idle).clamp(0.0, 100.0))
}

/// `free`: second line is `Mem: total used free ...`
pub fn parse_free_memory(output: &str) -> Result<f32> {
    let line = output
        .lines()
        .nth(1)
        .ok_or_else(|| shape_error("free", "missing Mem line"))?;
    let cols: Vec<&str> = line.split_whitespace().collect();
    if cols.len() < 4 || !cols[0].starts_with("Mem") {
        return Err(shape_error("free", line));
    }

    let total = parse_u64("free", cols[1])?;
    let free = parse_u64("free", cols[3])?;
    if total == 0 {
        return Err(shape_error("free", "zero total memory"));
    }
    Ok(used_percent(total, free))
}

/// `df -P /`: second line, fifth column is `Capacity` like `42%`
pub fn parse_df_root(output: &str) -> Result<f32> {
    let line = output
        .lines()
        .nth(1)
        .ok_or_else(|| shape_error("df", "missing filesystem line"))?;
    let capacity = line
        .split_whitespace()
        .nth(4)
        .ok_or_else(|| shape_error("df", line))?;
    parse_f32("df", capacity.trim_end_matches('%'))
}
