//! Human-readable summaries of signal sets and inventories

use std::fmt;

use chrono::{DateTime, Utc};

use crate::inventory::Inventory;
use crate::signal_set::SignalSet;

/// Render seconds since the epoch as a UTC calendar timestamp with
/// microsecond precision
pub fn format_timestamp(seconds: f64) -> String {
    let mut whole = seconds.floor() as i64;
    let mut nanos = ((seconds - seconds.floor()) * 1e9).round() as u32;
    if nanos >= 1_000_000_000 {
        whole += 1;
        nanos -= 1_000_000_000;
    }

    match DateTime::<Utc>::from_timestamp(whole, nanos) {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
        None => format!("{:.6} s", seconds),
    }
}

impl fmt::Display for SignalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "SignalSet: {} channel{}, {} run{}",
            self.channel_count(),
            if self.channel_count() == 1 { "" } else { "s" },
            self.nb_runs(),
            if self.nb_runs() == 1 { "" } else { "s" }
        )?;

        writeln!(f, "  Tags:")?;
        if self.tags().is_empty() {
            writeln!(f, "    (none)")?;
        }
        for (name, indices) in self.tags().iter() {
            writeln!(f, "    {:<12} -> {:?}", name, indices)?;
        }

        writeln!(f, "  Runs:")?;
        writeln!(
            f,
            "    {:>4}  {:>12}  {:<26}  {:<26}",
            "#", "rate (Hz)", "start", "stop"
        )?;
        for (i, run) in self.runs().iter().enumerate() {
            writeln!(
                f,
                "    {:>4}  {:>12}  {:<26}  {:<26}",
                i,
                run.sampling_rate(),
                format_timestamp(run.start()),
                format_timestamp(run.stop())
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Inventory: {} signal set{}, {} tag{}",
            self.len(),
            if self.len() == 1 { "" } else { "s" },
            self.tags().len(),
            if self.tags().len() == 1 { "" } else { "s" }
        )?;

        for (i, set) in self.iter().enumerate() {
            let is_last = i + 1 == self.len();
            let prefix = if is_last { "└─" } else { "├─" };
            let indent = if is_last { "   " } else { "│  " };
            let names: Vec<&str> = set.tags().names().collect();

            writeln!(
                f,
                "{} [{}] {} channels, {} runs",
                prefix,
                i,
                set.channel_count(),
                set.nb_runs()
            )?;
            writeln!(f, "{}├─ Tags: {}", indent, names.join(", "))?;
            writeln!(
                f,
                "{}└─ Rates: {:?} Hz",
                indent,
                set.sampling_rates()
            )?;
        }
        Ok(())
    }
}
