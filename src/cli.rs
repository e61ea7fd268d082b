use anyhow::Result;
use clap::Parser;

use crate::synth::{parse_run_spec, RunSpec};

#[derive(Parser, Clone, Debug)]
#[command(name = "sigpack")]
#[command(about = "Search and pack multi-site recordings into synchronous signal groups")]
#[command(version)]
pub struct Args {
    #[arg(
        long = "site",
        required = true,
        help = "Site and its runs as NAME=RATE:START:STOP[,RATE:START:STOP...] (repeatable)"
    )]
    pub sites: Vec<String>,

    #[arg(
        long,
        default_value = "Ex,Ey,Hx,Hy,Hz",
        help = "Comma-separated channel components recorded at every site"
    )]
    pub components: String,

    #[arg(
        long,
        num_args = 1..,
        conflicts_with = "filter",
        help = "Keep only the channels named by these tags"
    )]
    pub select: Vec<String>,

    #[arg(long, help = "Keep only the channels whose tags match a shell wildcard")]
    pub filter: Option<String>,

    #[arg(long, help = "Restrict every run to the time window T0:T1 (seconds)")]
    pub window: Option<String>,

    #[arg(long, requires = "window", help = "Cut the --window out instead of keeping it")]
    pub exclude: bool,

    #[arg(long, default_value = "42", help = "Seed for the synthetic samples")]
    pub seed: u64,

    #[arg(long, help = "Print the packed set as JSON")]
    pub json: bool,

    #[arg(long, short = 'q', help = "Minimal output mode")]
    pub quiet: bool,
}

/// One `--site` argument
#[derive(Debug, Clone, PartialEq)]
pub struct SiteSpec {
    pub name: String,
    pub runs: Vec<RunSpec>,
}

impl Args {
    pub fn site_specs(&self) -> Result<Vec<SiteSpec>> {
        self.sites.iter().map(|s| parse_site_spec(s)).collect()
    }

    pub fn component_names(&self) -> Vec<&str> {
        self.components
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect()
    }

    pub fn time_window(&self) -> Result<Option<(f64, f64)>> {
        self.window.as_deref().map(parse_window).transpose()
    }

    pub fn selected_tags(&self) -> Vec<&str> {
        self.select.iter().map(String::as_str).collect()
    }
}

/// Parse `NAME=RATE:START:STOP[,RATE:START:STOP...]`
pub fn parse_site_spec(spec: &str) -> Result<SiteSpec> {
    let (name, runs) = spec
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Site must be written NAME=RATE:START:STOP[,...], got '{}'", spec))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow::anyhow!("Site name missing in '{}'", spec));
    }

    let runs = runs
        .split(',')
        .map(|r| parse_run_spec(r.trim()))
        .collect::<crate::Result<Vec<_>>>()?;

    Ok(SiteSpec {
        name: name.to_string(),
        runs,
    })
}

/// Parse a time window as `T0:T1`
pub fn parse_window(window: &str) -> Result<(f64, f64)> {
    let parts: Vec<&str> = window.split(':').collect();
    if parts.len() != 2 {
        return Err(anyhow::anyhow!("Time window must be in format 'T0:T1'"));
    }

    let t0: f64 = parts[0]
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid window start"))?;
    let t1: f64 = parts[1]
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid window end"))?;

    if t0 >= t1 {
        return Err(anyhow::anyhow!("Window start must be before window end"));
    }

    Ok((t0, t1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sites_and_windows() {
        let site = parse_site_spec("s1=512:0:100, 1024:400:450").unwrap();
        assert_eq!(site.name, "s1");
        assert_eq!(site.runs.len(), 2);
        assert_eq!(site.runs[1], RunSpec::new(1024.0, 400.0, 450.0));

        assert!(parse_site_spec("512:0:100").is_err());
        assert!(parse_site_spec("=512:0:100").is_err());

        assert_eq!(parse_window("50:200").unwrap(), (50.0, 200.0));
        assert!(parse_window("200:50").is_err());
        assert!(parse_window("50").is_err());
    }

    #[test]
    fn arguments_parse() {
        let args = Args::try_parse_from([
            "sigpack",
            "--site",
            "a=512:0:10",
            "--site",
            "b=512:5:20",
            "--components",
            "Ex, Ey",
            "--window",
            "2:8",
            "--exclude",
        ])
        .unwrap();
        assert_eq!(args.site_specs().unwrap().len(), 2);
        assert_eq!(args.component_names(), ["Ex", "Ey"]);
        assert_eq!(args.time_window().unwrap(), Some((2.0, 8.0)));
        assert!(args.exclude);

        assert!(Args::try_parse_from(["sigpack"]).is_err());
        assert!(Args::try_parse_from(["sigpack", "--site", "a=1:0:1", "--exclude"]).is_err());
    }
}
