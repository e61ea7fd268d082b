//! Sigpack - search and pack multi-site recordings
//!
//! Builds an inventory of synthetic recording sites from the command line,
//! optionally narrows it down by tag or time window, and packs it into the
//! largest mutually synchronous signal set.
//!
//! # Usage
//!
//! ```bash
//! # Two sites sharing a 512 Hz window
//! sigpack --site s1=512:0:100,512:120:220,1024:400:450 --site s2=512:50:300
//!
//! # Only the electric channels
//! sigpack --site s1=512:0:100 --site s2=512:50:300 --filter '*_E?'
//!
//! # Named tags, with a time window cut out before packing
//! sigpack --site s1=512:0:100 --site s2=512:50:300 --select s1_Ex s2 \
//!         --window 60:70 --exclude
//!
//! # Machine-readable result
//! sigpack --site s1=512:0:100 --site s2=512:50:300 --json --quiet
//! ```
//!
//! Every site records the same `--components` (default `Ex,Ey,Hx,Hy,Hz`).
//! Tags are `<site>_<component>` for each channel and `<site>` for the whole
//! site. When no instant has every selected channel available at a common
//! sampling rate, the tool says so and exits successfully.

use anyhow::Result;
use clap::Parser;

use tagged_signal_toolbox::cli::Args;
use tagged_signal_toolbox::synth::synthetic_site;
use tagged_signal_toolbox::Inventory;

fn main() -> Result<()> {
    let args = Args::parse();

    if !args.quiet {
        tagged_signal_toolbox::display_license_notice("sigpack");
        tracing_subscriber::fmt::init();
    }

    let components = args.component_names();
    if components.is_empty() {
        return Err(anyhow::anyhow!("At least one component is required"));
    }

    let mut rng = fastrand::Rng::with_seed(args.seed);
    let mut inventory = args
        .site_specs()?
        .iter()
        .map(|site| synthetic_site(&site.name, &components, &site.runs, &mut rng))
        .collect::<tagged_signal_toolbox::Result<Inventory>>()?;

    if let Some((t0, t1)) = args.time_window()? {
        inventory = inventory
            .iter()
            .map(|set| set.extract_t(t0, t1, args.exclude))
            .collect();
    }

    let selected = args.selected_tags();
    if !selected.is_empty() {
        inventory = inventory.select_channels(&selected)?;
    } else if let Some(pattern) = &args.filter {
        inventory = inventory.filter(pattern)?;
    }

    if !args.quiet {
        println!("{}", inventory);
    }

    match inventory.pack()? {
        Some(packed) if args.json => {
            println!("{}", serde_json::to_string_pretty(&packed.describe())?);
        }
        Some(packed) => {
            println!("{}", packed);
            println!(
                "Packed {} channels into {} run{} ({:.3} s in total)",
                packed.channel_count(),
                packed.nb_runs(),
                if packed.nb_runs() == 1 { "" } else { "s" },
                packed.total_duration()
            );
        }
        None if args.json => println!("null"),
        None => {
            println!("No common synchronous run: no instant has every selected channel");
            println!("available at a shared sampling rate.");
            println!("Hint: narrow the inventory with --select or --filter");
        }
    }

    Ok(())
}
