//! Tagged Signal Toolbox - time-series algebra for multi-site, multi-rate recordings
//!
//! This crate assembles scattered multichannel recordings (for example the electric
//! and magnetic field components recorded at several sites, each with runs at
//! different sampling rates and time spans) into named, synchronized groupings ready
//! for downstream processing.
//!
//! # Overview
//!
//! Data flows bottom-up:
//!
//! - [`SyncSignal`] - one homogeneously sampled block: every channel shares the
//!   sampling rate, start time and sample count
//! - [`Tags`] - ordered registry naming groups of channel indices
//! - [`SignalSet`] - a registry bound to a sequence of runs over the same channels
//! - [`Inventory`] - a collection of signal sets, searched by tag and packed into
//!   the largest mutually synchronous set
//!
//! Raw sample blocks are reference counted. Slicing a run in time or picking a
//! subset of its channels produces a view over the original block, so chaining
//! `join`, `extract_t` and `merge` never copies samples.
//!
//! # Key Features
//!
//! - **Channel naming** with arbitrary, possibly overlapping tag groups
//! - **Run algebra**: join, time extraction and exclusion, run masks
//! - **Synchronous intersection** of sets recorded over different channels
//! - **Wildcard search** over the tags of a whole inventory
//! - **Packing** into a single set, or a clear `None` when no common run exists
//!
//! # Library Usage
//!
//! ```
//! use ndarray::Array2;
//! use tagged_signal_toolbox::{SignalSet, SyncSignal, Tags};
//!
//! # fn main() -> tagged_signal_toolbox::Result<()> {
//! let tags = Tags::new(2, [("Ex", vec![0]), ("Ey", vec![1])])?;
//! let first = SyncSignal::new(512.0, 0.0, Array2::zeros((2, 51_201)))?;
//! let second = SyncSignal::new(512.0, 120.0, Array2::zeros((2, 51_201)))?;
//!
//! let site = SignalSet::new(tags.clone(), [first])?.join(&SignalSet::new(tags, [second])?)?;
//! assert_eq!(site.nb_runs(), 2);
//!
//! let window = site.extract_t(50.0, 200.0, false);
//! assert_eq!(window.intervals(), vec![(50.0, 100.0), (120.0, 200.0)]);
//! # Ok(())
//! # }
//! ```
//!
//! # Command-Line Tools
//!
//! - `sigpack` - build an inventory of synthetic sites, search it and pack it
//! - `sigpack-walkthrough` - step through the reference three-run scenario
//!
//! ```bash
//! sigpack --site s1=512:0:100,512:120:220,1024:400:450 \
//!         --site s2=512:50:300 \
//!         --filter 's*_E*'
//! ```
//!
//! # License
//!
//! This project is licensed under the GNU General Public License v3.0 or later.

pub mod cli;
pub mod display;
pub mod error;
pub mod inventory;
pub mod mask;
pub mod signal;
pub mod signal_set;
pub mod synth;
pub mod tags;

pub use error::{Error, Result};
pub use inventory::Inventory;
pub use mask::RunMask;
pub use signal::SyncSignal;
pub use signal_set::{RunInfo, SignalSet};
pub use tags::Tags;

use chrono::Datelike;

/// Display GPL license notice for a program
pub fn display_license_notice(program_name: &str) {
	let version = env!("CARGO_PKG_VERSION");
	let current_year = chrono::Utc::now().year();
	let copyright_year = if current_year == 2026 {
		"2026".to_string()
	} else {
		format!("2026-{}", current_year)
	};

	println!("{} {} Copyright (C) {} the Tagged Signal Toolbox authors", program_name, version, copyright_year);
	println!("This program comes with ABSOLUTELY NO WARRANTY.");
	println!("For details see https://www.gnu.org/licenses/gpl-3.0.html#license-text.");
	println!("This is free software, and you are welcome to redistribute it under certain conditions.");
	println!();
}
