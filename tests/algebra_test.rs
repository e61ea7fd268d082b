use anyhow::Result;
use ndarray::{concatenate, Array, Axis};
use tagged_signal_toolbox::{Error, SignalSet, SyncSignal, Tags};

/// Site whose channel `c` holds `c * 1e7 + absolute sample number`, one tag per channel
fn site(names: &[&str], runs: &[(f64, f64, f64)]) -> Result<SignalSet> {
    let channels = names.len();
    let tags = Tags::new(channels, names.iter().enumerate().map(|(i, n)| (*n, vec![i])))?;

    let signals = runs
        .iter()
        .map(|&(rate, start, stop)| {
            let samples = ((stop - start) * rate).round() as usize + 1;
            let first = (start * rate).round();
            let data = Array::from_shape_fn((channels, samples), |(c, i)| {
                c as f64 * 1e7 + first + i as f64
            });
            SyncSignal::new(rate, start, data)
        })
        .collect::<tagged_signal_toolbox::Result<Vec<_>>>()?;

    Ok(SignalSet::new(tags, signals)?)
}

const SITE_A: [&str; 5] = ["E_1", "E_2", "B_1", "B_2", "B_3"];
const SITE_B: [&str; 5] = ["F_1", "F_2", "C_1", "C_2", "C_3"];

fn reference_site() -> Result<SignalSet> {
    let first = site(&SITE_A, &[(512.0, 0.0, 100.0)])?;
    let second = site(&SITE_A, &[(512.0, 120.0, 220.0)])?;
    let third = site(&SITE_A, &[(1024.0, 400.0, 450.0)])?;
    Ok(first.join(&second)?.join(&third)?)
}

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

#[test]
fn joined_runs_report_rates_and_starts() -> Result<()> {
    let set = reference_site()?;

    assert_eq!(set.nb_runs(), 3);
    assert_eq!(set.sampling_rates(), vec![512.0, 512.0, 1024.0]);
    assert_eq!(set.starts(), vec![0.0, 120.0, 400.0]);
    assert_eq!(set.stops(), vec![100.0, 220.0, 450.0]);
    assert_eq!(set.sizes(), vec![51_201, 51_201, 51_201]);
    assert_eq!(set.channel_count(), 5);
    Ok(())
}

#[test]
fn join_sorts_runs_by_start_regardless_of_order() -> Result<()> {
    let early = site(&SITE_A, &[(512.0, 0.0, 10.0)])?;
    let late = site(&SITE_A, &[(512.0, 20.0, 30.0), (256.0, 40.0, 50.0)])?;

    let ab = early.join(&late)?;
    let ba = late.join(&early)?;
    assert_eq!(ab.intervals(), ba.intervals());
    assert_eq!(ab.sampling_rates(), ba.sampling_rates());
    assert_eq!(ab.starts(), vec![0.0, 20.0, 40.0]);
    Ok(())
}

#[test]
fn join_keeps_adjacent_runs_separate() -> Result<()> {
    let first = site(&SITE_A, &[(2.0, 0.0, 10.0)])?;
    let next = site(&SITE_A, &[(2.0, 10.5, 20.0)])?;

    let joined = first.join(&next)?;
    assert_eq!(joined.nb_runs(), 2);
    assert!(joined.runs()[0].is_adjacent_or_overlapping(&joined.runs()[1]));
    Ok(())
}

#[test]
fn join_rejects_overlap_and_mismatched_tags() -> Result<()> {
    let a = site(&SITE_A, &[(512.0, 0.0, 100.0)])?;
    let overlapping = site(&SITE_A, &[(512.0, 100.0, 150.0)])?;
    let other_tags = site(&SITE_B, &[(512.0, 200.0, 250.0)])?;

    assert!(matches!(a.join(&overlapping), Err(Error::Overlap { .. })));
    assert!(matches!(overlapping.join(&a), Err(Error::Overlap { .. })));
    assert!(matches!(a.join(&other_tags), Err(Error::TagMismatch(_))));

    // runs overlapping within one operand are caught too
    let tags = a.tags().clone();
    let doubled = SignalSet::new(tags, [a.runs()[0].clone(), a.runs()[0].clone()])?;
    let empty = doubled.select_runs(&[false, false])?;
    assert!(matches!(doubled.join(&empty), Err(Error::Overlap { .. })));
    Ok(())
}

#[test]
fn extract_window_keeps_two_runs() -> Result<()> {
    let set = reference_site()?;
    let window = set.extract_t(50.0, 200.0, false);

    assert_eq!(window.nb_runs(), 2);
    assert_eq!(window.sampling_rates(), vec![512.0, 512.0]);
    assert_eq!(window.intervals(), vec![(50.0, 100.0), (120.0, 200.0)]);
    assert_eq!(window.tags(), set.tags());
    Ok(())
}

#[test]
fn exclude_window_keeps_three_runs() -> Result<()> {
    let set = reference_site()?;
    let rest = set.extract_t(50.0, 200.0, true);
    let period = 1.0 / 512.0;

    assert_eq!(rest.nb_runs(), 3);
    assert_eq!(rest.sampling_rates(), vec![512.0, 512.0, 1024.0]);

    let intervals = rest.intervals();
    assert_eq!(intervals[0].0, 0.0);
    assert!(close(intervals[0].1, 50.0, period + 1e-9));
    assert!(close(intervals[1].0, 200.0, period + 1e-9));
    assert_eq!(intervals[1].1, 220.0);
    assert_eq!(intervals[2], (400.0, 450.0));
    Ok(())
}

#[test]
fn interior_exclusion_splits_in_place() -> Result<()> {
    let set = site(&SITE_A, &[(1.0, 0.0, 10.0), (1.0, 20.0, 30.0)])?;
    let rest = set.extract_t(4.0, 6.0, true);

    assert_eq!(
        rest.intervals(),
        vec![(0.0, 3.0), (7.0, 10.0), (20.0, 30.0)]
    );
    Ok(())
}

#[test]
fn extract_and_exclude_reconstruct_the_samples() -> Result<()> {
    let original = reference_site()?;

    for (t0, t1) in [(50.0, 200.0), (10.25, 10.75), (0.0, 100.0), (430.0, 1000.0)] {
        let kept = original.extract_t(t0, t1, false);
        let removed = original.extract_t(t0, t1, true);
        let rejoined = kept.join(&removed)?;

        assert_eq!(kept.nb_runs() + removed.nb_runs(), rejoined.nb_runs());

        for run in original.runs() {
            let (start, stop) = run.interval();
            let pieces: Vec<_> = rejoined
                .runs()
                .iter()
                .filter(|r| r.same_rate(run) && r.start() >= start && r.stop() <= stop)
                .map(|r| r.to_array())
                .collect();
            let views: Vec<_> = pieces.iter().map(|p| p.view()).collect();
            let rebuilt = concatenate(Axis(1), &views)?;
            assert_eq!(rebuilt, run.to_array(), "window [{}, {}]", t0, t1);
        }
    }
    Ok(())
}

#[test]
fn masks_partition_runs() -> Result<()> {
    let set = reference_site()?;
    let mask = set.mask_rate(512.0);
    assert_eq!(&*mask, &[true, true, false]);
    assert_eq!(&*set.mask_rate(512.0 * (1.0 + 1e-12)), &[true, true, false]);
    assert_eq!(&*set.mask_rate(512.001), &[false, false, false]);

    let picked = set.select_runs(&mask)?;
    let rest = set.select_runs(&mask.negate())?;
    assert_eq!(picked.nb_runs() + rest.nb_runs(), set.nb_runs());
    assert_eq!(rest.sampling_rates(), vec![1024.0]);

    let rejoined = rest.join(&picked)?;
    assert_eq!(rejoined.intervals(), set.intervals());
    assert_eq!(rejoined.sampling_rates(), set.sampling_rates());

    let late = set.mask_where(|r| r.start() > 100.0);
    assert_eq!(set.select_runs(&late.and(&mask))?.starts(), vec![120.0]);

    assert!(matches!(set.select_runs(&[true, false]), Err(Error::Shape(_))));
    Ok(())
}

#[test]
fn tag_extraction_renumbers_channels() -> Result<()> {
    let tags = Tags::new(
        5,
        [
            ("E_1", vec![0]),
            ("E_2", vec![1]),
            ("B_1", vec![2]),
            ("B_2", vec![3]),
            ("B_3", vec![4]),
            ("E", vec![0, 1]),
            ("B", vec![2, 3, 4]),
            ("E_1B_3", vec![0, 4]),
        ],
    )?;
    let runs = reference_site()?.runs().to_vec();
    let set = SignalSet::new(tags, runs)?;

    let magnetic = set.get("B")?;
    assert_eq!(magnetic.channel_count(), 3);
    assert_eq!(magnetic.nb_runs(), 3);
    assert_eq!(magnetic.tags().lookup("B_1")?, &[0]);
    assert_eq!(magnetic.tags().lookup("B_3")?, &[2]);
    assert_eq!(magnetic.tags().lookup("B")?, &[0, 1, 2]);
    assert!(!magnetic.tags().contains("E_1B_3"));
    assert_eq!(magnetic.runs()[0].channel(0).unwrap()[0], 2e7);
    assert!(magnetic.runs()[0].shares_storage_with(&set.runs()[0]));

    let single = set.get("E_2")?;
    assert_eq!(single.channel_count(), 1);
    assert_eq!(single.tags().lookup("E_2")?, &[0]);

    let both = set.get_many(&["E_1", "B_3"])?;
    assert_eq!(both.tags().lookup("E_1B_3")?, &[0, 1]);

    assert_eq!(set.get("H").unwrap_err(), Error::UnknownTag("H".to_string()));
    Ok(())
}

#[test]
fn merge_stacks_channels_over_common_interval() -> Result<()> {
    let a = site(&SITE_A, &[(512.0, 0.0, 100.0)])?;
    let b = site(&SITE_B, &[(512.0, 50.0, 150.0)])?;

    let merged = a.merge(&b)?;
    assert_eq!(merged.channel_count(), 10);
    assert_eq!(merged.intervals(), vec![(50.0, 100.0)]);
    for (i, name) in SITE_A.iter().enumerate() {
        assert_eq!(merged.tags().lookup(name)?, &[i]);
    }
    for (i, name) in SITE_B.iter().enumerate() {
        assert_eq!(merged.tags().lookup(name)?, &[i + 5]);
    }

    let run = &merged.runs()[0];
    let first = 50.0 * 512.0;
    assert_eq!(run.channel(0).unwrap()[0], first);
    assert_eq!(run.channel(5).unwrap()[0], first);
    assert_eq!(run.channel(9).unwrap()[0], 4e7 + first);
    assert!(run.shares_storage_with(&a.runs()[0]));
    assert!(run.shares_storage_with(&b.runs()[0]));
    Ok(())
}

#[test]
fn merge_pairs_runs_by_rate() -> Result<()> {
    let a = reference_site()?;
    let b = site(&SITE_B, &[(1024.0, 0.0, 420.0), (512.0, 210.0, 500.0)])?;

    let merged = a.merge(&b)?;
    assert_eq!(merged.sampling_rates(), vec![512.0, 1024.0]);
    assert_eq!(merged.intervals(), vec![(210.0, 220.0), (400.0, 420.0)]);
    Ok(())
}

#[test]
fn merge_without_overlap_is_empty_not_an_error() -> Result<()> {
    let a = site(&SITE_A, &[(512.0, 0.0, 100.0)])?;
    let later = site(&SITE_B, &[(512.0, 200.0, 300.0)])?;
    let other_rate = site(&SITE_B, &[(256.0, 0.0, 100.0)])?;

    let none = a.merge(&later)?;
    assert!(none.is_empty());
    assert_eq!(none.channel_count(), 10);
    assert!(a.merge(&other_rate)?.is_empty());
    Ok(())
}

#[test]
fn merge_rejects_conflicting_tags() -> Result<()> {
    let a = site(&SITE_A, &[(512.0, 0.0, 100.0)])?;
    let again = site(&SITE_A, &[(512.0, 0.0, 100.0)])?;
    assert!(matches!(a.merge(&again), Err(Error::TagCollision { .. })));
    Ok(())
}

#[test]
fn merge_is_associative() -> Result<()> {
    let a = site(&["a"], &[(8.0, 0.0, 100.0), (16.0, 200.0, 300.0)])?;
    let b = site(&["b"], &[(8.0, 20.0, 60.0), (8.0, 70.0, 120.0), (16.0, 250.0, 400.0)])?;
    let c = site(&["c"], &[(8.0, 40.0, 80.0), (16.0, 180.0, 260.0)])?;

    let left = a.merge(&b)?.merge(&c)?;
    let right = a.merge(&b.merge(&c)?)?;

    assert_eq!(left.tags(), right.tags());
    assert_eq!(left.intervals(), right.intervals());
    assert_eq!(left.sampling_rates(), right.sampling_rates());
    assert_eq!(left.intervals(), vec![(40.0, 60.0), (70.0, 80.0), (250.0, 260.0)]);
    Ok(())
}

#[test]
fn chained_overlap_without_common_instant_is_empty() -> Result<()> {
    let a = site(&["a"], &[(8.0, 0.0, 10.0)])?;
    let b = site(&["b"], &[(8.0, 5.0, 15.0)])?;
    let c = site(&["c"], &[(8.0, 12.0, 20.0)])?;

    assert!(!a.merge(&b)?.is_empty());
    assert!(!b.merge(&c)?.is_empty());
    assert!(a.merge(&b)?.merge(&c)?.is_empty());
    Ok(())
}

#[test]
fn describe_and_display_summarise_the_set() -> Result<()> {
    let set = reference_site()?;

    let summary = set.describe();
    assert_eq!(summary["channel_count"], 5);
    assert_eq!(summary["nb_runs"], 3);
    assert_eq!(summary["tags"]["B_2"], serde_json::json!([3]));
    assert_eq!(summary["runs"][2]["sampling_rate"], 1024.0);

    let rendered = set.to_string();
    assert!(rendered.contains("5 channels, 3 runs"));
    assert!(rendered.contains("1970-01-01 00:02:00.000000"));
    assert!(rendered.contains("1970-01-01 00:07:30.000000"));
    Ok(())
}
