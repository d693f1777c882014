//! End-to-end sampling scenarios against scripted sources

mod common;

use common::{ManualClock, ScriptedRoute, TableSource};
use netspeed::{
    compose_display, format_speed, CounterReader, CounterSnapshot, DisplayConfig,
    InterfaceResolver, RateResult, RateSampler, SampleOutcome, UnitMode, PLACEHOLDER,
};

fn sampler(route: &ScriptedRoute, table: &TableSource, clock: &ManualClock) -> RateSampler {
    RateSampler::new(
        InterfaceResolver::new(route.clone()),
        CounterReader::new(table.clone()),
        clock.clone(),
    )
}

/// Baseline 1,000,000 at t=0, 1,512,000 at t=1s renders 500.0 KB/s
#[test]
fn test_download_rate_end_to_end() {
    let route = ScriptedRoute::via("eth0");
    let table = TableSource::default();
    let clock = ManualClock::default();

    table.set_counters("eth0", 1_000_000, 0);
    let mut sampler = sampler(&route, &table, &clock);
    assert_eq!(sampler.interface(), Some("eth0"));

    table.set_counters("eth0", 1_512_000, 0);
    clock.set_secs(1.0);

    let rates = sampler.sample().display_rates().expect("rate expected");
    assert_eq!(rates.rx_bytes_per_sec, 512_000.0);
    assert_eq!(format_speed(rates.rx_bytes_per_sec, UnitMode::Auto), "500.0 KB/s");
    assert_eq!(
        compose_display(&DisplayConfig::default(), &rates),
        "↓ 500.0 KB/s  ↑ 0.0 KB/s"
    );
}

#[test]
fn test_hidden_directions_show_placeholder() {
    let config = DisplayConfig {
        show_download: false,
        show_upload: false,
        ..DisplayConfig::default()
    };
    for rates in [
        RateResult::zero(),
        RateResult::new(512_000.0, 1024.0),
        RateResult::new(1e12, 1e12),
    ] {
        assert_eq!(compose_display(&config, &rates), PLACEHOLDER);
    }
}

/// A 15 second gap yields nothing to display but moves the baseline
#[test]
fn test_suspend_gap_discarded() {
    let route = ScriptedRoute::via("eth0");
    let table = TableSource::default();
    let clock = ManualClock::default();

    table.set_counters("eth0", 1000, 1000);
    let mut sampler = sampler(&route, &table, &clock);

    table.set_counters("eth0", 90_000_000, 2000);
    clock.set_secs(15.0);
    let outcome = sampler.sample();
    assert_eq!(outcome, SampleOutcome::Discarded);
    assert_eq!(outcome.display_rates(), None);
    assert_eq!(
        sampler.state().last_snapshot,
        CounterSnapshot::new(90_000_000, 2000, 15_000_000)
    );
}

#[test]
fn test_counter_reset_between_cycles() {
    let route = ScriptedRoute::via("eth0");
    let table = TableSource::default();
    let clock = ManualClock::default();

    table.set_counters("eth0", 5000, 5000);
    let mut sampler = sampler(&route, &table, &clock);

    table.set_counters("eth0", 200, 6000);
    clock.set_secs(1.0);
    assert_eq!(
        sampler.sample(),
        SampleOutcome::Rate(RateResult::new(200.0, 1000.0))
    );
}

#[test]
fn test_unresolvable_route_yields_zero_rates() {
    let route = ScriptedRoute::default();
    let table = TableSource::default();
    let clock = ManualClock::default();
    table.set_counters("eth0", 123_456, 654_321);

    let mut sampler = sampler(&route, &table, &clock);
    clock.set_secs(1.0);

    let outcome = sampler.sample();
    assert_eq!(outcome, SampleOutcome::NoInterface);
    assert_eq!(
        compose_display(&DisplayConfig::default(), &outcome.display_rates().unwrap()),
        "↓ 0.0 KB/s  ↑ 0.0 KB/s"
    );
    // Resolution is retried every cycle while nothing is known
    assert_eq!(route.calls(), 2);
}

#[test]
fn test_virtual_egress_is_not_sampled() {
    let route = ScriptedRoute::via("docker0");
    let table = TableSource::default();
    let clock = ManualClock::default();
    table.set_counters("docker0", 1, 1);

    let mut sampler = sampler(&route, &table, &clock);
    assert_eq!(sampler.interface(), None);
    clock.set_secs(1.0);
    assert_eq!(sampler.sample(), SampleOutcome::NoInterface);
}

#[test]
fn test_missing_stats_line_reads_as_zero() {
    let route = ScriptedRoute::via("wlan0");
    let table = TableSource::default();
    let clock = ManualClock::default();
    table.set_counters("eth0", 4096, 4096);

    let mut sampler = sampler(&route, &table, &clock);
    assert_eq!(sampler.state().last_snapshot, CounterSnapshot::new(0, 0, 0));

    clock.set_secs(1.0);
    assert_eq!(sampler.sample(), SampleOutcome::Rate(RateResult::zero()));
}

/// Handover from Wi-Fi to Ethernet is picked up on the tenth cycle
#[test]
fn test_interface_handover_within_ten_cycles() {
    let route = ScriptedRoute::via("wlan0");
    let table = TableSource::default();
    let clock = ManualClock::default();
    table.set_counters("wlan0", 0, 0);

    let mut sampler = sampler(&route, &table, &clock);
    route.set_device(Some("eth0"));

    for cycle in 1..10 {
        clock.set_secs(f64::from(cycle));
        sampler.sample();
        assert_eq!(sampler.interface(), Some("wlan0"));
    }

    table.set_counters("eth0", 0, 0);
    clock.set_secs(10.0);
    sampler.sample();
    assert_eq!(sampler.interface(), Some("eth0"));
    assert_eq!(route.calls(), 2);

    // Route lookups failing later keep the last known interface
    route.set_device(None);
    for cycle in 11..=20 {
        clock.set_secs(f64::from(cycle));
        sampler.sample();
    }
    assert_eq!(sampler.interface(), Some("eth0"));
    assert_eq!(route.calls(), 3);
}
