use netspeed::{compose_display, DisplayConfig, RateSampler, SampleOutcome};
use std::thread;

fn main() -> netspeed::Result<()> {
    let config = DisplayConfig::default();
    let mut sampler = RateSampler::system();
    println!("Interface: {}", sampler.interface().unwrap_or("none"));

    // Monitor bandwidth for 30 seconds
    for _ in 0..30 {
        thread::sleep(config.timer_period());

        match sampler.sample() {
            SampleOutcome::Rate(rates) => println!("{}", compose_display(&config, &rates)),
            SampleOutcome::NoInterface => println!("No active interface"),
            SampleOutcome::Discarded => println!("(sample discarded)"),
        }
    }

    Ok(())
}
