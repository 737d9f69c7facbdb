use std::{thread, time::Duration};

use anyhow::{bail, Context, Result};
use function_name::named;
use timer::{util::log, CallerName, Output, Reporter};
use tracing::info_span;

fn main() -> Result<()> {
    log::init();

    let t0 = timer::now();

    short();
    long();
    early_return(true);
    if let Err(e) = fallible() {
        println!("fallible failed: {e:#}");
    }
    labelled();
    logged();

    thread::scope(|s| {
        for i in 0..4 {
            s.spawn(move || {
                let _span = info_span!("worker", i).entered();
                let _timing = timer::timing!();
                thread::sleep(Duration::from_millis(10 * i));
            });
        }
    });

    timer::report!(t0);
    Ok(())
}

fn short() {
    let _timing = timer::timing!();
    thread::sleep(Duration::from_millis(12));
}

fn long() {
    let t0 = timer::now();
    thread::sleep(Duration::from_millis(1100));
    timer::report(t0);
}

fn early_return(skip: bool) -> u32 {
    let _timing = timer::timing!();
    if skip {
        return 0;
    }
    thread::sleep(Duration::from_millis(100));
    1
}

fn fallible() -> Result<u32> {
    let _timing = timer::timing!();
    let n: u32 = "forty-two".parse().context("parse answer")?;
    if n != 42 {
        bail!("wrong answer {n}");
    }
    Ok(n)
}

#[named]
fn labelled() {
    let reporter = Reporter::new().with_caller(CallerName::fixed(function_name!()));
    let _timing = reporter.start();
    thread::sleep(Duration::from_millis(5));
}

fn logged() {
    let reporter = Reporter::new().with_output(Output::Log);
    let _timing = timer::timing!(reporter);
    thread::sleep(Duration::from_millis(5));
}
