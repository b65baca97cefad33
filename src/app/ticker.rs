use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use async_channel::{Receiver, Sender};
use log::{debug, info};
use rust_decimal::Decimal;
use time::Time;

use crate::app::calculator::{earned_today, Salary, WorkingHours};

/// Background thread recomputing earned-today once per period until cancelled.
pub struct Ticker {
    cancel: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Hands a value to `sink` right away, then once per `period`. A sink error stops the ticker.
    pub fn start<C, S>(
        salary: Salary,
        hours: WorkingHours,
        clock: C,
        period: Duration,
        sink: S,
    ) -> Result<Self>
    where
        C: Fn() -> Time + Send + 'static,
        S: FnMut(Decimal) -> Result<()> + Send + 'static,
    {
        let (cancel, cancelled) = async_channel::bounded(1);
        let handle = thread::Builder::new()
            .name("earnings-ticker".to_owned())
            .spawn(move || run(salary, hours, clock, period, sink, cancelled))?;

        info!("earnings ticker started for {hours}, every {period:?}");

        Ok(Self {
            cancel,
            handle: Some(handle),
        })
    }

    pub fn cancel(&self) {
        if self.cancel.close() {
            debug!("earnings ticker cancelled");
        }
        if let Some(handle) = &self.handle {
            handle.thread().unpark();
        }
    }

    /// Waits for the thread to exit. Does not cancel by itself.
    pub fn join(mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow!("earnings ticker panicked")),
            None => Ok(()),
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn run<C, S>(
    salary: Salary,
    hours: WorkingHours,
    clock: C,
    period: Duration,
    mut sink: S,
    cancelled: Receiver<()>,
) where
    C: Fn() -> Time,
    S: FnMut(Decimal) -> Result<()>,
{
    loop {
        let earned = earned_today(&salary, &hours, clock());
        debug!("earned today: {earned}");
        if let Err(e) = sink(earned) {
            info!("earnings ticker stopped: {e}");
            return;
        }

        // park_timeout may wake early, so sleep until the deadline unless cancelled.
        let deadline = Instant::now() + period;
        loop {
            if cancelled.is_closed() {
                info!("earnings ticker stopped");
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::park_timeout(deadline - now);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use anyhow::bail;
    use time::macros::time;

    use super::*;
    use crate::app::calculator::{calculate_income, parse_working_hours};

    const FAST: Duration = Duration::from_millis(5);

    fn office() -> (Salary, WorkingHours) {
        let hours = parse_working_hours("08:00-17:00");
        (calculate_income(24000, &hours).unwrap(), hours)
    }

    #[test]
    fn delivers_earnings_from_clock() {
        let (salary, hours) = office();
        let (tx, rx) = async_channel::unbounded();

        let ticker = Ticker::start(salary, hours, || time!(9:30:15), FAST, move |earned| {
            tx.try_send(earned)?;
            Ok(())
        })
        .unwrap();

        let expected = Decimal::from(5415) * salary.secondly;
        for _ in 0..3 {
            assert_eq!(rx.recv_blocking().unwrap(), expected);
        }

        ticker.cancel();
        ticker.join().unwrap();
    }

    #[test]
    fn sink_failure_stops_ticker() {
        let (salary, hours) = office();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let ticker = Ticker::start(salary, hours, || time!(18:00), FAST, move |_| {
            if seen.fetch_add(1, Ordering::SeqCst) == 1 {
                bail!("display closed");
            }
            Ok(())
        })
        .unwrap();

        ticker.join().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cancel_interrupts_long_period() {
        let (salary, hours) = office();
        let ticker = Ticker::start(
            salary,
            hours,
            || time!(12:00),
            Duration::from_secs(3600),
            |_| Ok(()),
        )
        .unwrap();

        let started = Instant::now();
        ticker.cancel();
        ticker.join().unwrap();
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[test]
    fn dropping_ticker_releases_sink() {
        let (salary, hours) = office();
        let (tx, rx) = async_channel::unbounded();

        let ticker = Ticker::start(salary, hours, || time!(7:00), FAST, move |earned| {
            tx.try_send(earned)?;
            Ok(())
        })
        .unwrap();
        assert_eq!(rx.recv_blocking().unwrap(), Decimal::ZERO);

        drop(ticker);
        while rx.recv_blocking().is_ok() {}
        assert!(rx.is_closed());
    }
}
