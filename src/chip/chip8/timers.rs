use std::io;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, tick, Sender};
use log::{debug, info};

/// The delay and sound timers of a CHIP-8.
///
/// Both timers are atomics so that a timer thread can decrement them while the
/// executor reads and writes them from another thread.
#[derive(Debug, Default)]
pub struct Timers {
    delay: AtomicU8,
    sound: AtomicU8,
}

impl Timers {
    pub fn new() -> Self {
        Timers::default()
    }

    /// Decrements both timers by one. Timers that already reached zero stay at zero.
    pub fn tick(&self) {
        fn decrement(timer: &AtomicU8) {
            // fails if the timer is already at zero, which is exactly what we want
            let _ = timer.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |value| {
                value.checked_sub(1)
            });
        }

        decrement(&self.delay);
        decrement(&self.sound);
    }

    pub fn delay(&self) -> u8 {
        self.delay.load(Ordering::SeqCst)
    }

    pub fn set_delay(&self, value: u8) {
        self.delay.store(value, Ordering::SeqCst);
    }

    pub fn sound(&self) -> u8 {
        self.sound.load(Ordering::SeqCst)
    }

    pub fn set_sound(&self, value: u8) {
        self.sound.store(value, Ordering::SeqCst);
    }

    /// Whether a beep should currently be audible.
    pub fn sound_active(&self) -> bool {
        self.sound() > 0
    }
}

/// The time between two ticks at the given frequency.
fn tick_period(frequency_hz: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(frequency_hz.max(1)))
}

/// A dedicated thread ticking a set of timers at a fixed frequency. The thread
/// is stopped and joined when this handle is dropped.
#[derive(Debug)]
pub struct TimerThread {
    shutdown_sender: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl TimerThread {
    /// Spawns a thread that ticks `timers` `frequency_hz` times per second.
    pub fn spawn(timers: Arc<Timers>, frequency_hz: u32) -> io::Result<Self> {
        let (shutdown_sender, shutdown_receiver) = bounded::<()>(1);
        let ticker = tick(tick_period(frequency_hz));

        let handle = thread::Builder::new()
            .name("chip8-timers".to_string())
            .spawn(move || {
                info!("Timer thread started at {}Hz", frequency_hz);
                loop {
                    select! {
                        recv(ticker) -> _ => timers.tick(),
                        recv(shutdown_receiver) -> _ => break,
                    }
                }
                debug!("Timer thread stopped");
            })?;

        Ok(TimerThread {
            shutdown_sender,
            handle: Some(handle),
        })
    }
}

impl Drop for TimerThread {
    fn drop(&mut self) {
        // the thread also stops if it already dropped the receiving end
        let _ = self.shutdown_sender.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Keeps track of timer ticks for hosts that run the CPU and the timers on the
/// same thread. The host asks how many ticks became due since it last asked and
/// ticks the timers that often, no matter how many cycles it executed meanwhile.
#[derive(Debug, Clone)]
pub struct TimerClock {
    period: Duration,
    next_tick: Instant,
}

impl TimerClock {
    pub fn new(frequency_hz: u32, now: Instant) -> Self {
        let period = tick_period(frequency_hz);
        TimerClock {
            period,
            next_tick: now + period,
        }
    }

    /// Returns the number of ticks that became due up to `now`.
    pub fn due_ticks(&mut self, now: Instant) -> u32 {
        if now < self.next_tick {
            return 0;
        }

        let behind = (now - self.next_tick).as_nanos() / self.period.as_nanos();
        let ticks = u32::try_from(behind + 1).unwrap_or(u32::MAX);
        self.next_tick += self.period * ticks;
        ticks
    }
}
