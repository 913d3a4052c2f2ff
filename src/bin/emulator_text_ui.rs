use std::io;
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::{bounded, Receiver, Sender};
use cursive::view::Nameable;
use cursive::views::Dialog;
use cursive::{CbSink, Cursive};
use log::{info, warn, LevelFilter};
use thiserror::Error;
use ux::u4;

use chip8_vm::chip::{
    chip8::{
        config::Config,
        cursive_display::{Display, DISPLAY_VIEW_NAME},
        timers::{TimerClock, TimerThread},
        Chip8,
    },
    Chip, ChipWithCursiveDisplay, LoadProgramError,
};

#[derive(Parser)]
#[command(name = "emulator_text_ui")]
#[command(about = "Runs a CHIP-8 program in the terminal")]
struct Args {
    /// Path to the program to load.
    rom: PathBuf,

    /// Use the S-CHIP semantics of the shift and bulk load/store instructions.
    #[arg(long)]
    schip_compatible: bool,

    /// Tick the timers from the event loop instead of a dedicated thread.
    #[arg(long)]
    cooperative_timers: bool,

    /// Initial sleep time after each cycle in milliseconds.
    #[arg(long, default_value_t = 1)]
    cycle_sleep_ms: u64,

    /// Maximum level of the messages shown in the debug console (~).
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

/// Errors that prevent the emulator from starting up.
#[derive(Debug, Error)]
enum Error {
    #[error(transparent)]
    InvalidProgram(#[from] LoadProgramError),

    #[error("Could not start the timer thread: {0}")]
    TimerThread(#[from] io::Error),
}

/// Represents an event to be processed by the event loop. It is generic
/// over the type representing the pressed key.
enum Event<T> {
    /// Occurs when the key passed in the enum value was pressed.
    Key(T),

    /// Indicates that all keys are released. Note that this is a
    /// hack because OS X currently requires extra permissions to
    /// listen to key down/up events. To get around this we simply
    /// read the stdin (indirectly via registering for cursive
    /// events) and assign one key to trigger releasing all keys.
    KeyRelease,

    /// Decreases the sleep time after each cycle.
    SpeedUp,

    /// Increases the sleep time after each cycle.
    SlowDown,

    /// Shut down.
    Quit,
}

/// Represents the channels available to the event loop. It is generic
/// over the type representing the pressed keys.
struct EventLoopChannels<T> {
    /// The channel to send the UI refresh messages to.
    gfx_sender: CbSink,

    /// The channel on which the Events are received.
    key_receiver: Receiver<Event<T>>,

    /// A channel to report that the thread has completed
    /// shutdown.
    shutdown_sender: Sender<()>,
}

/// How the event loop runs the chip.
struct EventLoopSettings {
    /// Initial sleep time after each cycle in milliseconds.
    cycle_sleep_ms: u64,

    /// Ticks the timers from within the event loop if set. Otherwise the
    /// timers are expected to be ticked elsewhere.
    timer_clock: Option<TimerClock>,
}

/// The event loop. Constantly loops over (1) process event if there
/// is any. (2) Tick the timers, if they are ticked cooperatively.
/// (3) Invoke step on the chip. (4) Update the UI. (5) Sleep for the
/// cycle sleep time. (6) Start over.
fn event_loop<T, P, M>(mut chip: T, io_channels: EventLoopChannels<P>, settings: EventLoopSettings)
where
    T: Chip<PinAddress = P, MemoryAddress = M> + ChipWithCursiveDisplay,
{
    let EventLoopSettings {
        mut cycle_sleep_ms,
        mut timer_clock,
    } = settings;
    let mut halted = false;

    loop {
        match io_channels.key_receiver.try_recv() {
            Ok(Event::Key(key)) => {
                chip.set_input_pin(key, true);
            }
            Ok(Event::KeyRelease) => {
                chip.reset_input_pins();
            }
            Ok(Event::Quit) => {
                if io_channels.shutdown_sender.send(()).is_err() {
                    warn!("Failed to report orderly shutdown");
                }
                return;
            }
            Ok(Event::SpeedUp) => {
                if cycle_sleep_ms > 5 {
                    cycle_sleep_ms -= 5;
                }
            }
            Ok(Event::SlowDown) => {
                cycle_sleep_ms += 5;
            }
            Err(_) => { /* do nothing */ }
        };

        if let Some(clock) = timer_clock.as_mut() {
            for _ in 0..clock.due_ticks(Instant::now()) {
                chip.tick_timers();
            }
        }

        if !halted {
            if let Err(e) = chip.step() {
                halted = true;
                let message = format!("The CHIP-8 halted.\n\n{}", e);
                let sent = io_channels.gfx_sender.send(Box::new(move |s: &mut Cursive| {
                    s.add_layer(Dialog::info(message));
                }));
                if sent.is_err() {
                    warn!("Reporting the halted CHIP-8 failed");
                }
            }
        }
        chip.update_ui(&io_channels.gfx_sender);

        thread::sleep(Duration::from_millis(cycle_sleep_ms));
    }
}

/// Sends `event` to the event loop, which is gone only if it already shut down.
fn send_event<T>(sender: &Sender<Event<T>>, event: Event<T>) {
    if sender.send(event).is_err() {
        warn!("Event loop is not running");
    }
}

/// Loads the program, constructs the UI and spawns the event loop. Returns
/// once the UI was closed.
fn run(args: Args) -> Result<(), Error> {
    let config = Config {
        schip_compatible: args.schip_compatible,
        ..Config::default()
    };
    let mut chip8 = Chip8::with_config(config);
    let loaded = chip8.load_program(&args.rom)?;
    info!("Loaded {} bytes from {}", loaded, args.rom.display());

    // dropping the timer thread at the end of this function stops it
    let (_timer_thread, timer_clock) = if args.cooperative_timers {
        let clock = TimerClock::new(config.timer_frequency_hz, Instant::now());
        (None, Some(clock))
    } else {
        let timer_thread = TimerThread::spawn(chip8.timers(), config.timer_frequency_hz)?;
        (Some(timer_thread), None)
    };

    let display = Display::new(chip8.read_output_pins());
    let mut siv = cursive::default();

    let cb_sink = siv.cb_sink().clone();
    let (key_sender, key_receiver) = bounded::<Event<u4>>(10);
    let (shutdown_sender, shutdown_receiver) = bounded::<()>(1);

    let settings = EventLoopSettings {
        cycle_sleep_ms: args.cycle_sleep_ms,
        timer_clock,
    };
    thread::Builder::new()
        .name("chip8-event-loop".to_string())
        .spawn(move || {
            event_loop(
                chip8,
                EventLoopChannels {
                    gfx_sender: cb_sink,
                    key_receiver,
                    shutdown_sender,
                },
                settings,
            );
        })?;

    let sender = key_sender.clone();
    siv.add_global_callback(cursive::event::Key::Esc, move |s| {
        send_event(&sender, Event::Quit);
        if shutdown_receiver.recv().is_err() {
            warn!("Event loop did not shut down orderly");
        }
        s.quit();
    });

    for (i, j) in [
        ('1', 0x1),
        ('2', 0x2),
        ('3', 0x3),
        ('4', 0xC),
        ('q', 0x4),
        ('w', 0x5),
        ('e', 0x6),
        ('r', 0xD),
        ('a', 0x7),
        ('s', 0x8),
        ('d', 0x9),
        ('f', 0xE),
        ('z', 0xA),
        ('x', 0x0),
        ('c', 0xB),
        ('v', 0xF),
    ] {
        let sender = key_sender.clone();
        let key = u4::new(j);
        siv.add_global_callback(i, move |_s| {
            send_event(&sender, Event::Key(key));
        });
    }

    let sender = key_sender.clone();
    siv.add_global_callback(' ', move |_s| {
        send_event(&sender, Event::KeyRelease);
    });

    let sender = key_sender.clone();
    siv.add_global_callback(cursive::event::Key::Up, move |_s| {
        send_event(&sender, Event::SpeedUp);
    });

    let sender = key_sender;
    siv.add_global_callback(cursive::event::Key::Down, move |_s| {
        send_event(&sender, Event::SlowDown);
    });

    siv.add_global_callback('~', Cursive::toggle_debug_console);

    let mut title = format!("CHIP-8: {}", args.rom.display());
    if config.schip_compatible {
        title.push_str(" [S-Chip Semantics Compatible]");
    }
    siv.set_window_title(title);
    siv.add_layer(display.with_name(DISPLAY_VIEW_NAME));

    siv.run();
    Ok(())
}

fn main() {
    let args = Args::parse();

    cursive::logger::init();
    log::set_max_level(args.log_level);

    if let Err(e) = run(args) {
        eprintln!("{}", e);
        process::exit(1);
    }
}
