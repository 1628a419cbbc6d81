//! detentd: encoder menu daemon
//!
//! Usage: `detentd [config.toml]`. Log level via `RUST_LOG`.

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use env_logger::Env;
use log::{error, info};

use detent_core::mode::{CyclicHandler, DirectHandler, Gauge, SubmenuEntry, SubmenuHandler};
use detent_core::{CommandOutcome, Config, Direction, Icons, MenuStateMachine, RegistryError};
use detent_host::hid::HidConnector;
use detent_host::{event_queue, AppError, EventRouter, LogRenderer, MonotonicClock, TransportChannel};
use detent_protocol::Rgb;

const MEDIA_COLOR: Rgb = Rgb::new(255, 50, 255);
const VOLUME_COLOR: Rgb = Rgb::new(0, 255, 100);
const WINDOW_COLOR: Rgb = Rgb::new(50, 255, 50);

const VOLUME_STEP: u8 = 2;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let config = match std::env::args_os().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let mut machine = MenuStateMachine::new(&config);
    install_menu(&mut machine)?;
    info!("{} commands registered", machine.registry().len());

    let (events_tx, events_rx) = event_queue(config.queue_capacity);
    let connector = HidConnector::new(config.device)?;
    let channel = TransportChannel::spawn(connector, &config, events_tx)?;

    let mut router = EventRouter::new(machine, LogRenderer, MonotonicClock::default(), &config);
    if config.led_feedback {
        router = router.with_led(channel.sender());
    }
    router.start();

    // Runs until the process is killed
    let (_stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
    router.run(&events_rx, &channel.link_status(), &stop_rx);

    channel.join();
    Ok(())
}

/// Volume, media and window management; the actions only log
fn install_menu(machine: &mut MenuStateMachine) -> Result<(), RegistryError> {
    machine.register_command("Volume", || Ok(CommandOutcome::EnterMode("volume".into())))?;
    machine.register_command("Media", || Ok(CommandOutcome::EnterMode("media".into())))?;
    machine.register_command("Window", || Ok(CommandOutcome::EnterMode("window".into())))?;
    machine.register_command("Lock Screen", || {
        info!("lock screen");
        Ok(CommandOutcome::Done)
    })?;

    let level = Arc::new(AtomicU8::new(50));
    let muted = Arc::new(AtomicBool::new(false));
    let volume = {
        let (rotate_level, gauge_level) = (Arc::clone(&level), Arc::clone(&level));
        let (press_muted, gauge_muted) = (Arc::clone(&muted), Arc::clone(&muted));
        DirectHandler::new("Volume", ["Volume Down", "Mute", "Volume Up"], move |dir| {
            let current = rotate_level.load(Ordering::Relaxed);
            let next = match dir {
                Direction::Cw => current.saturating_add(VOLUME_STEP).min(100),
                Direction::Ccw => current.saturating_sub(VOLUME_STEP),
            };
            rotate_level.store(next, Ordering::Relaxed);
            info!("volume {next}%");
            Ok(())
        })
        .on_press(move || {
            let was = press_muted.fetch_xor(true, Ordering::Relaxed);
            info!("mute {}", !was);
            Ok(())
        })
        .with_gauge(move || {
            let percent = gauge_level.load(Ordering::Relaxed);
            Ok(Gauge {
                label: format!("{percent}%"),
                level: f32::from(percent) / 100.0,
                title: gauge_muted
                    .load(Ordering::Relaxed)
                    .then(|| "🔇 Muted".to_string()),
            })
        })
        .with_icons(Icons::new("🔉", "🔇", "🔊"))
        .with_accent(VOLUME_COLOR)
    };
    machine.register_mode_handler("volume", volume)?;

    let media = DirectHandler::new("Media", ["Previous", "Play/Pause", "Next"], |dir| {
        match dir {
            Direction::Cw => info!("next track"),
            Direction::Ccw => info!("previous track"),
        }
        Ok(())
    })
    .on_press(|| {
        info!("play/pause");
        Ok(())
    })
    .on_long_press(|| {
        info!("stop");
        Ok(())
    })
    .with_icons(Icons::new("⏮", "⏯", "⏭"))
    .with_accent(MEDIA_COLOR);
    machine.register_mode_handler("media", media)?;

    let window = SubmenuHandler::new(
        "Window",
        vec![
            SubmenuEntry::mode("Switch Desktop", "desktops"),
            SubmenuEntry::action("Snap Left", || {
                info!("snap left");
                Ok(())
            }),
            SubmenuEntry::action("Snap Right", || {
                info!("snap right");
                Ok(())
            }),
            SubmenuEntry::action("Maximize", || {
                info!("maximize");
                Ok(())
            }),
        ],
    )
    .with_accent(WINDOW_COLOR);
    machine.register_mode_handler("window", window)?;

    let desktops = CyclicHandler::new(
        "Desktops",
        || Ok((1..=4).collect::<Vec<u8>>()),
        |n| format!("Desktop {n}"),
        |n| {
            info!("switch to desktop {n}");
            Ok(())
        },
    )
    .with_accent(WINDOW_COLOR);
    machine.register_mode_handler("desktops", desktops)?;

    Ok(())
}
