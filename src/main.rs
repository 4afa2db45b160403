//! Door-mode controller firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  IndicatorLight  Apa102  Ht16k33  LedcTone    ButtonPanel      │
//! │  (GPIO)          (SPI2)  (I2C0)   (LEDC)      (GPIO, task)     │
//! │  EspHttpTransport  LogEventSink  Announcer  LogBanner  Wi-Fi   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │        Dispatcher → ModeController (pure logic)        │    │
//! │  │        Fsm · palette · classification requests         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  EventQueue ◀── button task, classification workers            │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{info, warn};

use doormode::adapters::banner::{show_startup_banner, LogBanner};
use doormode::adapters::entropy::PlatformEntropy;
use doormode::adapters::esp;
use doormode::adapters::http::{timeout_from_secs, EspHttpTransport};
use doormode::adapters::log_sink::{LogEventSink, Tee};
use doormode::adapters::speech::{Announcer, LogSpeech};
use doormode::adapters::time::{MonotonicClock, ThreadDelay};
use doormode::app::output::OutputSink;
use doormode::app::service::ModeController;
use doormode::classifier::ClassificationClient;
use doormode::config::ControllerConfig;
use doormode::dispatcher::{Dispatcher, ThreadLauncher};
use doormode::drivers::tone::ToneScheduler;
use doormode::events::EventQueue;
use doormode::pins;

const WIFI_SSID: &str = match option_env!("DOORMODE_WIFI_SSID") {
    Some(s) => s,
    None => "",
};
const WIFI_PASS: &str = match option_env!("DOORMODE_WIFI_PASS") {
    Some(s) => s,
    None => "",
};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Doormode v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration (fatal if unusable) ──────────────────
    let config = ControllerConfig::load(
        option_env!("DOORMODE_CONFIG_JSON"),
        option_env!("DOORMODE_API_KEY").unwrap_or_default(),
    )?;

    // ── 3. Network + banner ───────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let wifi = esp::connect_wifi(peripherals.modem, sysloop, nvs, WIFI_SSID, WIFI_PASS)?;
    show_startup_banner(&wifi, &mut LogBanner);

    // ── 4. Outputs (each optional) ────────────────────────────
    let outputs = OutputSink::new(
        Some(esp::indicator()),
        esp::strip(peripherals.spi2),
        esp::display(peripherals.i2c0),
        config.strip.brightness,
    );
    let tone = match esp::LedcTone::new() {
        Ok(speaker) => ToneScheduler::spawn(speaker, ThreadDelay, config.tone)?,
        Err(e) => {
            warn!("speaker unavailable ({e}), running silent");
            ToneScheduler::detached()
        }
    };

    // ── 5. Core + dispatch ────────────────────────────────────
    let queue = Arc::new(EventQueue::new());
    let transport = EspHttpTransport::new(timeout_from_secs(config.classification.timeout_secs));
    let client = ClassificationClient::new(transport, &config.classification);
    let launcher = ThreadLauncher::new(client, queue.clone());
    let controller = ModeController::new(&config, PlatformEntropy::new());
    let sink = Tee(LogEventSink::new(), Announcer::new(LogSpeech));
    let mut dispatcher = Dispatcher::new(controller, outputs, tone, sink, launcher, queue.clone());

    // ── 6. Button task ────────────────────────────────────────
    let mut buttons = esp::buttons()?;
    let input_queue = queue.clone();
    thread::Builder::new()
        .name("buttons".into())
        .stack_size(4096)
        .spawn(move || {
            let clock = MonotonicClock::new();
            loop {
                buttons.poll_into(clock.uptime_ms(), &input_queue);
                thread::sleep(Duration::from_millis(pins::BUTTON_POLL_MS));
            }
        })?;

    // ── 7. Run ────────────────────────────────────────────────
    dispatcher.start();
    dispatcher.run();

    let (_outputs, mut tone, _sink, _launcher) = dispatcher.into_parts();
    tone.shutdown();
    drop(wifi);
    info!("halted");
    Ok(())
}
