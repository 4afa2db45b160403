//! ESP32-S3 peripheral acquisition.
//!
//! Each effector is acquired independently; one that fails to come up is
//! logged and left absent so the rest of the board still works.
//!
//! | Effector  | Peripheral                     | Driver          |
//! |-----------|--------------------------------|-----------------|
//! | indicator | 3 × GPIO output                | `IndicatorLight`|
//! | strip     | SPI2, write-only               | `Apa102`        |
//! | display   | I2C0 @ 0x70                    | `Ht16k33`       |
//! | speaker   | LEDC timer 0 / channel 0       | `LedcTone`      |
//! | buttons   | 3 × GPIO input, pull-up        | `ButtonPanel`   |

use anyhow::{anyhow, Result};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, Input, Output, PinDriver, Pull};
use esp_idf_svc::hal::i2c::{I2c, I2cConfig, I2cDriver};
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::spi::{
    config::Config as SpiConfig, SpiAnyPins, SpiDeviceDriver, SpiDriver, SpiDriverConfig,
};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::sys::*;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::{info, warn};

use crate::app::ports::{NetworkInfo, ToneOutput};
use crate::drivers::apa102::Apa102;
use crate::drivers::button::ButtonPanel;
use crate::drivers::ht16k33::{self, Ht16k33};
use crate::drivers::indicator::IndicatorLight;
use crate::error::{Effector, PeripheralError, PeripheralFault};
use crate::pins;

pub type BoardPin = PinDriver<'static, AnyOutputPin, Output>;
pub type BoardButton = PinDriver<'static, AnyIOPin, Input>;
pub type BoardStrip = Apa102<SpiDeviceDriver<'static, SpiDriver<'static>>>;
pub type BoardDisplay = Ht16k33<I2cDriver<'static>>;

// ── GPIO ──────────────────────────────────────────────────────

fn output_pin(gpio: i32) -> Option<BoardPin> {
    // SAFETY: every GPIO number in `pins` is claimed exactly once here.
    let pin = unsafe { AnyOutputPin::new(gpio) };
    match PinDriver::output(pin) {
        Ok(driver) => Some(driver),
        Err(e) => {
            warn!("esp: GPIO{gpio} output unavailable: {e}");
            None
        }
    }
}

fn input_pin(gpio: i32) -> Result<BoardButton> {
    // SAFETY: every GPIO number in `pins` is claimed exactly once here.
    let pin = unsafe { AnyIOPin::new(gpio) };
    let mut driver = PinDriver::input(pin)?;
    driver.set_pull(Pull::Up)?;
    Ok(driver)
}

pub fn indicator() -> IndicatorLight<BoardPin> {
    IndicatorLight::new(
        output_pin(pins::LED_R_GPIO),
        output_pin(pins::LED_G_GPIO),
        output_pin(pins::LED_B_GPIO),
    )
}

/// Buttons are required; without them the controller has no input.
pub fn buttons() -> Result<ButtonPanel<BoardButton>> {
    Ok(ButtonPanel::new(
        input_pin(pins::BUTTON_A_GPIO)?,
        input_pin(pins::BUTTON_B_GPIO)?,
        input_pin(pins::BUTTON_C_GPIO)?,
    ))
}

// ── Buses ─────────────────────────────────────────────────────

pub fn strip(spi: impl Peripheral<P = impl SpiAnyPins> + 'static) -> Option<BoardStrip> {
    let open = || -> Result<BoardStrip> {
        // SAFETY: strip pins are claimed exactly once here.
        let (sclk, mosi) = unsafe {
            (
                AnyOutputPin::new(pins::STRIP_SCLK_GPIO),
                AnyOutputPin::new(pins::STRIP_MOSI_GPIO),
            )
        };
        let device = SpiDeviceDriver::new_single(
            spi,
            sclk,
            mosi,
            Option::<AnyIOPin>::None,
            Option::<AnyOutputPin>::None,
            &SpiDriverConfig::new(),
            &SpiConfig::new().baudrate(Hertz(pins::STRIP_SPI_HZ)),
        )?;
        Ok(Apa102::new(device))
    };
    open()
        .inspect(|_| info!("esp: APA102 strip on SPI2"))
        .inspect_err(|e| warn!("esp: strip unavailable: {e}"))
        .ok()
}

pub fn display(i2c: impl Peripheral<P = impl I2c> + 'static) -> Option<BoardDisplay> {
    let open = || -> Result<BoardDisplay> {
        // SAFETY: display pins are claimed exactly once here.
        let (sda, scl) = unsafe {
            (
                AnyIOPin::new(pins::DISPLAY_SDA_GPIO),
                AnyIOPin::new(pins::DISPLAY_SCL_GPIO),
            )
        };
        let config = I2cConfig::new().baudrate(Hertz(pins::DISPLAY_I2C_HZ));
        let bus = I2cDriver::new(i2c, sda, scl, &config)?;
        let mut display = Ht16k33::new(bus, ht16k33::DEFAULT_ADDRESS);
        display.init().map_err(|e| anyhow!("{e}"))?;
        Ok(display)
    };
    open()
        .inspect(|_| info!("esp: HT16K33 display on I2C0"))
        .inspect_err(|e| warn!("esp: display unavailable: {e}"))
        .ok()
}

// ── Speaker ───────────────────────────────────────────────────

const SPEAKER_DUTY_HALF: u32 = 1 << 9;
const TONE_FAULT: PeripheralError =
    PeripheralError::new(Effector::Tone, PeripheralFault::ToneWriteFailed);

/// Square-wave tone on a raw LEDC timer/channel pair.
pub struct LedcTone {
    timer: u32,
    channel: u32,
}

impl LedcTone {
    pub fn new() -> Result<Self> {
        let timer = ledc_timer_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            timer_num: pins::SPEAKER_LEDC_TIMER,
            duty_resolution: ledc_timer_bit_t_LEDC_TIMER_10_BIT,
            freq_hz: 440,
            clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
            ..Default::default()
        };
        // SAFETY: called once from the main task before the tone thread
        // exists; the config struct outlives the call.
        esp!(unsafe { ledc_timer_config(&timer) })?;
        let channel = ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel: pins::SPEAKER_LEDC_CHANNEL,
            timer_sel: pins::SPEAKER_LEDC_TIMER,
            gpio_num: pins::SPEAKER_GPIO,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        };
        // SAFETY: as above.
        esp!(unsafe { ledc_channel_config(&channel) })?;
        info!("esp: speaker on GPIO{}", pins::SPEAKER_GPIO);
        Ok(Self {
            timer: pins::SPEAKER_LEDC_TIMER,
            channel: pins::SPEAKER_LEDC_CHANNEL,
        })
    }

    fn set_duty(&mut self, duty: u32) -> Result<(), PeripheralError> {
        // SAFETY: the channel was configured in new(); only the tone
        // thread owns this driver.
        esp!(unsafe { ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, self.channel, duty) })
            .map_err(|_| TONE_FAULT)?;
        // SAFETY: as above.
        esp!(unsafe { ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, self.channel) })
            .map_err(|_| TONE_FAULT)
    }
}

impl ToneOutput for LedcTone {
    fn play(&mut self, frequency_hz: f32) -> Result<(), PeripheralError> {
        let hz = frequency_hz.round().max(1.0) as u32;
        // SAFETY: the timer was configured in new().
        esp!(unsafe { ledc_set_freq(ledc_mode_t_LEDC_LOW_SPEED_MODE, self.timer, hz) })
            .map_err(|_| TONE_FAULT)?;
        self.set_duty(SPEAKER_DUTY_HALF)
    }

    fn stop(&mut self) -> Result<(), PeripheralError> {
        self.set_duty(0)
    }
}

// ── Wi-Fi ─────────────────────────────────────────────────────

pub type BoardWifi = BlockingWifi<EspWifi<'static>>;

/// Join the configured access point and wait for an address.
pub fn connect_wifi(
    modem: impl Peripheral<P = Modem> + 'static,
    sysloop: EspSystemEventLoop,
    nvs: EspDefaultNvsPartition,
    ssid: &str,
    password: &str,
) -> Result<BoardWifi> {
    let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs))?, sysloop)?;
    let auth_method = if password.is_empty() {
        AuthMethod::None
    } else {
        AuthMethod::WPA2Personal
    };
    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: ssid.try_into().map_err(|_| anyhow!("SSID too long"))?,
        password: password.try_into().map_err(|_| anyhow!("password too long"))?,
        auth_method,
        ..Default::default()
    }))?;
    wifi.start()?;
    wifi.connect()?;
    wifi.wait_netif_up()?;
    info!("esp: Wi-Fi connected to '{ssid}'");
    Ok(wifi)
}

impl NetworkInfo for BoardWifi {
    fn addresses(&self) -> Vec<String> {
        match self.wifi().sta_netif().get_ip_info() {
            Ok(info) => vec![info.ip.to_string()],
            Err(e) => {
                warn!("esp: no IP info: {e}");
                Vec::new()
            }
        }
    }
}
