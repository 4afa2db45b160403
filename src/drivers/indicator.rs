//! Three-LED mode indicator.
//!
//! Red, green and blue LEDs on three GPIOs. Exactly one is lit after every
//! successful `show()`; the others are driven low first so two are never
//! lit together.
//!
//! Any pin may be absent (not wired); writes to it are skipped.

use embedded_hal::digital::OutputPin;
use log::debug;

use crate::app::commands::IndicatorColor;
use crate::error::{Effector, PeripheralError, PeripheralFault};

const GPIO_FAULT: PeripheralError =
    PeripheralError::new(Effector::Indicator, PeripheralFault::GpioWriteFailed);

pub struct IndicatorLight<P> {
    /// Indexed by [`slot`].
    pins: [Option<P>; 3],
    lit: Option<IndicatorColor>,
}

fn slot(color: IndicatorColor) -> usize {
    match color {
        IndicatorColor::Red => 0,
        IndicatorColor::Green => 1,
        IndicatorColor::Blue => 2,
    }
}

impl<P: OutputPin> IndicatorLight<P> {
    pub fn new(red: Option<P>, green: Option<P>, blue: Option<P>) -> Self {
        Self {
            pins: [red, green, blue],
            lit: None,
        }
    }

    /// Light `color` and turn the other two off.
    ///
    /// Every pin is attempted; the first failure is returned.
    pub fn show(&mut self, color: IndicatorColor) -> Result<(), PeripheralError> {
        let target = slot(color);
        let mut result = Ok(());
        for (i, pin) in self.pins.iter_mut().enumerate() {
            if i == target {
                continue;
            }
            if let Some(pin) = pin {
                if pin.set_low().is_err() && result.is_ok() {
                    result = Err(GPIO_FAULT);
                }
            }
        }
        let raised = match &mut self.pins[target] {
            Some(pin) => match pin.set_high() {
                Ok(()) => true,
                Err(_) => {
                    if result.is_ok() {
                        result = Err(GPIO_FAULT);
                    }
                    false
                }
            },
            None => {
                debug!("indicator: {color:?} pin absent");
                false
            }
        };
        self.lit = raised.then_some(color);
        result
    }

    /// All three low.
    pub fn off(&mut self) -> Result<(), PeripheralError> {
        let mut result = Ok(());
        for pin in self.pins.iter_mut().flatten() {
            if pin.set_low().is_err() && result.is_ok() {
                result = Err(GPIO_FAULT);
            }
        }
        self.lit = None;
        result
    }

    /// Colour whose pin was last driven high, if it still is.
    pub fn lit(&self) -> Option<IndicatorColor> {
        self.lit
    }
}
