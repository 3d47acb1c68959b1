//! Compact slider value grammar: `current<min,max>`.
//!
//! `current` is printed with exactly `decimals` fractional digits and the
//! bounds in their shortest form, so `5.5<0,10>` carries value, bounds and
//! precision in one string.

use std::fmt;
use std::str::FromStr;

use crate::codec::primitives::{PayloadReader, COMPONENT_SEPARATOR};
use crate::error::CodecError;
use crate::util::{decimal_places, format_fixed, format_number};

/// Upper bound on slider precision; more digits than f64 can hold are noise.
pub const MAX_SLIDER_DECIMALS: u32 = 17;

/// Current value, bounds and precision of a number slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderValue {
    pub current: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub decimals: u32,
}

impl SliderValue {
    pub fn new(current: f64, minimum: f64, maximum: f64, decimals: u32) -> Self {
        Self {
            current,
            minimum,
            maximum,
            decimals: decimals.min(MAX_SLIDER_DECIMALS),
        }
    }

    /// Encodes the compact form. Precision above [`MAX_SLIDER_DECIMALS`] is
    /// clamped, so the result always decodes.
    pub fn encode(&self) -> String {
        format!(
            "{}<{},{}>",
            format_fixed(self.current, self.decimals.min(MAX_SLIDER_DECIMALS)),
            format_number(self.minimum),
            format_number(self.maximum)
        )
    }

    /// Decodes the compact form.
    pub fn decode(s: &str) -> Result<SliderValue, CodecError> {
        let r = PayloadReader::new("slider", s);
        let body = s
            .trim()
            .strip_suffix('>')
            .ok_or_else(|| r.error("expected current<min,max>"))?;
        let (current, bounds) = body
            .split_once('<')
            .ok_or_else(|| r.error("expected current<min,max>"))?;
        let (minimum, maximum) = r.pair(bounds, COMPONENT_SEPARATOR)?;

        let decimals = decimal_places(current);
        if decimals > MAX_SLIDER_DECIMALS {
            return Err(r.error("too many decimal places"));
        }
        Ok(SliderValue {
            current: r.number(current)?,
            minimum: r.number(minimum)?,
            maximum: r.number(maximum)?,
            decimals,
        })
    }
}

impl fmt::Display for SliderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for SliderValue {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SliderValue::decode(s)
    }
}
