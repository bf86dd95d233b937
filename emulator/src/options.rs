//! Command-line options for the emulator.

use scanner_core::{ConfigError, ConversionBand, Reference, ScannerConfig};

pub const USAGE: &str =
    "Usage: scanner-emulator [--cpu-hz <hz>] [--reference <aref|avcc|internal>] [--rate <conversions/s>]";

/// Matches the usual Arduino Uno crystal.
pub const DEFAULT_CPU_HZ: u32 = 16_000_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EmulatorOptions {
    pub cpu_hz: u32,
    pub reference: Reference,
    /// Interrupt rate override. `None` runs at the rate the prescaler implies.
    pub rate: Option<u32>,
}

impl Default for EmulatorOptions {
    fn default() -> Self {
        Self {
            cpu_hz: DEFAULT_CPU_HZ,
            reference: Reference::Avcc,
            rate: None,
        }
    }
}

impl EmulatorOptions {
    /// Parses `--flag value` and `--flag=value` forms.
    pub fn from_args<I>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
                None => (arg, None),
            };
            let mut value = || {
                inline
                    .clone()
                    .or_else(|| args.next())
                    .ok_or_else(|| format!("Expected value after {flag}"))
            };

            match flag.as_str() {
                "--cpu-hz" => options.cpu_hz = parse_hz(&value()?)?,
                "--reference" => options.reference = parse_reference(&value()?)?,
                "--rate" => options.rate = Some(parse_hz(&value()?)?),
                _ => return Err(format!("Unknown option `{flag}`")),
            }
        }

        Ok(options)
    }

    /// Resolves the prescaler the same way the firmware build does.
    pub fn scanner_config(&self) -> Result<ScannerConfig, ConfigError> {
        ScannerConfig::new(self.reference, self.cpu_hz, ConversionBand::ATMEGA328P)
    }
}

pub fn parse_reference(tag: &str) -> Result<Reference, String> {
    if tag.eq_ignore_ascii_case("aref") {
        Ok(Reference::Aref)
    } else if tag.eq_ignore_ascii_case("avcc") {
        Ok(Reference::Avcc)
    } else if tag.eq_ignore_ascii_case("internal") || tag.eq_ignore_ascii_case("internal-1v1") {
        Ok(Reference::Internal1V1)
    } else {
        Err(format!("Unknown reference `{tag}`"))
    }
}

fn parse_hz(value: &str) -> Result<u32, String> {
    let digits: String = value.chars().filter(|c| *c != '_').collect();
    match digits.parse::<u32>() {
        Ok(0) => Err("Frequency must be positive".to_string()),
        Ok(hz) => Ok(hz),
        Err(_) => Err(format!("Invalid frequency `{value}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanner_core::Prescaler;

    fn parse(args: &[&str]) -> Result<EmulatorOptions, String> {
        EmulatorOptions::from_args(args.iter().map(ToString::to_string))
    }

    #[test]
    fn no_arguments_select_the_uno_defaults() {
        let options = parse(&[]).expect("defaults parse");
        assert_eq!(options, EmulatorOptions::default());
        let config = options.scanner_config().expect("16 MHz fits");
        assert_eq!(config.prescaler(), Prescaler::Div128);
    }

    #[test]
    fn both_flag_spellings_are_accepted() {
        let options = parse(&["--cpu-hz=8_000_000", "--reference", "internal", "--rate", "500"])
            .expect("options parse");
        assert_eq!(options.cpu_hz, 8_000_000);
        assert_eq!(options.reference, Reference::Internal1V1);
        assert_eq!(options.rate, Some(500));
    }

    #[test]
    fn clocks_without_a_prescaler_fail_configuration() {
        let options = parse(&["--cpu-hz", "40000000"]).expect("options parse");
        assert!(matches!(
            options.scanner_config(),
            Err(ConfigError::NoValidPrescaler {
                cpu_hz: 40_000_000,
                ..
            })
        ));
    }

    #[test]
    fn malformed_arguments_are_reported() {
        assert_eq!(
            parse(&["--cpu-hz"]).unwrap_err(),
            "Expected value after --cpu-hz"
        );
        assert_eq!(parse(&["--rate", "0"]).unwrap_err(), "Frequency must be positive");
        assert_eq!(parse(&["--reference", "vbat"]).unwrap_err(), "Unknown reference `vbat`");
        assert_eq!(parse(&["--verbose"]).unwrap_err(), "Unknown option `--verbose`");
    }
}
