#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]
#![cfg_attr(not(target_arch = "avr"), allow(dead_code))]

#[cfg(target_arch = "avr")]
extern crate panic_halt;

mod config;

#[cfg(target_arch = "avr")]
mod adc;
#[cfg(target_arch = "avr")]
mod hw;
#[cfg(target_arch = "avr")]
mod runtime;

#[cfg(not(target_arch = "avr"))]
fn main() {
    // Host builds only evaluate the clock configuration.
    let _ = config::SCANNER;
}
