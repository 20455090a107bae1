#![no_main]

use libfuzzer_sys::fuzz_target;
use once_cell::sync::Lazy;

use number_with_units::{parse_number_with_units, Converter};

static CONVERTER: Lazy<Converter> = Lazy::new(|| {
    let mut converter = Converter::default();
    let _ = converter.register_currency_units();
    converter
});

fuzz_target!(|contents: &str| {
    let _ = parse_number_with_units(contents, &CONVERTER);
});
