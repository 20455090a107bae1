#![no_main]

use libfuzzer_sys::fuzz_target;
use once_cell::sync::Lazy;

use number_with_units::Converter;

static CONVERTER: Lazy<Converter> = Lazy::new(Converter::default);

fuzz_target!(|contents: &str| {
    let _ = CONVERTER.parse(contents);
});
