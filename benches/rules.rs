use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use number_with_units::{
    parse_number_with_units, Converter, NumberWithUnits, NumberWithUnitsRules, RuleInputs,
    UnitTerm,
};

const RAW_INPUTS: &[&str] = &["5", "$ 2 1/2", "-1.5 km/hr", "9.8 kg m s^-2", "Rs 5 per kg"];

fn parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    let mut converter = Converter::default();
    converter.register_currency_units().unwrap();

    for input in RAW_INPUTS {
        group.bench_with_input(BenchmarkId::from_parameter(input), input, |b, input| {
            b.iter(|| parse_number_with_units(input, &converter))
        });
    }
}

fn rules(c: &mut Criterion) {
    let mut group = c.benchmark_group("rules");
    let rules = NumberWithUnitsRules::default();

    let answer = NumberWithUnits::new(
        18.0,
        vec![UnitTerm::new("km", 1), UnitTerm::new("hr", -1)],
    )
    .to_dict();
    let inputs = RuleInputs {
        f: NumberWithUnits::new(5.0, vec![UnitTerm::new("m", 1), UnitTerm::new("s", -1)])
            .to_dict(),
    };

    group.bench_function("is_equal_to", |b| {
        b.iter(|| rules.is_equal_to(&answer, &inputs))
    });
    group.bench_function("is_equivalent_to", |b| {
        b.iter(|| rules.is_equivalent_to(&answer, &inputs))
    });
}

fn build_converter(c: &mut Criterion) {
    c.bench_function("bundled_converter", |b| b.iter(Converter::bundled));
}

criterion_group!(benches, parse, rules, build_converter);
criterion_main!(benches);
