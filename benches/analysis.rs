//! Run these benches with `cargo bench --bench analysis -- --verbose`

use criterion::{criterion_group, criterion_main, Criterion};

use metfor::{Celsius, Feet, Knots, Quantity, WindSpdDir};
use optional::some;
use sounding_convect::{calculate, TableFormat, VerticalProfile};

criterion_main!(analysis_benches);

criterion_group!(analysis_benches, calculate_bench, parse_bench);

fn calculate_bench(c: &mut Criterion) {
    let profile = synthetic_profile();

    c.bench_function("calculate", |b| {
        b.iter(|| {
            let _x = calculate(&profile, Celsius(30.0), Feet(350.0));
        });
    });
}

fn parse_bench(c: &mut Criterion) {
    let table = synthetic_gsd_table();

    c.bench_function("parse_gsd", |b| {
        b.iter(|| {
            let _x = TableFormat::Gsd.parse(&table).expect("oops");
        });
    });
}

fn synthetic_profile() -> VerticalProfile {
    let height: Vec<Feet> = (0..60).map(|i| Feet(f64::from(i) * 250.0)).collect();
    let temp: Vec<_> = height
        .iter()
        .map(|h| some(Celsius(25.0 - 2.0 * h.unpack() / 1000.0)))
        .collect();
    let dew: Vec<_> = height
        .iter()
        .map(|h| some(Celsius(12.0 - 2.0 * h.unpack() / 1000.0)))
        .collect();
    let wind: Vec<_> = height
        .iter()
        .map(|h| {
            some(WindSpdDir {
                speed: Knots(10.0 + h.unpack() / 1000.0),
                direction: 270.0,
            })
        })
        .collect();

    VerticalProfile::new(height, vec![], temp, dew, wind).expect("oops")
}

fn synthetic_gsd_table() -> String {
    let mut table = String::from(
        "GFS analysis valid for grid point:\n\
         \x20  GFS         12      10      Jun    2018\n\
         \x20 CAPE    791    CIN   -238  Helic  99999     PW     17\n\
         \x20     1  23062  99999  32.50 -35.00  99999  99999\n\
         \x20     2  99999  99999  99999     35  99999  99999\n\
         \x20     3           32.577899,35.179972   12     kt\n",
    );

    for i in 0..60i64 {
        let h_m = i * 76;
        let t = 250 - i * 5;
        table.push_str(&format!(
            "{:>7}{:>7}{:>7}{:>7}{:>7}{:>7}{:>7}\n",
            4,
            10_000 - i * 100,
            h_m,
            t,
            t - 120,
            270,
            10
        ));
    }

    table
}
