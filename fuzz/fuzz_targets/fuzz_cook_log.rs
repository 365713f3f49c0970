#![no_main]
use libfuzzer_sys::fuzz_target;
use pitwatch_core::{Point, PredictorCfg, parse_csv, predict};

fuzz_target!(|data: &[u8]| {
    // Any byte soup is either rejected or yields rows the predictor accepts.
    let Ok(rows) = parse_csv(data) else { return };
    let series: Vec<Point> = rows
        .iter()
        .filter_map(|r| r.meat.map(|value| Point { timestamp: r.timestamp, value }))
        .collect();
    if let Some(last) = series.last() {
        let _ = predict(&series, last.value, 203.0, &PredictorCfg::default(), last.timestamp);
    }
});
