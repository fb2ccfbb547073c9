#![no_main]

use blocktime::artifacts::{GatherContext, GatherMode, MetricInputs, Settings, Trace};
use blocktime::context::ComputeContext;
use blocktime::metric::{total_blocking_time, Mode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Only well-formed trace JSON reaches the processor
    let Ok(trace) = serde_json::from_slice::<Trace>(data) else {
        return;
    };

    // Errors are fine, panics are not
    for gather_mode in [GatherMode::Navigation, GatherMode::Timespan] {
        let Ok(inputs) = MetricInputs::new(GatherContext { gather_mode }, Settings::default())
            .and_then(|inputs| inputs.with_trace(trace.clone()))
        else {
            continue;
        };

        let ctx = ComputeContext::default();
        if let Ok(result) = total_blocking_time(Mode::Observed, &inputs, &ctx) {
            assert!(result.timing >= 0.0);
        }
    }
});
