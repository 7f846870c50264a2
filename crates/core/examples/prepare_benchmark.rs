//! Lightweight render/scale benchmark harness for local baselines.
//!
//! Run from repository root:
//! `cargo run -p openlabel_core --example prepare_benchmark --release`

use std::time::Instant;

use openlabel_core::{Placeholders, Resolution, prepare, render, scale_commands};

const SHIPPING_LABEL: &str = "^XA^PW812^LL1218^LH0,0\
^FO50,50^A0N,40,40^FD{{COMPANY}}^FS\
^FO50,110^GB712,3,3^FS\
{{IF FRAGILE}}^FO50,140^A0N,60,60^FDFRAGILE^FS{{ENDIF}}\
^FO50,220^A0N,30,30^FDShip to: {{NAME}}^FS\
^FO50,260^A0N,30,30^FD{{ADDRESS}}^FS\
^FO50,320^BY3,3,100^BCN,100,Y,N,N^FD{{TRACKING}}^FS\
{{IF QR}}^FO550,600^BQN,2,6^FDQA,{{TRACKING}}^FS{{ENDIF}}\
^XZ";

fn placeholders() -> Placeholders {
    [
        ("{{COMPANY}}", "ACME Corp"),
        ("{{NAME}}", "Jane Doe"),
        ("{{ADDRESS}}", "1 Main Street"),
        ("{{TRACKING}}", "1Z999AA10123456784"),
        ("QR", ""),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn run_benchmark(label: &str, input: &str, iterations: usize) {
    let ctx = placeholders();
    let resolution = Resolution::new(203, 300);

    let render_start = Instant::now();
    for _ in 0..iterations {
        let _ = render(input, &ctx);
    }
    let render_elapsed = render_start.elapsed();

    let rendered = match render(input, &ctx) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("{label}: render failed: {e}");
            return;
        }
    };

    let scale_start = Instant::now();
    for _ in 0..iterations {
        let _ = scale_commands(&rendered, resolution.source, resolution.target);
    }
    let scale_elapsed = scale_start.elapsed();

    let prepare_start = Instant::now();
    for _ in 0..iterations {
        let _ = prepare(input, &ctx, resolution);
    }
    let prepare_elapsed = prepare_start.elapsed();

    let per_iter = |d: std::time::Duration| d.as_secs_f64() * 1_000_000.0 / iterations as f64;
    println!(
        "{label}: bytes={} iterations={iterations} render={:.2}us scale={:.2}us prepare={:.2}us",
        input.len(),
        per_iter(render_elapsed),
        per_iter(scale_elapsed),
        per_iter(prepare_elapsed),
    );
}

fn main() {
    let iterations = std::env::var("OPENLABEL_BENCH_ITERATIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10_000);

    run_benchmark("single", SHIPPING_LABEL, iterations);

    let batch = SHIPPING_LABEL.repeat(50);
    run_benchmark("batch-50", &batch, iterations / 10);
}
