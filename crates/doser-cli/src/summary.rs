use std::path::Path;

use console::Style;
use doser_core::pipeline::{BatchReport, PipelineConfig, UnitStatus};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    ok: Style,
    skipped: Style,
    failed: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            ok: Style::new().green(),
            skipped: Style::new().dim().yellow(),
            failed: Style::new().red().bold(),
            path: Style::new().underlined(),
        }
    }
}

/// Print the inputs and the settings that shape a run.
pub fn print_run_summary(title: &str, inputs: &[(&str, &Path)], config: &PipelineConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to(title));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(title.chars().count())));
    println!();

    for (label, path) in inputs {
        println!(
            "  {:<14}{}",
            s.label.apply_to(label),
            s.path.apply_to(path.display())
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Settings"));
    let cal = &config.calibration;
    println!(
        "    {:<14}{}",
        s.label.apply_to("Nozzle row"),
        s.value.apply_to(cal.nozzle_row)
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Sensor bits"),
        s.value.apply_to(cal.sensor_bit_depth)
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Bottom border"),
        s.value.apply_to(config.profile.bottom_border)
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Truncation"),
        s.value.apply_to(config.signal.truncation)
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Existing"),
        s.value.apply_to(config.output.existing)
    );
    if let Some(fps) = config.output.fps {
        println!(
            "    {:<14}{}",
            s.label.apply_to("Frame rate"),
            s.value.apply_to(format!("{fps} fps"))
        );
    }
    println!();
}

/// Print one line per unit, then the totals.
pub fn print_batch_report(report: &BatchReport) {
    let s = Styles::new();

    for unit in &report.units {
        let status = match &unit.status {
            UnitStatus::Done => s.ok.apply_to("done".to_string()),
            UnitStatus::Skipped => s.skipped.apply_to("skipped".to_string()),
            UnitStatus::Failed(reason) => s.failed.apply_to(format!("failed: {reason}")),
        };
        println!("  {:<40}{}", s.label.apply_to(&unit.name), status);
    }
    println!();
    println!(
        "  {} done, {} skipped, {} failed",
        s.ok.apply_to(report.done()),
        s.skipped.apply_to(report.skipped()),
        s.failed.apply_to(report.failed())
    );
}
