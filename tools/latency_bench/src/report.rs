// tools/latency_bench/src/report.rs
//
// Rendu des résultats : tableau texte, CSV, Markdown.

use std::borrow::Cow;

use latency_engine::{Aggregation, CatalogEntry, MeasurementResult, Summary};

const RULE: &str = "------------------------------------------------------------";
const BANNER: &str = "============================================================";

/// Paramètres affichés en tête de rapport
#[derive(Debug, Clone)]
pub struct ReportParams {
    pub iterations: i64,
    pub runs: i32,
    pub tolerance_pct: f64,
    pub aggregation: Aggregation,
    pub cpu: Option<String>,
}

fn verdict(result: &MeasurementResult<'_>) -> &'static str {
    if result.passed {
        "PASS"
    } else {
        "FAIL"
    }
}

/// Tableau texte + ligne de bilan
pub fn render_text(params: &ReportParams, results: &[MeasurementResult<'_>]) -> String {
    let mut out = String::new();

    out.push_str(BANNER);
    out.push('\n');
    out.push_str("           CPU Latency Benchmark\n");
    out.push_str(BANNER);
    out.push('\n');
    if let Some(cpu) = &params.cpu {
        out.push_str(&format!("  CPU: {}\n", cpu));
        out.push_str(BANNER);
        out.push('\n');
    }
    out.push('\n');

    out.push_str(&format!(
        "Params: iter={}, runs={}, tolerance={:.0}%, aggregation={}\n\n",
        params.iterations,
        params.runs,
        params.tolerance_pct,
        params.aggregation.as_str()
    ));
    out.push_str(&format!(
        "{:<12} {:<8} {:<8} {:<8} {:<6}\n",
        "Instr", "Cat", "Expect", "Actual", "Result"
    ));
    out.push_str(RULE);
    out.push('\n');

    for r in results {
        out.push_str(&format!(
            "{:<12} {:<8} {:<8.2} {:<8.2} [{}]\n",
            r.name(),
            r.category(),
            r.expected_latency(),
            r.measured_latency,
            verdict(r)
        ));
    }

    let summary = Summary::from_results(results);
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!(
        "Result: {}/{} passed ({:.1}%)\n",
        summary.passed,
        summary.total,
        summary.pass_rate()
    ));
    out
}

/// Champ CSV, entre guillemets s'il contient un séparateur (RFC 4180)
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Export CSV (une ligne par instruction)
pub fn render_csv(results: &[MeasurementResult<'_>]) -> String {
    let mut csv = String::from("Instruction,Category,Expected,Measured,Min,Max,Deviation_%,Result\n");

    for r in results {
        csv.push_str(&format!(
            "{},{},{:.2},{:.3},{:.3},{:.3},{:.1},{}\n",
            csv_field(r.name()),
            csv_field(r.category()),
            r.expected_latency(),
            r.measured_latency,
            r.min_sample(),
            r.max_sample(),
            r.deviation_pct,
            verdict(r)
        ));
    }

    csv
}

/// Génère rapport Markdown
pub fn render_markdown(params: &ReportParams, results: &[MeasurementResult<'_>]) -> String {
    let mut md = String::from("# CPU Latency Report\n\n");
    if let Some(cpu) = &params.cpu {
        md.push_str(&format!("**CPU**: {}\n\n", cpu));
    }
    md.push_str(&format!(
        "**Parameters**: {} iterations × {} runs, tolerance {:.0}%, aggregation {}\n\n",
        params.iterations,
        params.runs,
        params.tolerance_pct,
        params.aggregation.as_str()
    ));

    md.push_str("| Instruction | Category | Expected | Measured | Min | Max | Deviation | Result |\n");
    md.push_str("|-------------|----------|----------|----------|-----|-----|-----------|--------|\n");

    for r in results {
        md.push_str(&format!(
            "| {} | {} | {:.2} | {:.2} | {:.2} | {:.2} | {:.1}% | {} |\n",
            r.name(),
            r.category(),
            r.expected_latency(),
            r.measured_latency,
            r.min_sample(),
            r.max_sample(),
            r.deviation_pct,
            verdict(r)
        ));
    }

    let summary = Summary::from_results(results);
    md.push_str(&format!(
        "\n**Result**: {}/{} passed ({:.1}%)\n",
        summary.passed,
        summary.total,
        summary.pass_rate()
    ));
    md
}

/// Liste du catalogue (`--list`)
pub fn render_catalog(entries: &[CatalogEntry]) -> String {
    let mut out = format!("{:<12} {:<8} {:<8}\n", "Instr", "Cat", "Expect");
    out.push_str(RULE);
    out.push('\n');
    for e in entries {
        out.push_str(&format!("{:<12} {:<8} {:<8.2}\n", e.name, e.category, e.expected));
    }
    out
}
