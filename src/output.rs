use console::Style;

use crate::error::IncompleteReason;
use crate::judge::{Verdict, VerdictStatus};
use crate::mutants::KillRecord;
use crate::probe::SurvivorHint;
use crate::state::LastRun;
use crate::suite::VectorSuite;

pub fn print_error(msg: &str) {
    let style = Style::new().red().bold();
    eprintln!("{} {}", style.apply_to("✗"), msg);
}

pub fn print_incomplete(reason: IncompleteReason) {
    let style = Style::new().yellow().bold();
    eprintln!(
        "{} Run did not complete ({}). No verdict was produced.",
        style.apply_to("…"),
        reason
    );
}

fn short_ref(mutant_id: &str) -> String {
    match mutant_id.strip_prefix("mutant") {
        Some(n) => format!("@m{n}"),
        None => format!("@{mutant_id}"),
    }
}

fn format_input(input: &[i32]) -> String {
    let items: Vec<String> = input.iter().map(|v| v.to_string()).collect();
    format!("[{}]", items.join(", "))
}

pub fn print_verdict(verdict: &Verdict, suite: &VectorSuite, hints: &[SurvivorHint], label: &str) {
    let dim = Style::new().dim();

    if verdict.status == VerdictStatus::ReferenceBroken {
        let style = Style::new().red().bold();
        let failed = verdict.reference_results.iter().filter(|r| !r.passed).count();
        println!(
            "{} {}: reference fails {} of {} vectors; expectations are wrong",
            style.apply_to("✗"),
            label,
            failed,
            verdict.reference_results.len(),
        );
        for r in verdict.reference_results.iter().filter(|r| !r.passed) {
            let expected = suite
                .vector_at(r.vector_index)
                .map(|v| v.expected.to_string())
                .unwrap_or_else(|_| "?".to_string());
            let input = suite
                .vector_at(r.vector_index)
                .map(|v| format_input(&v.input))
                .unwrap_or_default();
            println!(
                "  {} #{} {} expected {}, reference gives {}",
                dim.apply_to("·"),
                r.vector_index,
                input,
                expected,
                r.actual,
            );
        }
        return;
    }

    if verdict.empty_corpus {
        let style = Style::new().yellow().bold();
        println!(
            "{} {}: reference passes {} vectors; no mutants to judge against (vacuous)",
            style.apply_to("!"),
            label,
            verdict.reference_results.len(),
        );
        return;
    }

    let style = if verdict.acceptable {
        Style::new().green().bold()
    } else {
        Style::new().yellow().bold()
    };
    let mark = if verdict.acceptable { "✓" } else { "!" };
    println!(
        "{} {}: {} of {} mutants killed ({:.1}%, threshold {:.1}%)",
        style.apply_to(mark),
        label,
        verdict.killed_mutants,
        verdict.total_mutants,
        verdict.adequacy * 100.0,
        verdict.threshold * 100.0,
    );

    println!();
    for record in &verdict.per_mutant {
        let ref_style = Style::new().cyan().bold();
        let status = if record.killed {
            Style::new().green().apply_to(format!(
                "killed by #{}",
                record.killing_vector_index.unwrap_or_default()
            ))
        } else {
            Style::new().red().apply_to("survived".to_string())
        };
        println!(
            "  {} {} {}",
            ref_style.apply_to(short_ref(&record.mutant_id)),
            status,
            dim.apply_to(&record.description),
        );
    }

    if !hints.is_empty() {
        println!();
        for hint in hints {
            print_hint(hint);
        }
    }
}

fn print_hint(hint: &SurvivorHint) {
    let ref_style = Style::new().cyan().bold();
    match &hint.witness {
        Some(w) => println!(
            "  {} try {}: reference gives {}, mutant gives {}",
            ref_style.apply_to(short_ref(&hint.mutant_id)),
            format_input(&w.input),
            w.reference_output,
            w.mutant_output,
        ),
        None => println!(
            "  {} no distinguishing input found; possibly equivalent",
            ref_style.apply_to(short_ref(&hint.mutant_id)),
        ),
    }
}

pub fn print_mutant_detail(record: &KillRecord, hint: Option<&SurvivorHint>) {
    let ref_style = Style::new().cyan().bold();
    let dim = Style::new().dim();

    println!(
        "{} {} {}",
        ref_style.apply_to(short_ref(&record.mutant_id)),
        record.mutant_id,
        dim.apply_to(format!("[{}]", record.description)),
    );
    match record.killing_vector_index {
        Some(i) => println!("  killed: first diverging vector #{i}"),
        None => println!("  survived: no vector in the suite tells it apart from the reference"),
    }
    if let Some(hint) = hint {
        print_hint(hint);
    }
}

pub fn print_status(run: &LastRun) {
    let v = &run.verdict;
    let suite = run.suite_file.as_deref().unwrap_or("hidden suite");
    println!(
        "Last run: {} on {}: {} of {} mutants killed ({}% score), status {:?}",
        run.problem,
        suite,
        v.killed_mutants,
        v.total_mutants,
        v.score_percent(),
        v.status,
    );

    let survivors: Vec<_> = v.survivors().collect();
    if !survivors.is_empty() {
        println!();
        for record in survivors {
            let ref_style = Style::new().cyan().bold();
            println!(
                "  {} {}",
                ref_style.apply_to(short_ref(&record.mutant_id)),
                record.description,
            );
        }
        println!();
        println!("Use `mutjudge show @m1` for details on a specific mutant.");
    }
}
