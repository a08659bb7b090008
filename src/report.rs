//! Human-readable reports for both subcommands
//!
//! Output goes to stdout for the workshop attendee; tracing carries the
//! operational detail separately.

use crate::reconciler::{ModelReport, RunOutcome};
use crate::verify::{ModelPresence, PackageStatus};

const BANNER: &str = "==================================================";

/// Per-model lines for a completed (or aborted) provisioning run
pub fn print_run_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Success(reports) => {
            print_model_reports(reports);
            println!("\n✨ All required models are ready!");
        }
        RunOutcome::ServiceUnreachable { attempts } => {
            println!("❌ Ollama service unreachable after {} attempts", attempts);
        }
        RunOutcome::PullFailed {
            model,
            reason,
            completed,
        } => {
            print_model_reports(completed);
            println!("❌ Failed to pull {}: {}", model, reason);
        }
    }
}

fn print_model_reports(reports: &[ModelReport]) {
    for report in reports {
        println!("✅ {} ({})", report.model, report.status);
    }
}

/// Full verification report: packages, models, summary with remediation hints
pub fn print_verification(packages: &[PackageStatus], models: &[ModelPresence]) {
    println!("\n{}", BANNER);
    println!("AI Basics Workshop - Environment Verification");
    println!("{}\n", BANNER);

    println!("Checking required packages...");
    for package in packages {
        match &package.version {
            Some(version) => println!("✅ {}: {}", package.name, version),
            None => println!("❌ {}: NOT FOUND", package.name),
        }
    }

    println!("\nChecking required Ollama models...");
    for model in models {
        let glyph = if model.installed { "✅" } else { "❌" };
        println!("{} {}", glyph, model.model);
    }

    let all_packages = packages.iter().all(|p| p.found());
    let all_models = models.iter().all(|m| m.installed);

    if all_packages && all_models {
        println!("\n✨ All requirements are satisfied!");
    } else {
        println!("\n⚠️  Some requirements are missing:");
        if !all_packages {
            println!("- Install missing packages: pip install -r requirements.txt");
        }
        if !all_models {
            println!("- Install missing models:");
            for model in models.iter().filter(|m| !m.installed) {
                println!("  ollama pull {}", model.model);
            }
        }
    }

    println!("\n{}\n", BANNER);
}
