use anyhow::Result;
use std::io;
use std::path::PathBuf;

use rain_predictor::utils::input::PromptedWeather;
use rain_predictor::{
    load_or_train, Config, CycleReport, Dashboard, FileModelStore, ModelOrigin, PredictionHistory,
    Predictor,
};

fn main() -> Result<()> {
    rain_predictor::init_tracing();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = startup(
        Config::load(config_path.as_deref()),
        "Failed to load configuration",
    )?;

    // Load or train model
    let store = FileModelStore::new(&config.model_path);
    let boot = startup(
        load_or_train(
            &store,
            &config.dataset_path,
            &config.dataset,
            &config.training,
        ),
        "Failed to prepare the rain model",
    )?;

    match &boot.origin {
        ModelOrigin::Loaded => println!("Loaded saved model from {}", store.path().display()),
        ModelOrigin::Trained { history, report } => {
            println!(
                "Trained new model on {} rainy and {} dry days ({} rows skipped)",
                report.positives, report.negatives, report.rejected
            );
            if let Some(last) = history.last() {
                println!(
                    "Final epoch: loss {:.4}, accuracy {:.2}%",
                    last.loss,
                    last.accuracy * 100.0
                );
            }
        }
    }

    let source = PromptedWeather::new(io::stdin().lock(), io::stdout());
    let mut dashboard = startup(
        Dashboard::new(source, Predictor::with_model(boot.model))
            .with_history_file(&config.history_path),
        "Failed to open prediction history",
    )?;

    println!("Model ready for predictions");
    print_history(dashboard.history());

    loop {
        let Some(line) = dashboard
            .source_mut()
            .read_line("\nLocation (or history / clear / quit): ")?
        else {
            break;
        };

        match line.as_str() {
            "" | "quit" | "exit" => break,
            "history" => print_history(dashboard.history()),
            "clear" => {
                dashboard.clear_history()?;
                println!("History cleared");
            }
            location => match dashboard.run_cycle(location) {
                Ok(report) => {
                    print_report(&report);
                    print_history(dashboard.history());
                }
                Err(e) => {
                    tracing::error!(error = %e, "Prediction error");
                    println!("Error: {}", e.user_message());
                }
            },
        }
    }

    Ok(())
}

/// Prints the short user-facing message before handing the full error to anyhow.
fn startup<T, E>(result: Result<T, E>, context: &'static str) -> Result<T>
where
    E: Into<rain_predictor::Error>,
{
    match result {
        Ok(value) => Ok(value),
        Err(e) => {
            let e: rain_predictor::Error = e.into();
            eprintln!("{}", e.user_message());
            Err(anyhow::Error::new(e).context(context))
        }
    }
}

fn print_report(report: &CycleReport) {
    println!("\nRain tomorrow in {}: {:.1}%", report.location, report.percentage());
    println!("Risk: {}", report.risk);
    println!("Why:");
    for reason in &report.reasons {
        println!("  - {reason}");
    }
}

fn print_history(history: &PredictionHistory) {
    println!("\nRecent predictions:");
    if history.is_empty() {
        println!("  No predictions yet");
        return;
    }
    for entry in history.iter() {
        println!(
            "  {} - {:.1}% ({}) at {}",
            entry.location,
            entry.probability * 100.0,
            entry.risk(),
            entry.timestamp.format("%H:%M:%S")
        );
    }
}
