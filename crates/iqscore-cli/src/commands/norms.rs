//! The `iqscore norms` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use iqscore_core::model::{Difficulty, Domain};
use iqscore_core::norms::{
    domain_weight, AGE_ADJUSTMENTS, CLASSIFICATION_BANDS, FAST_BONUS, FAST_RESPONSE_SECS,
    QUICK_BONUS, QUICK_RESPONSE_SECS,
};

pub fn execute() -> Result<()> {
    let mut ages = Table::new();
    ages.set_header(vec!["Age", "Multiplier"]);
    for (age, multiplier) in &AGE_ADJUSTMENTS {
        ages.add_row(vec![Cell::new(age), Cell::new(format!("{multiplier:.2}"))]);
    }
    println!("Age adjustments (1.00 outside this table)\n{ages}\n");

    let mut weights = Table::new();
    weights.set_header(vec!["Domain", "Index", "FSIQ weight"]);
    for domain in Domain::ALL {
        weights.add_row(vec![
            Cell::new(domain),
            Cell::new(domain.abbreviation()),
            Cell::new(format!("{:.2}", domain_weight(domain))),
        ]);
    }
    println!("Domain weights\n{weights}\n");

    let mut difficulty = Table::new();
    difficulty.set_header(vec!["Difficulty", "Weight"]);
    for d in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
        difficulty.add_row(vec![Cell::new(d), Cell::new(format!("{:.1}", d.weight()))]);
    }
    println!("Difficulty weights\n{difficulty}");
    println!(
        "Processing Speed bonus: +{FAST_BONUS} under {FAST_RESPONSE_SECS}s, +{QUICK_BONUS} under {QUICK_RESPONSE_SECS}s\n"
    );

    let mut bands = Table::new();
    bands.set_header(vec!["Minimum", "Level", "Description"]);
    for band in &CLASSIFICATION_BANDS {
        bands.add_row(vec![
            Cell::new(
                band.min
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(band.level),
            Cell::new(band.description),
        ]);
    }
    println!("Classification bands\n{bands}");

    Ok(())
}
