pub mod edge_cases;
pub mod pool_sim;
pub mod run;

pub use edge_cases::*;
pub use pool_sim::*;
pub use run::*;

use crate::App;

/// Print the in-order catalog values and their (min, max, sum)
pub fn print_catalog_summary(app: &App) {
    let (values, summary) = app.catalog_summary();
    println!("🧂 Final ingredient tree values: {values:?}");
    println!(
        "📊 Final min/max/sum of values: {}, {}, {}",
        summary.min, summary.max, summary.sum
    );
}
