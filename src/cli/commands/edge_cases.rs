use crate::engine::demonstrate_edge_cases;
use crate::services::CollectingDiagnosticSink;
use crate::App;
use anyhow::Result;
use std::sync::Arc;

use super::print_catalog_summary;

/// Execute the edge-case demonstrations and list the diagnostics they produced
pub async fn execute_edge_cases() -> Result<()> {
    let sink = Arc::new(CollectingDiagnosticSink::new());
    let app = App::with_diagnostics(sink.clone());

    let outcome = demonstrate_edge_cases(&app.orders, &app.catalog).await;

    println!("🧪 Edge cases:");
    println!(
        "   - Insert at index 10000000 ignored: {}",
        outcome.out_of_range_ignored
    );
    println!(
        "   - Ingredient 7 stored once after two inserts: {}",
        outcome.duplicate_stored_once
    );
    println!(
        "   - Task added after distributor shutdown discarded: {}",
        outcome.late_task_discarded
    );

    let records = sink.records();
    println!("📋 Diagnostics ({}):", records.len());
    for record in &records {
        println!("   - [{}] {}", record.code, record.message);
    }

    print_catalog_summary(&app);
    Ok(())
}
