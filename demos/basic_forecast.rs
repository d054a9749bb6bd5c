use chrono::NaiveDate;
use ev_forecast::{forecast, GrowthSummary, HistoryPoint, RegionSeries, TrendPredictor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("EV Forecast: Basic Forecasting Example");
    println!("======================================\n");

    // Create sample data
    println!("Creating sample history...");
    let series = create_sample_series();
    println!(
        "Sample history created: {} months for region '{}'\n",
        series.len(),
        series.name()
    );

    // Forecast one year ahead with the trend baseline
    println!("Forecasting 12 months ahead...");
    let result = forecast(&series, 12, &TrendPredictor)?;

    println!("\n{:<12} {:>10}", "Month", "Predicted");
    for point in result.points() {
        println!("{:<12} {:>10}", point.date, point.rounded());
    }

    // Continue the cumulative trend past the end of history
    let historical_final = series.final_cumulative();
    let stitched = result.stitch_cumulative(historical_final);
    let forecast_final = stitched[stitched.len() - 1].cumulative;

    println!("\nCumulative registrations at end of history: {:.0}", historical_final);
    println!("Cumulative registrations after forecast:    {:.0}", forecast_final);

    let growth = GrowthSummary::from_totals(historical_final, forecast_final);
    println!("Forecasted growth over 12 months: {}", growth);

    // Export for downstream consumers
    let json = result.to_json()?;
    println!("\nJSON export ({} bytes)", json.len());

    Ok(())
}

/// Create a sample region history with steady month-over-month growth
fn create_sample_series() -> RegionSeries {
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    let mut points = Vec::with_capacity(24);

    // Two years of accelerating adoption
    for i in 0..24u32 {
        let date = start + chrono::Months::new(i);
        let value = 120 + (i as u64) * 15 + ((i as f64 * 0.7).sin() * 10.0) as u64;
        points.push(HistoryPoint { date, value });
    }

    RegionSeries::new("Sampleton", 0, points).unwrap()
}
