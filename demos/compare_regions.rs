use chrono::NaiveDate;
use ev_forecast::{aggregate, Dataset, HistoryPoint, RegionSeries, SeriesSource, TrendPredictor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("EV Forecast: Multi-Region Comparison Example");
    println!("============================================\n");

    // Create sample data for three regions with different adoption rates
    println!("Creating sample histories...");
    let mut dataset = Dataset::default();
    dataset.insert(create_sample_series("Alder", 0, 200, 25));
    dataset.insert(create_sample_series("Birch", 1, 90, 8));
    dataset.insert(create_sample_series("Cedar", 2, 450, 40));
    println!("Dataset holds regions: {:?}\n", dataset.regions());

    // Forecast three years ahead for every region
    println!("Forecasting 36 months ahead per region...");
    let regions = ["Alder", "Birch", "Cedar"];
    let results = aggregate(&dataset, &regions, &TrendPredictor, 36)?;

    // Growth summary, mirroring what a dashboard would render
    println!("\nForecasted growth:");
    for (name, result) in &results {
        println!("  {}: {}", name, result.growth());
    }

    // Trajectory breakdown for one region
    let alder = &results["Alder"];
    let historical = alder
        .trajectory()
        .iter()
        .filter(|p| p.source == SeriesSource::Historical)
        .count();
    let forecasted = alder
        .trajectory()
        .iter()
        .filter(|p| p.source == SeriesSource::Forecast)
        .count();
    println!(
        "\nAlder trajectory: {} historical + {} forecasted points",
        historical, forecasted
    );

    let last = alder.trajectory().last().unwrap();
    println!(
        "Alder cumulative registrations at {}: {:.0}",
        last.date, last.cumulative
    );

    Ok(())
}

/// Create a sample region history with the given base level and monthly step
fn create_sample_series(name: &str, code: i64, base: u64, step: u64) -> RegionSeries {
    let start = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
    let mut points = Vec::with_capacity(30);

    for i in 0..30u32 {
        let date = start + chrono::Months::new(i);
        let value = base + (i as u64) * step;
        points.push(HistoryPoint { date, value });
    }

    RegionSeries::new(name, code, points).unwrap()
}
