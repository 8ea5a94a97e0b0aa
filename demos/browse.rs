use gios::{
    ApiClient, GiosConfig, GiosError, LocalStore, SeriesLazyFrame, SessionController,
};
use std::env;

#[tokio::main]
async fn main() -> Result<(), GiosError> {
    configure_polars_display();
    let query = env::args().nth(1).unwrap_or_else(|| "Kraków".to_string());

    let config = GiosConfig::default();
    let (client, mut status) = ApiClient::with_status_channel(&config);
    tokio::spawn(async move {
        while let Some(event) = status.recv().await {
            println!("[{}] {}", event.request, event.message);
        }
    });
    let mut session = SessionController::with_parts(client, LocalStore::open(&config)?);

    session.start().await?;
    let suggestions = session.name_index().suggestions(&query);
    let Some(location) = suggestions.first().map(|s| s.to_string()) else {
        println!("No station matches '{}'", query);
        return Ok(());
    };
    println!("{} stations match, using {}", suggestions.len(), location);

    session.select_city(&location).await?;
    let Some((handle, sensor)) = session.sensor_handles().next() else {
        println!("{} has no sensors", location);
        return Ok(());
    };
    println!("Selected sensor {}", sensor.label());

    let dataset = session.select_sensor(handle).await?;
    let frame = SeriesLazyFrame::from_series(&dataset.series)?.frame.collect()?;
    println!("{:#?}", frame);

    println!("{}", session.statistics().call());
    println!("Trend: {}", session.trend().call());
    println!("{:?}", session.save_current_dataset()?);

    Ok(())
}

fn configure_polars_display() {
    // show 20 rows
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}
