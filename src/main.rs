use std::env;

use anyhow::Context;
use buildings_client::{Building, BuildingsFacade, ClientConfig, ReqwestTransport};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏢 Buildings catalog client");

    let config = ClientConfig::from_env();
    let token = env::var("BUILDINGS_API_TOKEN").context("BUILDINGS_API_TOKEN is not set")?;
    let output = env::args().nth(1);

    let transport = ReqwestTransport::new(&config).context("Failed to create HTTP client")?;
    let facade = BuildingsFacade::new(transport, &config);

    info!("Fetching buildings from {}", config.base_url);
    let buildings = facade
        .get_buildings(&token)
        .await
        .context("Failed to fetch buildings")?;

    info!("✅ Fetched {} buildings", buildings.len());

    for (i, building) in buildings.iter().enumerate() {
        let info = building.info();
        println!("{}. {} [{}]", i + 1, building.name(), building.kind().as_str());
        println!("   ID: {}", building.id());
        if let Some(housing) = &info.housing {
            println!("   Address: {}", housing.address);
        }
        match building {
            Building::Complex(complex) => {
                println!("   Multi-apartment buildings: {}", complex.multi_apartments.len())
            }
            Building::MultiApartment(ma) => println!("   Sections: {}", ma.sections.len()),
            Building::House(house) => {
                if let Some(floors) = house.floors {
                    println!("   Floors: {}", floors);
                }
            }
            Building::Section(_) => {}
        }
        println!(
            "   Photos: {}, agreements: {}, competitors: {}",
            info.photos.len(),
            info.agreements.len(),
            info.competitors.len()
        );
        println!();
    }

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&buildings)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path))?;
        info!("💾 Saved buildings to {}", path);
    }

    Ok(())
}
