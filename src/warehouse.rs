// src/warehouse.rs
//
// The relational side of the pipeline: `house_prediction_table` holds the
// latest scrape in full, replaced wholesale on every run. The cleaner only
// ever sees rows that round-tripped through the warehouse.

use anyhow::{Context, Result};
use log::info;
use tokio_postgres::Row as PgRow;

use crate::artifacts;
use crate::config::PipelineConfig;
use crate::db::PgPool;
use crate::models::RawListing;

const TABLE: &str = "house_prediction_table";

const COLUMNS: [&str; 36] = [
    "url",
    "title",
    "description",
    "price",
    "address",
    "city",
    "land_size_m2",
    "building_size_m2",
    "bedroom",
    "bathroom",
    "garage",
    "carport",
    "property_type",
    "certificate",
    "voltage_watt",
    "maid_bedroom",
    "maid_bathroom",
    "kitchen",
    "dining_room",
    "living_room",
    "furniture",
    "building_material",
    "floor_material",
    "floor_level",
    "house_facing",
    "concept_and_style",
    "view",
    "internet_access",
    "road_width",
    "year_built",
    "year_renovated",
    "water_source",
    "corner_property",
    "property_condition",
    "ad_type",
    "ad_id",
];

const CREATE_TABLE_SQL: &str = "
CREATE TABLE IF NOT EXISTS house_prediction_table (
    url TEXT NOT NULL,
    title TEXT,
    description TEXT,
    price DOUBLE PRECISION,
    address TEXT,
    city TEXT,
    land_size_m2 DOUBLE PRECISION,
    building_size_m2 DOUBLE PRECISION,
    bedroom DOUBLE PRECISION,
    bathroom DOUBLE PRECISION,
    garage DOUBLE PRECISION,
    carport DOUBLE PRECISION,
    property_type TEXT,
    certificate TEXT,
    voltage_watt DOUBLE PRECISION,
    maid_bedroom DOUBLE PRECISION,
    maid_bathroom DOUBLE PRECISION,
    kitchen DOUBLE PRECISION,
    dining_room DOUBLE PRECISION,
    living_room DOUBLE PRECISION,
    furniture TEXT,
    building_material TEXT,
    floor_material TEXT,
    floor_level DOUBLE PRECISION,
    house_facing TEXT,
    concept_and_style TEXT,
    view TEXT,
    internet_access TEXT,
    road_width TEXT,
    year_built DOUBLE PRECISION,
    year_renovated DOUBLE PRECISION,
    water_source TEXT,
    corner_property BOOLEAN,
    property_condition TEXT,
    ad_type TEXT,
    ad_id TEXT
)";

pub async fn ensure_table(pool: &PgPool) -> Result<()> {
    let conn = pool.get().await.context("Failed to get connection")?;
    conn.execute(CREATE_TABLE_SQL, &[])
        .await
        .context("Failed to create house_prediction_table")?;
    Ok(())
}

fn insert_statement() -> String {
    let placeholders: Vec<String> = (1..=COLUMNS.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        TABLE,
        COLUMNS.join(", "),
        placeholders.join(", ")
    )
}

/// Replaces the warehouse table contents with the given listings in one
/// transaction, so a failed sync leaves the previous snapshot intact.
pub async fn replace_listings(pool: &PgPool, listings: &[RawListing]) -> Result<u64> {
    let mut conn = pool.get().await.context("Failed to get connection")?;
    let tx = conn
        .transaction()
        .await
        .context("Failed to open sync transaction")?;

    tx.execute(&format!("DELETE FROM {TABLE}"), &[])
        .await
        .context("Failed to clear house_prediction_table")?;

    let statement = tx
        .prepare(&insert_statement())
        .await
        .context("Failed to prepare listing insert")?;

    let mut inserted = 0u64;
    for listing in listings {
        tx.execute(
            &statement,
            &[
                &listing.url,
                &listing.title,
                &listing.description,
                &listing.price,
                &listing.address,
                &listing.city,
                &listing.land_size_m2,
                &listing.building_size_m2,
                &listing.bedroom,
                &listing.bathroom,
                &listing.garage,
                &listing.carport,
                &listing.property_type,
                &listing.certificate,
                &listing.voltage_watt,
                &listing.maid_bedroom,
                &listing.maid_bathroom,
                &listing.kitchen,
                &listing.dining_room,
                &listing.living_room,
                &listing.furniture,
                &listing.building_material,
                &listing.floor_material,
                &listing.floor_level,
                &listing.house_facing,
                &listing.concept_and_style,
                &listing.view,
                &listing.internet_access,
                &listing.road_width,
                &listing.year_built,
                &listing.year_renovated,
                &listing.water_source,
                &listing.corner_property,
                &listing.property_condition,
                &listing.ad_type,
                &listing.ad_id,
            ],
        )
        .await
        .with_context(|| format!("Failed to insert listing {}", listing.url))?;
        inserted += 1;
    }

    tx.commit().await.context("Failed to commit sync")?;
    Ok(inserted)
}

fn listing_from_row(row: &PgRow) -> Result<RawListing> {
    Ok(RawListing {
        url: row.try_get("url")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        land_size_m2: row.try_get("land_size_m2")?,
        building_size_m2: row.try_get("building_size_m2")?,
        bedroom: row.try_get("bedroom")?,
        bathroom: row.try_get("bathroom")?,
        garage: row.try_get("garage")?,
        carport: row.try_get("carport")?,
        property_type: row.try_get("property_type")?,
        certificate: row.try_get("certificate")?,
        voltage_watt: row.try_get("voltage_watt")?,
        maid_bedroom: row.try_get("maid_bedroom")?,
        maid_bathroom: row.try_get("maid_bathroom")?,
        kitchen: row.try_get("kitchen")?,
        dining_room: row.try_get("dining_room")?,
        living_room: row.try_get("living_room")?,
        furniture: row.try_get("furniture")?,
        building_material: row.try_get("building_material")?,
        floor_material: row.try_get("floor_material")?,
        floor_level: row.try_get("floor_level")?,
        house_facing: row.try_get("house_facing")?,
        concept_and_style: row.try_get("concept_and_style")?,
        view: row.try_get("view")?,
        internet_access: row.try_get("internet_access")?,
        road_width: row.try_get("road_width")?,
        year_built: row.try_get("year_built")?,
        year_renovated: row.try_get("year_renovated")?,
        water_source: row.try_get("water_source")?,
        corner_property: row.try_get("corner_property")?,
        property_condition: row.try_get("property_condition")?,
        ad_type: row.try_get("ad_type")?,
        ad_id: row.try_get("ad_id")?,
    })
}

pub async fn fetch_all_listings(pool: &PgPool) -> Result<Vec<RawListing>> {
    let conn = pool.get().await.context("Failed to get connection")?;
    let rows = conn
        .query(&format!("SELECT * FROM {TABLE}"), &[])
        .await
        .context("Failed to read house_prediction_table")?;

    let mut listings = Vec::with_capacity(rows.len());
    for row in &rows {
        listings.push(listing_from_row(row)?);
    }
    Ok(listings)
}

/// Loads the scraped CSV into the warehouse table and re-exports the full
/// table back over the scraped CSV path, so downstream stages always read
/// warehouse-backed rows.
pub async fn sync_from_csv(pool: &PgPool, cfg: &PipelineConfig) -> Result<(u64, u64)> {
    let listings: Vec<RawListing> = artifacts::read_csv(&cfg.scraped_path())
        .context("Scraped listings not found; run the content fetcher first")?;

    ensure_table(pool).await?;
    let inserted = replace_listings(pool, &listings).await?;
    info!("Synced {} listings into {}", inserted, TABLE);

    let exported = export_listings(pool, cfg).await?;
    Ok((inserted, exported))
}

/// Re-reads the entire warehouse table and writes it to the scraped CSV
/// path the cleaner consumes.
pub async fn export_listings(pool: &PgPool, cfg: &PipelineConfig) -> Result<u64> {
    let listings = fetch_all_listings(pool).await?;
    artifacts::write_csv(&cfg.scraped_path(), &listings)?;
    info!(
        "Exported {} listings from {} to {}",
        listings.len(),
        TABLE,
        cfg.scraped_path().display()
    );
    Ok(listings.len() as u64)
}
