use anyhow::Result;

use crate::client::ApiClient;
use sip_core::models::NewConsumption;
use sip_core::stats::{Drink, classify_drink};

use super::helpers::{format_volume, json_error, parse_quantity_ml};

pub(crate) async fn cmd_log(
    client: &ApiClient,
    quantity: &str,
    drink: &str,
    json: bool,
) -> Result<()> {
    let quantity_ml = parse_quantity_ml(quantity)?;
    let new = NewConsumption {
        quantity_ml,
        drink_type: drink.to_string(),
    };

    let record = match client.add_consumption(&new).await {
        Ok(r) => r,
        Err(e) => {
            if json {
                println!("{}", json_error(&format!("{e:#}")));
                std::process::exit(1);
            }
            return Err(e);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    let id = record.id;
    let volume = format_volume(record.quantity_ml);
    let drink_type = &record.drink_type;
    match classify_drink(&record.drink_type) {
        Drink::Coffee => println!("[{id}] Logged {volume} of {drink_type} (does not count toward your goal)"),
        Drink::Water => println!("[{id}] Logged {volume} of {drink_type}"),
    }
    Ok(())
}
