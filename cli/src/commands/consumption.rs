use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use crate::client::ApiClient;
use sip_core::models::UpdateConsumption;
use sip_core::stats;

use super::helpers::{
    format_volume, json_error, parse_quantity_ml, prompt_confirm, split_timestamp, truncate,
};

pub(crate) async fn cmd_history(client: &ApiClient, limit: Option<usize>, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct HistoryRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Time")]
        time: String,
        #[tabled(rename = "Drink")]
        drink: String,
        #[tabled(rename = "Amount")]
        amount: String,
    }

    let mut records = match client.list_consumption().await {
        Ok(r) => r,
        Err(e) => {
            if json {
                println!("{}", json_error(&format!("{e:#}")));
                process::exit(1);
            }
            return Err(e);
        }
    };
    stats::sort_history(&mut records);
    if let Some(limit) = limit {
        records.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        eprintln!("No drinks logged yet");
        process::exit(2);
    }

    let rows: Vec<HistoryRow> = records
        .iter()
        .map(|r| {
            let (date, time) = split_timestamp(&r.recorded_at);
            HistoryRow {
                id: r.id,
                date,
                time,
                drink: truncate(&r.drink_type, 20),
                amount: format_volume(r.quantity_ml),
            }
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(4..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

pub(crate) async fn cmd_edit(
    client: &ApiClient,
    id: i64,
    quantity: Option<&str>,
    drink: Option<String>,
    json: bool,
) -> Result<()> {
    let update = UpdateConsumption {
        quantity_ml: quantity.map(parse_quantity_ml).transpose()?,
        drink_type: drink,
    };
    if update.quantity_ml.is_none() && update.drink_type.is_none() {
        anyhow::bail!("Nothing to change; pass --quantity and/or --drink");
    }

    let record = match client.update_consumption(id, &update).await {
        Ok(r) => r,
        Err(e) => {
            if json {
                println!("{}", json_error(&format!("{e:#}")));
                process::exit(1);
            }
            return Err(e);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        let volume = format_volume(record.quantity_ml);
        let drink_type = &record.drink_type;
        println!("[{id}] Updated: {volume} of {drink_type}");
    }
    Ok(())
}

pub(crate) async fn cmd_delete(client: &ApiClient, id: i64, yes: bool, json: bool) -> Result<()> {
    if !yes && !json && !prompt_confirm(&format!("Delete record {id}?"))? {
        eprintln!("Cancelled");
        process::exit(2);
    }

    if let Err(e) = client.delete_consumption(id).await {
        if json {
            println!("{}", json_error(&format!("{e:#}")));
            process::exit(1);
        }
        return Err(e);
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("[{id}] Deleted");
    }
    Ok(())
}
