use anyhow::Result;
use std::process;

use crate::client::ApiClient;
use sip_core::models::{UpdateProfile, UserProfile};

use super::helpers::json_error;

fn print_profile(profile: &UserProfile) {
    let name = &profile.name;
    let email = &profile.email;
    let goal = profile.daily_goal_liters;
    println!("Name:       {name}");
    println!("Email:      {email}");
    match profile.age {
        Some(age) => println!("Age:        {age}"),
        None => println!("Age:        -"),
    }
    match profile.weight_kg {
        Some(kg) => println!("Weight:     {kg:.1} kg"),
        None => println!("Weight:     -"),
    }
    println!("Daily goal: {goal:.1} L");
}

pub(crate) async fn cmd_profile_show(client: &ApiClient, json: bool) -> Result<()> {
    let profile = match client.get_profile().await {
        Ok(p) => p,
        Err(e) => {
            if json {
                println!("{}", json_error(&format!("{e:#}")));
                process::exit(1);
            }
            return Err(e);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        print_profile(&profile);
    }
    Ok(())
}

pub(crate) async fn cmd_profile_set(
    client: &ApiClient,
    name: Option<String>,
    age: Option<i64>,
    weight: Option<f64>,
    goal: Option<f64>,
    json: bool,
) -> Result<()> {
    let update = UpdateProfile {
        name,
        age,
        weight_kg: weight,
        daily_goal_liters: goal,
    };
    if update.name.is_none()
        && update.age.is_none()
        && update.weight_kg.is_none()
        && update.daily_goal_liters.is_none()
    {
        anyhow::bail!("Nothing to change; pass --name, --age, --weight and/or --goal");
    }

    let profile = match client.update_profile(&update).await {
        Ok(p) => p,
        Err(e) => {
            if json {
                println!("{}", json_error(&format!("{e:#}")));
                process::exit(1);
            }
            return Err(e);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("Profile updated.\n");
        print_profile(&profile);
    }
    Ok(())
}
