/*
[INPUT]:  Interactive user input via CLI
[OUTPUT]: Generated YAML configuration file
[POS]:    CLI initialization layer
[UPDATE]: When AppConfig schema changes
*/

use anyhow::{Context, Result, anyhow};
use console::style;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::path::PathBuf;

use geotask::config::{AppConfig, LocationSource};
use geotask_gateway::Coordinate;

pub fn run_init(output: PathBuf) -> Result<()> {
    println!("{}", style("Welcome to GeoTask Init").bold().cyan());
    println!(
        "{}",
        style("This will guide you through creating a client configuration.").dim()
    );

    let theme = ColorfulTheme::default();

    if output.exists() {
        let overwrite = Confirm::with_theme(&theme)
            .with_prompt(format!("{} exists. Overwrite?", output.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            println!("{}", style("Nothing written.").yellow());
            return Ok(());
        }
    }

    let mut config = AppConfig::default();

    println!("\n{}", style("--- Backend ---").bold());
    config.api.base_url = Input::with_theme(&theme)
        .with_prompt("Task API base URL")
        .default(config.api.base_url.clone())
        .interact_text()?;
    config.api.timeout_secs = Input::with_theme(&theme)
        .with_prompt("Request timeout (seconds)")
        .default(config.api.timeout_secs)
        .interact_text()?;

    println!("\n{}", style("--- Map ---").bold());
    config.map.default_center = prompt_coordinate(&theme, "Default center", config.map.default_center)?;
    config.map.span_degrees = Input::with_theme(&theme)
        .with_prompt("Visible width (degrees of longitude)")
        .default(config.map.span_degrees)
        .validate_with(|span: &f64| -> Result<(), &str> {
            if *span > 0.0 && *span <= 360.0 {
                Ok(())
            } else {
                Err("must be in (0, 360]")
            }
        })
        .interact_text()?;

    println!("\n{}", style("--- Device location ---").bold());
    let sources = ["ip", "fixed", "disabled"];
    let selection = Select::with_theme(&theme)
        .with_prompt("Location provider")
        .items(&sources)
        .default(0)
        .interact()?;
    config.location.provider = match selection {
        0 => LocationSource::Ip,
        1 => LocationSource::Fixed,
        _ => LocationSource::Disabled,
    };
    match config.location.provider {
        LocationSource::Ip => {
            config.location.endpoint = Input::with_theme(&theme)
                .with_prompt("Geolocation endpoint")
                .default(config.location.endpoint.clone())
                .interact_text()?;
        }
        LocationSource::Fixed => {
            let fixed = prompt_coordinate(&theme, "Fixed position", config.map.default_center)?;
            config.location.fixed = Some(fixed);
        }
        LocationSource::Disabled => {}
    }

    config.validate()?;
    let yaml = config.to_yaml()?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(&output, yaml)
        .with_context(|| format!("failed to write config to {}", output.display()))?;

    println!("\n{}", style("SUCCESS!").bold().green());
    println!(
        "Configuration written to: {}",
        style(output.display()).cyan()
    );

    Ok(())
}

fn prompt_coordinate(theme: &ColorfulTheme, label: &str, default: Coordinate) -> Result<Coordinate> {
    let latitude: f64 = Input::with_theme(theme)
        .with_prompt(format!("{label} latitude"))
        .default(default.latitude)
        .interact_text()?;
    let longitude: f64 = Input::with_theme(theme)
        .with_prompt(format!("{label} longitude"))
        .default(default.longitude)
        .interact_text()?;
    let coordinate = Coordinate::new(latitude, longitude);
    if !coordinate.is_valid() {
        return Err(anyhow!("{label} is out of range: {coordinate}"));
    }
    Ok(coordinate)
}
