//! Model listing command.

use console::style;

use crate::config::Settings;
use crate::pipeline;

pub fn cmd_models(settings: &Settings) -> anyhow::Result<()> {
    for name in pipeline::available_models() {
        if *name == settings.model {
            println!("{} {} (configured)", style("✓").green(), name);
        } else {
            println!("  {}", name);
        }
    }
    if !pipeline::available_models().contains(&settings.model.as_str()) {
        println!(
            "{} Configured model '{}' is not available",
            style("!").yellow(),
            settings.model
        );
    }
    Ok(())
}
