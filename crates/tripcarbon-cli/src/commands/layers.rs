//! Layers command handler: load the reference layers and summarize them.

use std::path::Path;

use anyhow::Result;

use tripcarbon_lib::RegionLayer;

use crate::commands::load_reference;

pub fn handle_layers_command(data_dir: Option<&Path>) -> Result<()> {
    let (dir, reference) = load_reference(data_dir)?;
    println!("Reference layers in {}", dir.display());
    print_layer("rail intensity (gCO2/pkm)", &reference.rail);
    print_layer("electricity mix (gCO2/kWh)", &reference.electricity);
    Ok(())
}

fn print_layer(title: &str, layer: &RegionLayer) {
    println!("{title}: {} regions", layer.len());
    for region in layer.regions() {
        println!("  {:<4} {:<24} {:>8.1}", region.id, region.label(), region.factor);
    }
}
