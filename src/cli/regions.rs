use foodfleet::{checkout::RegionProvider, config::StoreConfig};

#[expect(clippy::print_stdout, reason = "command output")]
pub(crate) fn run(store: &StoreConfig) -> Result<(), String> {
    let regions = store
        .region_list()
        .map_err(|error| format!("failed to load regions: {error}"))?;

    for region in regions.regions() {
        println!("{region}");
    }

    Ok(())
}
