use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use namefaces_core::Roster;

pub fn list(roster: &Roster) -> Result<()> {
    let refs = roster.images().list()?;
    if refs.is_empty() {
        println!("No stored images in {}", roster.images().root().display());
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new("Image"), Cell::new("Size")]);

    let mut total = 0u64;
    for image_ref in &refs {
        let size = roster
            .images()
            .path_for(image_ref)
            .and_then(|p| p.metadata().ok())
            .map(|m| m.len())
            .unwrap_or(0);
        total += size;
        table.add_row(vec![
            Cell::new(image_ref),
            Cell::new(format!("{:.1} KB", size as f64 / 1024.0)),
        ]);
    }

    println!("{table}");
    println!(
        "  {} images, {:.1} KB in {}",
        refs.len(),
        total as f64 / 1024.0,
        roster.images().root().display()
    );
    Ok(())
}

pub fn orphans(roster: &Roster) -> Result<()> {
    let orphans = roster.orphans()?;
    if orphans.is_empty() {
        println!("No orphaned images.");
    } else {
        for image_ref in &orphans {
            println!("  {image_ref}");
        }
        println!("{} orphaned images", orphans.len());
    }
    Ok(())
}

pub fn prune(roster: &Roster, yes: bool) -> Result<()> {
    if !yes {
        let count = roster.orphans()?.len();
        println!("{count} orphaned images would be deleted. Re-run with --yes to delete them.");
        return Ok(());
    }
    let removed = roster.prune_orphans()?;
    println!("Deleted {removed} orphaned images.");
    Ok(())
}
