use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use namefaces_core::error::Error;
use namefaces_core::images::thumbnail;
use namefaces_core::{AddProgress, Roster};

/// One listing row, in roster order.
#[derive(Debug, PartialEq)]
pub(crate) struct PersonRow {
    pub(crate) index: usize,
    pub(crate) name: String,
    pub(crate) image_ref: String,
    pub(crate) missing: bool,
}

pub(crate) fn person_rows(roster: &Roster) -> Vec<PersonRow> {
    roster
        .people()
        .iter()
        .enumerate()
        .map(|(index, person)| PersonRow {
            index,
            name: person.name.clone(),
            image_ref: person.image_ref.to_string(),
            missing: !roster.images().exists(&person.image_ref),
        })
        .collect()
}

pub fn add(roster: &mut Roster, paths: &[PathBuf]) -> Result<()> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    roster.add_batch(
        paths,
        Some(&mut |progress| match progress {
            AddProgress::Start { total } => {
                pb.set_length(total as u64);
                pb.set_position(0);
                pb.set_message("Storing photos...");
            }
            AddProgress::Added { path, index } => {
                pb.inc(1);
                pb.set_message(format!("#{index} <- {}", path.display()));
            }
            AddProgress::Failed { path, error } => {
                pb.inc(1);
                pb.println(format!("  skipped {}: {error}", path.display()));
            }
            AddProgress::Complete { added, failed } => {
                pb.finish_with_message(format!("{added} added, {failed} skipped"));
            }
        }),
    )?;

    Ok(())
}

pub fn ls(roster: &Roster, json: bool) -> Result<()> {
    if json {
        let people: Vec<_> = roster.people().iter().collect();
        println!("{}", serde_json::to_string_pretty(&people)?);
        return Ok(());
    }

    let rows = person_rows(roster);
    if rows.is_empty() {
        println!("No people yet. Use `add <photo>` to add someone.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new("#"), Cell::new("Name"), Cell::new("Image")]);

    for row in &rows {
        let image = if row.missing {
            Cell::new(format!("{} (missing)", row.image_ref)).fg(Color::Red)
        } else {
            Cell::new(&row.image_ref)
        };
        table.add_row(vec![Cell::new(row.index), Cell::new(&row.name), image]);
    }

    println!("{table}");
    println!("  {} people", rows.len());
    Ok(())
}

pub fn rename(roster: &mut Roster, index: usize, name: &str) -> Result<()> {
    roster.rename(index, name)?;
    println!("#{index} is now {}", roster.get(index)?.name);
    Ok(())
}

pub fn rm(roster: &mut Roster, index: usize) -> Result<()> {
    let person = roster.remove(index)?;
    println!("Removed {} (#{index})", person.name);
    Ok(())
}

/// Save a thumbnail, falling back to the placeholder when the image is gone.
pub fn thumb(roster: &Roster, index: usize, out: &Path, size: u32) -> Result<()> {
    let image = match roster.thumbnail(index, size) {
        Ok(image) => image,
        Err(Error::NotFound(image_ref)) => {
            println!("Image {image_ref} is missing, writing placeholder");
            thumbnail::placeholder(size)
        }
        Err(e) => return Err(e.into()),
    };
    image.save(out)?;
    println!("Wrote {}", out.display());
    Ok(())
}
