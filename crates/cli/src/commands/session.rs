use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use namefaces_core::images::thumbnail::DEFAULT_THUMBNAIL_SIZE;
use namefaces_core::Roster;

use super::people;

/// One line typed into the session.
#[derive(Parser, Debug, PartialEq)]
#[command(name = "nfaces", no_binary_name = true, disable_version_flag = true)]
pub(crate) enum ShellCommand {
    /// Add one person per image file
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List people in order
    Ls {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename the person at INDEX
    Rename {
        index: usize,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        name: Vec<String>,
    },
    /// Remove the person at INDEX and delete their image, after confirmation
    Rm {
        index: usize,
        /// Delete without asking
        #[arg(long)]
        yes: bool,
    },
    /// Write a square thumbnail of the person at INDEX to OUT
    Thumb {
        index: usize,
        out: PathBuf,
        #[arg(long, default_value_t = DEFAULT_THUMBNAIL_SIZE)]
        size: u32,
    },
    /// List stored images no person refers to
    Orphans,
    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

/// Split a line into words. Double quotes group words containing spaces and
/// must be closed on the same line.
pub(crate) fn split_line(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_word = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_word {
                    words.push(std::mem::take(&mut current));
                    has_word = false;
                }
            }
            c => {
                current.push(c);
                has_word = true;
            }
        }
    }
    if in_quotes {
        bail!("unclosed quote");
    }
    if has_word {
        words.push(current);
    }
    Ok(words)
}

pub fn run(roster: &mut Roster) -> Result<()> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    if interactive {
        println!("Names to Faces. Type `help` for commands.");
    }

    let mut line = String::new();
    loop {
        if interactive {
            print!("nfaces> ");
            io::stdout().flush()?;
        }

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let words = match split_line(&line) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("error: {e}");
                continue;
            }
        };
        if words.is_empty() {
            continue;
        }

        let command = match ShellCommand::try_parse_from(&words) {
            Ok(command) => command,
            Err(e) => {
                e.print()?;
                continue;
            }
        };
        if command == ShellCommand::Quit {
            break;
        }

        // Errors are reported per line; the session keeps going.
        let mut confirm = |question: &str| confirm_on_stdin(interactive, question);
        if let Err(e) = dispatch(roster, command, &mut confirm) {
            eprintln!("error: {e:#}");
        }
    }

    Ok(())
}

/// Ask a yes/no question. Without a terminal nothing can be confirmed.
fn confirm_on_stdin(interactive: bool, question: &str) -> Result<bool> {
    if !interactive {
        println!("{question} Not confirmed; pass --yes to skip the prompt.");
        return Ok(false);
    }
    print!("{question} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn dispatch(
    roster: &mut Roster,
    command: ShellCommand,
    confirm: &mut dyn FnMut(&str) -> Result<bool>,
) -> Result<()> {
    match command {
        ShellCommand::Add { paths } => people::add(roster, &paths),
        ShellCommand::Ls { json } => people::ls(roster, json),
        ShellCommand::Rename { index, name } => people::rename(roster, index, &name.join(" ")),
        ShellCommand::Rm { index, yes } => {
            let name = roster.get(index)?.name.clone();
            let question = format!("Are you sure you want to delete {name} (#{index})?");
            if yes || confirm(&question)? {
                people::rm(roster, index)
            } else {
                println!("Kept {name}.");
                Ok(())
            }
        }
        ShellCommand::Thumb { index, out, size } => people::thumb(roster, index, &out, size),
        ShellCommand::Orphans => super::images::orphans(roster),
        ShellCommand::Quit => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use namefaces_core::domain::ImageInput;
    use namefaces_core::images::RepositoryConfig;

    fn parse(line: &str) -> ShellCommand {
        ShellCommand::try_parse_from(split_line(line).unwrap()).unwrap()
    }

    fn roster_with_one(dir: &Path) -> Roster {
        let mut roster = Roster::open(RepositoryConfig::new(dir.join("images"))).unwrap();
        roster
            .add_person(ImageInput::Raster(image::DynamicImage::ImageRgb8(
                image::RgbImage::from_pixel(4, 4, image::Rgb([9, 9, 9])),
            )))
            .unwrap();
        roster
    }

    fn never_asked(_: &str) -> Result<bool> {
        panic!("confirmation should not be requested")
    }

    // ── split_line ──────────────────────────────────────────────────

    #[test]
    fn test_split_plain_words() {
        assert_eq!(
            split_line("  rename 0  Alice \n").unwrap(),
            vec!["rename", "0", "Alice"]
        );
    }

    #[test]
    fn test_split_quoted_words() {
        assert_eq!(
            split_line(r#"add "/tmp/my photos/a.jpg" b.jpg"#).unwrap(),
            vec!["add", "/tmp/my photos/a.jpg", "b.jpg"]
        );
    }

    #[test]
    fn test_split_empty_quotes_kept() {
        assert_eq!(
            split_line(r#"rename 0 """#).unwrap(),
            vec!["rename", "0", ""]
        );
    }

    #[test]
    fn test_split_unclosed_quote_is_error() {
        let err = split_line(r#"add "/tmp/my photos/a.jpg"#).unwrap_err();
        assert!(err.to_string().contains("unclosed quote"));
        assert!(split_line(r#"rename 0 ""#).is_err());
    }

    #[test]
    fn test_split_blank_line() {
        assert!(split_line("   \t\n").unwrap().is_empty());
    }

    // ── ShellCommand ────────────────────────────────────────────────

    #[test]
    fn test_parse_add_multiple() {
        assert_eq!(
            parse("add a.jpg b.png"),
            ShellCommand::Add {
                paths: vec![PathBuf::from("a.jpg"), PathBuf::from("b.png")]
            }
        );
    }

    #[test]
    fn test_parse_add_requires_path() {
        assert!(ShellCommand::try_parse_from(split_line("add").unwrap()).is_err());
    }

    #[test]
    fn test_parse_rename_multi_word() {
        assert_eq!(
            parse("rename 2 Mary Jane -Smith"),
            ShellCommand::Rename {
                index: 2,
                name: vec!["Mary".into(), "Jane".into(), "-Smith".into()]
            }
        );
    }

    #[test]
    fn test_parse_rm_rejects_negative_index() {
        assert!(ShellCommand::try_parse_from(split_line("rm -1").unwrap()).is_err());
        assert!(ShellCommand::try_parse_from(split_line("rm x").unwrap()).is_err());
    }

    #[test]
    fn test_parse_rm_yes_flag() {
        assert_eq!(parse("rm 0"), ShellCommand::Rm { index: 0, yes: false });
        assert_eq!(parse("rm 3 --yes"), ShellCommand::Rm { index: 3, yes: true });
    }

    #[test]
    fn test_parse_thumb_default_size() {
        assert_eq!(
            parse("thumb 0 out.png"),
            ShellCommand::Thumb {
                index: 0,
                out: PathBuf::from("out.png"),
                size: DEFAULT_THUMBNAIL_SIZE,
            }
        );
        assert_eq!(
            parse("thumb 1 t.jpg --size 64"),
            ShellCommand::Thumb {
                index: 1,
                out: PathBuf::from("t.jpg"),
                size: 64,
            }
        );
    }

    #[test]
    fn test_parse_ls_and_quit_alias() {
        assert_eq!(parse("ls --json"), ShellCommand::Ls { json: true });
        assert_eq!(parse("exit"), ShellCommand::Quit);
        assert_eq!(parse("quit"), ShellCommand::Quit);
    }

    // ── dispatch ────────────────────────────────────────────────────

    #[test]
    fn test_rm_declined_keeps_person_and_image() {
        let tmp = tempfile::tempdir().unwrap();
        let mut roster = roster_with_one(tmp.path());
        let image_ref = roster.get(0).unwrap().image_ref.clone();

        let mut asked = Vec::new();
        let mut decline = |question: &str| {
            asked.push(question.to_string());
            Ok(false)
        };
        dispatch(&mut roster, parse("rm 0"), &mut decline).unwrap();

        assert_eq!(asked.len(), 1);
        assert!(asked[0].contains("Are you sure"));
        assert_eq!(roster.count(), 1);
        assert!(roster.images().exists(&image_ref));
    }

    #[test]
    fn test_rm_confirmed_removes_person() {
        let tmp = tempfile::tempdir().unwrap();
        let mut roster = roster_with_one(tmp.path());
        let image_ref = roster.get(0).unwrap().image_ref.clone();

        dispatch(&mut roster, parse("rm 0"), &mut |_| Ok(true)).unwrap();
        assert_eq!(roster.count(), 0);
        assert!(!roster.images().exists(&image_ref));
    }

    #[test]
    fn test_rm_yes_skips_confirmation() {
        let tmp = tempfile::tempdir().unwrap();
        let mut roster = roster_with_one(tmp.path());

        dispatch(&mut roster, parse("rm 0 --yes"), &mut never_asked).unwrap();
        assert_eq!(roster.count(), 0);
    }

    #[test]
    fn test_rm_out_of_bounds_does_not_ask() {
        let tmp = tempfile::tempdir().unwrap();
        let mut roster = roster_with_one(tmp.path());

        assert!(dispatch(&mut roster, parse("rm 5"), &mut never_asked).is_err());
        assert_eq!(roster.count(), 1);
    }

    #[test]
    fn test_non_interactive_confirmation_declines() {
        assert!(!confirm_on_stdin(false, "Delete?").unwrap());
    }
}
