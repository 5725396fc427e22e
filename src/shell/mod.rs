//! Interactive command shell
//!
//! Parses the text command surface and drives volume operations. The loop is
//! generic over its reader and writer so tests can run it against in-memory
//! buffers.

use std::io::{self, BufRead, Write};

use crate::volume::{Volume, VolumeError};

pub mod content;

use content::ContentMode;

/// Shell prompt
const PROMPT: &str = "ramvol> ";

/// Runs the interactive loop until EXIT or end of input
pub fn run<R: BufRead, W: Write>(volume: &mut Volume, mut input: R, mut out: W) -> io::Result<()> {
    let mut line = String::new();
    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        if is_exit(command) {
            writeln!(out, "exiting program..")?;
            break;
        }
        dispatch(volume, command, &mut out)?;
    }
    Ok(())
}

/// EXIT is the one case-insensitive keyword
fn is_exit(command: &str) -> bool {
    command
        .split_whitespace()
        .next()
        .is_some_and(|token| token.eq_ignore_ascii_case("exit"))
}

fn dispatch<W: Write>(volume: &mut Volume, command: &str, out: &mut W) -> io::Result<()> {
    let parts: Vec<&str> = command.split_whitespace().collect();
    match parts[0] {
        "DIR" => cmd_dir(volume, &parts, out),
        "CREATE" => cmd_create(volume, &parts, out),
        "DELETE" => cmd_delete(volume, &parts, out),
        "RENAME" => cmd_rename(volume, &parts, out),
        "COPY" => cmd_copy(volume, &parts, out),
        _ => {
            writeln!(out, "unknown command")?;
            writeln!(out, "list of available commands:")?;
            writeln!(out, "DIR | CREATE | DELETE | RENAME | COPY | EXIT")
        }
    }
}

/// Splits `name.ext` at the first dot
fn split_file_name(file_name: &str) -> Option<(&str, &str)> {
    file_name.split_once('.')
}

fn cmd_dir<W: Write>(volume: &Volume, parts: &[&str], out: &mut W) -> io::Result<()> {
    let entries = volume.list();
    if entries.is_empty() {
        return writeln!(out, "no files found");
    }

    let show_sizes = parts[1..].iter().any(|&part| part == "-a");
    for entry in entries {
        if show_sizes {
            writeln!(out, "{}\t{} bytes", entry.name, entry.size)?;
        } else {
            writeln!(out, "{}", entry.name)?;
        }
    }
    Ok(())
}

fn cmd_create<W: Write>(volume: &mut Volume, parts: &[&str], out: &mut W) -> io::Result<()> {
    if parts.len() != 4 {
        writeln!(out, "invalid CREATE command")?;
        return writeln!(out, "usage: CREATE name.extension size -MODE");
    }

    let Some((name, ext)) = split_file_name(parts[1]) else {
        writeln!(out, "the file name must include its extension")?;
        return writeln!(out, "usage: name.extension");
    };

    let Ok(size) = parts[2].parse::<u16>() else {
        writeln!(out, "invalid CREATE command")?;
        return writeln!(out, "usage: CREATE name.extension size -MODE");
    };

    if volume.find(name, ext).is_some() {
        return writeln!(out, "{}.{} already exists", name, ext);
    }

    let Some(mode) = ContentMode::parse(parts[3]) else {
        writeln!(out, "invalid mode")?;
        return writeln!(out, "use -ALFA, -NUM or -HEX");
    };

    let content = mode.generate(size as usize);
    match volume.create(name, ext, &content) {
        Ok(()) => writeln!(out, "{}.{} created successfully", name, ext),
        Err(err) => writeln!(out, "{}", err),
    }
}

fn cmd_delete<W: Write>(volume: &mut Volume, parts: &[&str], out: &mut W) -> io::Result<()> {
    if parts.len() != 2 {
        writeln!(out, "invalid DELETE command")?;
        return writeln!(out, "usage: DELETE name.extension");
    }

    let Some((name, ext)) = split_file_name(parts[1]) else {
        writeln!(out, "the file name must include its extension")?;
        return writeln!(out, "usage: name.extension");
    };

    match volume.delete(name, ext) {
        Ok(()) => writeln!(out, "{} deleted successfully.", parts[1]),
        Err(VolumeError::NotFound) => writeln!(out, "WARNING: file not found"),
        Err(err) => writeln!(out, "{}", err),
    }
}

fn cmd_rename<W: Write>(volume: &mut Volume, parts: &[&str], out: &mut W) -> io::Result<()> {
    if parts.len() != 3 {
        writeln!(out, "invalid RENAME command")?;
        return writeln!(out, "usage: RENAME oldName.extension newName.extension");
    }

    let (Some(old), Some(new)) = (split_file_name(parts[1]), split_file_name(parts[2])) else {
        writeln!(out, "file names must include their extensions")?;
        return writeln!(out, "usage: name.extension");
    };

    match volume.rename(old, new) {
        Ok(()) => writeln!(out, "{} renamed to {}", parts[1], parts[2]),
        Err(VolumeError::NotFound) => writeln!(out, "WARNING: file not found"),
        Err(err) => writeln!(out, "WARNING: {}", err),
    }
}

fn cmd_copy<W: Write>(volume: &mut Volume, parts: &[&str], out: &mut W) -> io::Result<()> {
    if parts.len() != 3 {
        writeln!(out, "invalid COPY command")?;
        return writeln!(out, "usage: COPY source.extension destination.extension");
    }

    let (Some(src), Some(dest)) = (split_file_name(parts[1]), split_file_name(parts[2])) else {
        writeln!(out, "file names must include their extensions")?;
        return writeln!(out, "usage: name.extension");
    };

    match volume.duplicate(src, dest) {
        Ok(()) => writeln!(out, "{} copied successfully.", parts[2]),
        Err(VolumeError::NotFound) => writeln!(out, "WARNING: source file not found"),
        Err(VolumeError::AlreadyExists) => {
            writeln!(out, "WARNING: destination file already exists")
        }
        Err(err) => writeln!(out, "{}", err),
    }
}
