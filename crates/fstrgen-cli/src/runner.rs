//! Multi-file runner: read, rewrite, write atomically, report.
//!
//! Files are independent; a failure on one never stops the others and
//! never leaves a half-written output (writes go to a temp file in the
//! destination directory, then rename).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use fstrgen_compiler::{ParseOptions, RewriteError, rewrite};

use crate::cli::Cli;

/// Outcome of one input file, for the report table.
enum Outcome {
    Wrote(PathBuf),
    Unchanged(PathBuf),
    Stdout,
    Dumped,
}

pub fn run(cli: &Cli) -> i32 {
    if cli.output.is_some() && cli.inputs.len() > 1 {
        eprintln!("error: -o/--output requires a single input file");
        return 2;
    }

    let options = ParseOptions {
        include_dirs: cli.include_dirs.clone(),
        defines: cli.defines.clone(),
        std: cli.std.clone(),
    };

    let mut failures = 0usize;
    for input in &cli.inputs {
        let display = input.display().to_string();
        match process_file(input, cli, &options) {
            Ok(Outcome::Wrote(dest)) => eprintln!("{display}: ok (wrote {})", dest.display()),
            Ok(Outcome::Unchanged(dest)) => {
                eprintln!("{display}: ok (no declarations, wrote {})", dest.display())
            }
            Ok(Outcome::Stdout) | Ok(Outcome::Dumped) => eprintln!("{display}: ok"),
            Err(message) => {
                failures += 1;
                eprintln!("{display}: FAILED ({message})");
            }
        }
    }

    if failures > 0 {
        eprintln!(
            "{} of {} file(s) failed",
            failures,
            cli.inputs.len()
        );
        1
    } else {
        0
    }
}

fn process_file(input: &Path, cli: &Cli, options: &ParseOptions) -> Result<Outcome, String> {
    let source =
        fs::read_to_string(input).map_err(|err| format!("cannot read input: {err}"))?;
    let path_key = input.to_string_lossy();

    let result = match rewrite(&source, &path_key, options.clone()) {
        Ok(result) => result,
        Err(RewriteError::Parse { diagnostics }) => {
            let rendered = diagnostics
                .printer()
                .source(&source)
                .path(&path_key)
                .colored(cli.color.should_colorize())
                .render();
            eprint!("{rendered}");
            return Err("parse failed".to_string());
        }
        Err(err) => return Err(err.to_string()),
    };

    if !result.diagnostics.is_empty() {
        let rendered = result
            .diagnostics
            .printer()
            .source(&source)
            .path(&path_key)
            .colored(cli.color.should_colorize())
            .render();
        eprint!("{rendered}");
    }

    if cli.dump_decls {
        let json = serde_json::to_string_pretty(&result.decls)
            .map_err(|err| format!("cannot serialize declarations: {err}"))?;
        println!("{json}");
        return Ok(Outcome::Dumped);
    }

    debug!(
        input = %input.display(),
        decls = result.decls.len(),
        changed = result.changed,
        "rewrite finished"
    );

    match &cli.output {
        Some(path) if path.as_os_str() == "-" => {
            print!("{}", result.output);
            Ok(Outcome::Stdout)
        }
        Some(path) => {
            write_atomic(path, &result.output)?;
            Ok(Outcome::Wrote(path.clone()))
        }
        None => {
            let dest = sibling_output(input, &cli.suffix);
            write_atomic(&dest, &result.output)?;
            if result.changed {
                Ok(Outcome::Wrote(dest))
            } else {
                Ok(Outcome::Unchanged(dest))
            }
        }
    }
}

/// `dir/foo.cpp` -> `dir/foo.<suffix>.cpp`; extensionless inputs get the
/// suffix appended.
pub fn sibling_output(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}.{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{suffix}"),
    };
    input.with_file_name(name)
}

/// Write through a temp file in the destination directory and rename, so
/// an interrupt never leaves a truncated output.
fn write_atomic(dest: &Path, contents: &str) -> Result<(), String> {
    let dir = dest.parent().filter(|p| !p.as_os_str().is_empty());
    let mut temp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir),
        None => tempfile::NamedTempFile::new_in("."),
    }
    .map_err(|err| format!("cannot create temp file: {err}"))?;

    temp.write_all(contents.as_bytes())
        .map_err(|err| format!("cannot write output: {err}"))?;
    temp.persist(dest)
        .map_err(|err| format!("cannot write {}: {err}", dest.display()))?;
    Ok(())
}
