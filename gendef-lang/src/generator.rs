use crate::error::EmitError;
use crate::lang::Language;
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_OUTPUT: &str = "tree.def";

pub const MACRO_NAME: &str = "DEFTYPE";

pub const BANNER: &str = "/*\n\
                          \x20* tree.def - Type definition for the `tree' structure.\n\
                          \x20*\n\
                          \x20* Automatically generated by gendef. DO NOT EDIT.\n\
                          \x20*/\n\n";

/// Where and how the definitions file is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    path: PathBuf,
    remove_on_failure: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT),
            remove_on_failure: true,
        }
    }
}

impl OutputOptions {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn path<P: Into<PathBuf>>(&mut self, path: P) -> &mut Self {
        self.path = path.into();
        self
    }

    /// Delete a partially written file when writing fails.
    pub fn remove_on_failure(&mut self, remove: bool) -> &mut Self {
        self.remove_on_failure = remove;
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.path
    }
}

/// Escapes a friendly name for use inside a C string literal.
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['"', '\\']) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    Cow::Owned(out)
}

pub fn generate<W: Write>(lang: &Language, w: &mut W) -> io::Result<()> {
    w.write_all(BANNER.as_bytes())?;

    for t in lang {
        writeln!(w, "{}({}, \"{}\")", MACRO_NAME, t.name(), escape(t.friendly_name()))?;
    }

    Ok(())
}

fn write_file(lang: &Language, f: File) -> io::Result<()> {
    let mut w = BufWriter::new(f);
    generate(lang, &mut w)?;
    w.flush()
}

/// Deletes a half-written output, but only if it is a regular file.
///
/// Symlinks, devices and pipes given as the output belong to the caller and
/// are left alone.
fn remove_partial(path: &Path) -> bool {
    match fs::symlink_metadata(path) {
        Ok(m) if m.file_type().is_file() => match fs::remove_file(path) {
            Ok(()) => {
                debug!("removed partial output");
                true
            }
            Err(e) => {
                warn!("could not remove partial output: {}", e);
                false
            }
        },
        Ok(_) => {
            warn!("output is not a regular file, leaving it in place");
            false
        }
        Err(e) => {
            warn!("could not inspect partial output: {}", e);
            false
        }
    }
}

/// Writes the definitions file, replacing any previous contents.
#[tracing::instrument(skip_all, fields(path = %options.path.display()))]
pub fn write_definitions(lang: &Language, options: &OutputOptions) -> Result<(), EmitError> {
    let path = &options.path;
    let f = File::create(path).map_err(|source| EmitError::Create {
        path: path.to_owned(),
        source,
    })?;

    if let Err(source) = write_file(lang, f) {
        if options.remove_on_failure {
            remove_partial(path);
        }
        return Err(EmitError::Write {
            path: path.to_owned(),
            source,
        });
    }

    info!(count = lang.len(), "wrote definitions");
    Ok(())
}
