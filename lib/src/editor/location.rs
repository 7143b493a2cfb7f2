use super::Error;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Where the bytes of a class come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassSource {
    /// Standalone `.class` file
    File(PathBuf),

    /// Entry inside a jar (eg. `a/b/C.class`)
    Jar { jar: PathBuf, entry: String },
}

impl ClassSource {
    /// Class named `class_name` (`a.b.C`) inside a jar
    pub fn in_jar(jar: impl AsRef<Path>, class_name: &str) -> ClassSource {
        ClassSource::Jar {
            jar: expand_home(jar.as_ref()),
            entry: class_path_in_jar_name(class_name),
        }
    }

    /// Source for a command line input: a class inside it if `class_name` is given, otherwise
    /// the file itself
    pub fn from_input(input: impl AsRef<Path>, class_name: Option<&str>) -> ClassSource {
        match class_name {
            Some(class_name) => ClassSource::in_jar(input, class_name),
            None => ClassSource::File(expand_home(input.as_ref())),
        }
    }

    pub fn read(&self) -> Result<Vec<u8>, Error> {
        match self {
            ClassSource::File(path) => Ok(fs::read(path)?),
            ClassSource::Jar { jar, entry } => {
                let mut archive = ZipArchive::new(File::open(jar)?)?;
                let mut file = archive.by_name(entry)?;
                let mut bytes = vec![];
                file.read_to_end(&mut bytes)?;
                Ok(bytes)
            }
        }
    }

    /// Path shown to the user (`lib.jar!/a/b/C.class` for jar entries)
    pub fn display_path(&self) -> PathBuf {
        match self {
            ClassSource::File(path) => path.clone(),
            ClassSource::Jar { jar, entry } => {
                PathBuf::from(format!("{}!/{}", jar.display(), entry))
            }
        }
    }
}

/// Every `.class` entry in a jar, sorted by name
pub fn classes_in_jar(jar: impl AsRef<Path>) -> Result<Vec<ClassSource>, Error> {
    let jar = expand_home(jar.as_ref());
    let archive = ZipArchive::new(File::open(&jar)?)?;
    let mut entries: Vec<String> = archive
        .file_names()
        .filter(|name| name.ends_with(".class"))
        .map(String::from)
        .collect();
    entries.sort();
    Ok(entries
        .into_iter()
        .map(|entry| ClassSource::Jar {
            jar: jar.clone(),
            entry,
        })
        .collect())
}

/// Whether a path looks like a jar (going by its extension)
pub fn is_jar(path: &Path) -> bool {
    path.extension()
        .map_or(false, |extension| extension.eq_ignore_ascii_case("jar"))
}

/// Path of a class inside a jar, from its dotted name (`a.b.C` is at `a/b/C.class`)
///
/// A trailing `.class` is accepted too.
pub fn class_path_in_jar_name(name: &str) -> String {
    let lowercase = name.to_ascii_lowercase();
    let name = match lowercase.strip_suffix(".class") {
        Some(stem) => &name[..stem.len()],
        None => name,
    };
    format!("{}.class", name.replace('.', "/"))
}

/// Replace a leading `~` with the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_owned(),
    }
}
