//! Project directory discovery.
//!
//! ```text
//! projects/
//! ├── bank/
//! │   ├── project.toml
//! │   ├── models/*.toml
//! │   ├── views/*.toml
//! │   └── overlays/*.toml
//! └── bank-next/          (extends = "bank")
//! ```
//!
//! Files are read in sorted path order. A project may extend one sibling
//! project; the base is loaded without following its own `extends`.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use archdiag_core::declarative::{
    load_manifest_from_toml, load_model_from_toml, load_overlay_from_toml, load_views_from_toml,
    LoadFileError, ModelFile, OverlayFile, ProjectManifest,
};
use archdiag_core::{
    compose, merge_specs, Model, ModelBuilderBox, ModelError, OverlayBox, ViewSource, ViewSpec,
};

/// Manifest file name inside a project directory.
pub const MANIFEST_FILE: &str = "project.toml";

const MODELS_DIR: &str = "models";
const VIEWS_DIR: &str = "views";
const OVERLAYS_DIR: &str = "overlays";

/// Errors from opening a project directory.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// The project directory does not exist.
    #[error("project directory not found: {}", path.display())]
    NotFound {
        /// Requested directory.
        path: PathBuf,
    },

    /// The directory has no `project.toml`.
    #[error("no project.toml in {}", dir.display())]
    MissingManifest {
        /// Project directory.
        dir: PathBuf,
    },

    /// `extends` names a project that is not a sibling directory.
    #[error("base project '{name}' not found at {}", path.display())]
    BaseNotFound {
        /// Base project name from the manifest.
        name: String,
        /// Where it was looked for.
        path: PathBuf,
    },

    /// A project file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File or directory being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A project file could not be walked.
    #[error("failed to scan {}: {source}", dir.display())]
    Walk {
        /// Directory being scanned.
        dir: PathBuf,
        /// Underlying walk error.
        source: walkdir::Error,
    },

    /// A project file failed to parse or validate.
    #[error("{}: {source}", path.display())]
    Load {
        /// Offending file.
        path: PathBuf,
        /// Parse or validation error.
        source: LoadFileError,
    },
}

impl ProjectError {
    /// Whether the error means the project (or its base) does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::MissingManifest { .. } | Self::BaseNotFound { .. }
        )
    }
}

/// The view specs of one view file.
#[derive(Debug, Clone)]
pub struct ViewFile {
    name: String,
    specs: Vec<ViewSpec>,
}

impl ViewSource for ViewFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn views(&self) -> Vec<ViewSpec> {
        self.specs.clone()
    }
}

/// A loaded project directory.
#[derive(Debug, Clone)]
pub struct Project {
    dir: PathBuf,
    manifest: ProjectManifest,
    models: Vec<ModelFile>,
    views: Vec<ViewFile>,
    overlays: Vec<OverlayFile>,
    files: Vec<PathBuf>,
    base: Option<Box<Project>>,
}

impl Project {
    /// Opens a project directory and its base project, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or its manifest is missing, the base
    /// project cannot be found, or any file fails to load.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let mut project = Self::open_single(dir.as_ref())?;
        if let Some(base_name) = project.manifest.extends.clone() {
            let path = project
                .dir
                .parent()
                .map_or_else(|| PathBuf::from(&base_name), |p| p.join(&base_name));
            if !path.join(MANIFEST_FILE).is_file() {
                return Err(ProjectError::BaseNotFound {
                    name: base_name,
                    path,
                });
            }
            let base = Self::open_single(&path)?;
            if let Some(grand) = &base.manifest.extends {
                tracing::warn!(
                    "Base project '{base_name}' extends '{grand}'; only one level of extends is followed"
                );
            }
            tracing::debug!("Project '{}' extends '{base_name}'", project.name());
            project.base = Some(Box::new(base));
        }
        Ok(project)
    }

    fn open_single(dir: &Path) -> Result<Self, ProjectError> {
        if !dir.is_dir() {
            return Err(ProjectError::NotFound {
                path: dir.to_path_buf(),
            });
        }
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(ProjectError::MissingManifest {
                dir: dir.to_path_buf(),
            });
        }
        let manifest = load_manifest_from_toml(&read(&manifest_path)?).map_err(|source| {
            ProjectError::Load {
                path: manifest_path.clone(),
                source,
            }
        })?;
        let mut files = vec![manifest_path];

        let mut models = Vec::new();
        for path in toml_files(&dir.join(MODELS_DIR))? {
            let model = load_model_from_toml(&file_label(dir, &path), &read(&path)?)
                .map_err(|source| ProjectError::Load {
                    path: path.clone(),
                    source,
                })?;
            models.push(model);
            files.push(path);
        }

        let mut views = Vec::new();
        for path in toml_files(&dir.join(VIEWS_DIR))? {
            let specs = load_views_from_toml(&read(&path)?).map_err(|source| ProjectError::Load {
                path: path.clone(),
                source,
            })?;
            views.push(ViewFile {
                name: file_label(dir, &path),
                specs,
            });
            files.push(path);
        }

        let mut overlays = Vec::new();
        for path in toml_files(&dir.join(OVERLAYS_DIR))? {
            let overlay = load_overlay_from_toml(&file_label(dir, &path), &read(&path)?)
                .map_err(|source| ProjectError::Load {
                    path: path.clone(),
                    source,
                })?;
            overlays.push(overlay);
            files.push(path);
        }

        tracing::debug!(
            "Loaded {}: {} model file(s), {} view file(s), {} overlay file(s)",
            dir.display(),
            models.len(),
            views.len(),
            overlays.len()
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            manifest,
            models,
            views,
            overlays,
            files,
            base: None,
        })
    }

    /// Project directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Manifest name, falling back to the directory name.
    #[must_use]
    pub fn name(&self) -> String {
        self.manifest.name.clone().unwrap_or_else(|| {
            self.dir
                .file_name()
                .map_or_else(String::new, |n| n.to_string_lossy().into_owned())
        })
    }

    /// Parsed `project.toml`.
    #[must_use]
    pub fn manifest(&self) -> &ProjectManifest {
        &self.manifest
    }

    /// The base project this one extends.
    #[must_use]
    pub fn base(&self) -> Option<&Project> {
        self.base.as_deref()
    }

    /// Name written into the document: `workspace_name`, else `name`, else
    /// the directory name.
    #[must_use]
    pub fn workspace_name(&self) -> String {
        self.manifest
            .workspace_name
            .clone()
            .unwrap_or_else(|| self.name())
    }

    /// Model builders in composition order: base project files, then this
    /// project's files.
    #[must_use]
    pub fn model_builders(&self) -> Vec<ModelBuilderBox> {
        let base = self.base.iter().flat_map(|b| b.models.iter());
        base.chain(self.models.iter())
            .map(|m| Box::new(m.clone()) as ModelBuilderBox)
            .collect()
    }

    /// Composes a fresh model from every model file.
    ///
    /// # Errors
    ///
    /// Returns the first unresolved reference.
    pub fn compose(&self) -> Result<Model, ModelError> {
        let description = if self.manifest.description.is_empty() {
            self.base
                .as_ref()
                .map(|b| b.manifest.description.clone())
                .unwrap_or_default()
        } else {
            self.manifest.description.clone()
        };
        let model = Model::new(self.workspace_name(), description);
        compose(model, &self.model_builders())
    }

    /// This project's overlays. Base project overlays are not inherited.
    #[must_use]
    pub fn overlays(&self) -> Vec<OverlayBox> {
        self.overlays
            .iter()
            .map(|o| Box::new(o.clone()) as OverlayBox)
            .collect()
    }

    /// View files of this project.
    #[must_use]
    pub fn view_files(&self) -> &[ViewFile] {
        &self.views
    }

    /// Every view spec, with base project views merged underneath.
    #[must_use]
    pub fn view_specs(&self) -> Vec<ViewSpec> {
        let own = collect_specs(&self.views);
        let base = self
            .base
            .as_ref()
            .map(|b| collect_specs(&b.views))
            .unwrap_or_default();
        merge_specs(base, own)
    }

    /// Every file that contributed to this project, base included, sorted.
    #[must_use]
    pub fn source_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self
            .base
            .iter()
            .flat_map(|b| b.files.iter())
            .chain(self.files.iter())
            .cloned()
            .collect();
        files.sort();
        files.dedup();
        files
    }
}

/// Names of the project directories under `projects_dir`, sorted.
///
/// A directory counts as a project when it holds a `project.toml`.
///
/// # Errors
///
/// Returns an error if `projects_dir` is missing or unreadable.
pub fn list_projects(projects_dir: &Path) -> Result<Vec<String>, ProjectError> {
    if !projects_dir.is_dir() {
        return Err(ProjectError::NotFound {
            path: projects_dir.to_path_buf(),
        });
    }
    let mut names = Vec::new();
    for entry in WalkDir::new(projects_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| ProjectError::Walk {
            dir: projects_dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_dir() && entry.path().join(MANIFEST_FILE).is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

fn collect_specs(files: &[ViewFile]) -> Vec<ViewSpec> {
    files.iter().flat_map(ViewSource::views).collect()
}

/// `*.toml` files below `dir` in sorted path order; a missing dir is empty.
fn toml_files(dir: &Path) -> Result<Vec<PathBuf>, ProjectError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|source| ProjectError::Walk {
            dir: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|e| e == "toml") {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// `models/shop.toml` style label used in logs.
fn file_label(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn read(path: &Path) -> Result<String, ProjectError> {
    std::fs::read_to_string(path).map_err(|source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn missing_directory_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = Project::open(tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
        assert!(err.is_not_found());
    }

    #[test]
    fn missing_manifest_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = Project::open(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::MissingManifest { .. }));
        assert!(err.is_not_found());
    }

    #[test]
    fn files_load_in_sorted_order() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "project.toml", "workspace_name = \"Shop\"\n");
        write(
            tmp.path(),
            "models/b.toml",
            "[[relationships]]\nfrom = \"A\"\nto = \"B\"\ndescription = \"calls\"\n",
        );
        write(
            tmp.path(),
            "models/a.toml",
            "[[systems]]\nname = \"A\"\n[[systems]]\nname = \"B\"\n",
        );
        write(tmp.path(), "models/notes.md", "ignored");

        let project = Project::open(tmp.path()).unwrap();
        assert_eq!(project.workspace_name(), "Shop");
        let names: Vec<String> = project
            .model_builders()
            .iter()
            .map(|b| b.name().to_string())
            .collect();
        assert_eq!(names, ["models/a.toml", "models/b.toml"]);

        let model = project.compose().unwrap();
        assert_eq!(model.name(), "Shop");
        assert_eq!(model.relationships().len(), 1);
        assert_eq!(project.source_files().len(), 3);
    }

    #[test]
    fn name_falls_back_to_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("payments");
        write(&dir, "project.toml", "");
        let project = Project::open(&dir).unwrap();
        assert_eq!(project.name(), "payments");
        assert_eq!(project.workspace_name(), "payments");
    }

    #[test]
    fn load_errors_name_the_file() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "project.toml", "");
        write(tmp.path(), "views/bad.toml", "[[views]]\nkey = \"\"\nview_type = \"Container\"\n");
        let err = Project::open(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::Load { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn extends_loads_sibling_base() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("bank");
        let next = tmp.path().join("bank-next");
        write(&base, "project.toml", "description = \"Core banking\"\n");
        write(&base, "models/core.toml", "[[systems]]\nname = \"Core\"\n");
        write(
            &base,
            "views/landscape.toml",
            "[[views]]\nkey = \"Landscape\"\nview_type = \"SystemLandscape\"\nincludes = [\"Core\"]\n",
        );
        write(&next, "project.toml", "extends = \"bank\"\n");
        write(
            &next,
            "models/ledger.toml",
            "[[systems]]\nname = \"Ledger\"\n[[relationships]]\nfrom = \"Core\"\nto = \"Ledger\"\ndescription = \"posts\"\n",
        );
        write(
            &next,
            "views/landscape.toml",
            "[[views]]\nkey = \"LandscapeNext\"\nview_type = \"SystemLandscape\"\nextends = \"Landscape\"\nincludes = [\"Ledger\"]\n",
        );

        let project = Project::open(&next).unwrap();
        assert_eq!(project.base().map(Project::name).as_deref(), Some("bank"));

        let model = project.compose().unwrap();
        assert_eq!(model.description(), "Core banking");
        assert!(model.contains("Core"));
        assert!(model.contains("Ledger"));

        let specs = project.view_specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].key, "LandscapeNext");
        assert_eq!(specs[0].includes.len(), 2);
        assert_eq!(project.source_files().len(), 6);
    }

    #[test]
    fn unknown_base_is_not_found() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "next/project.toml", "extends = \"ghost\"\n");
        let err = Project::open(tmp.path().join("next")).unwrap_err();
        assert!(matches!(err, ProjectError::BaseNotFound { ref name, .. } if name == "ghost"));
    }

    #[test]
    fn list_projects_only_counts_manifests() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "zeta/project.toml", "");
        write(tmp.path(), "alpha/project.toml", "");
        fs::create_dir_all(tmp.path().join("scratch")).unwrap();
        assert_eq!(list_projects(tmp.path()).unwrap(), ["alpha", "zeta"]);
    }
}
