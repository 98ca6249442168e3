//! Distribution metadata written into source archives.

use std::path::Path;

use anyhow::Result;

use crate::util::config::PackageConfig;
use crate::util::fs::read_to_string;

/// Core metadata of the distribution (the subset PKG-INFO needs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    pub summary: String,
    pub home_page: Option<String>,
    pub requires_python: String,
    pub requires_dist: Vec<String>,
    pub description: Option<String>,
}

impl PackageMetadata {
    /// Collect metadata from the package config and the files it names.
    ///
    /// A missing README or requirements file is not an error; the matching
    /// field is simply left empty.
    pub fn load(project_root: &Path, package: &PackageConfig, version: String) -> Result<Self> {
        let readme = project_root.join(&package.readme);
        let description = if readme.is_file() {
            Some(read_to_string(&readme)?)
        } else {
            tracing::warn!("README not found: {}", readme.display());
            None
        };

        let requirements = project_root.join(&package.requirements);
        let requires_dist = if requirements.is_file() {
            parse_requirements(&read_to_string(&requirements)?)
        } else {
            Vec::new()
        };

        Ok(PackageMetadata {
            name: package.name.clone(),
            version,
            summary: package.summary.clone(),
            home_page: package.url.clone(),
            requires_python: ">=3.6".to_string(),
            requires_dist,
            description,
        })
    }

    /// Base name of the source archive, `<name>-<version>`.
    pub fn dist_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// Render the metadata in PKG-INFO format.
    pub fn to_pkg_info(&self) -> String {
        let mut fields = vec![
            ("Metadata-Version", "2.1".to_string()),
            ("Name", self.name.clone()),
            ("Version", self.version.clone()),
            ("Summary", self.summary.clone()),
        ];
        if let Some(ref url) = self.home_page {
            fields.push(("Home-page", url.clone()));
        }
        fields.push(("License", "GPLv3+".to_string()));
        fields.push(("Requires-Python", self.requires_python.clone()));
        for req in &self.requires_dist {
            fields.push(("Requires-Dist", req.clone()));
        }
        if self.description.is_some() {
            fields.push(("Description-Content-Type", "text/markdown".to_string()));
        }

        let mut out: String = fields
            .iter()
            .map(|(key, value)| format!("{}: {}\n", key, value))
            .collect();
        if let Some(ref description) = self.description {
            out.push('\n');
            out.push_str(description);
        }
        out
    }
}

/// Requirement lines, skipping blanks and comments.
pub fn parse_requirements(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_requirements() {
        let reqs = parse_requirements("# runtime\ncython\n\n  numpy>=1.16 \n");
        assert_eq!(reqs, vec!["cython", "numpy>=1.16"]);
    }

    #[test]
    fn test_load_and_render() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("README.md"), "# Solvespace\n").unwrap();
        std::fs::write(tmp.path().join("requirements.txt"), "cython\n").unwrap();

        let meta =
            PackageMetadata::load(tmp.path(), &PackageConfig::default(), "3.0.1".to_string())
                .unwrap();
        assert_eq!(meta.dist_name(), "python_solvespace-3.0.1");

        let info = meta.to_pkg_info();
        assert!(info.starts_with("Metadata-Version: 2.1\nName: python_solvespace\n"));
        assert!(info.contains("Version: 3.0.1\n"));
        assert!(info.contains("Requires-Dist: cython\n"));
        assert!(info.contains("Description-Content-Type: text/markdown\n\n# Solvespace\n"));
    }

    #[test]
    fn test_missing_optional_files() {
        let tmp = TempDir::new().unwrap();
        let meta =
            PackageMetadata::load(tmp.path(), &PackageConfig::default(), "1.0".to_string())
                .unwrap();

        assert!(meta.description.is_none());
        assert!(meta.requires_dist.is_empty());
        assert!(!meta.to_pkg_info().contains("Description-Content-Type"));
    }

    #[test]
    fn test_pkg_info_layout() {
        let meta = PackageMetadata {
            name: "python_solvespace".to_string(),
            version: "3.0.7".to_string(),
            summary: "Python library of Solvespace.".to_string(),
            home_page: Some("https://github.com/KmolYuan/solvespace".to_string()),
            requires_python: ">=3.6".to_string(),
            requires_dist: vec!["cython".to_string(), "numpy".to_string()],
            description: Some("# Solvespace\n".to_string()),
        };

        assert_eq!(
            meta.to_pkg_info(),
            "Metadata-Version: 2.1\n\
             Name: python_solvespace\n\
             Version: 3.0.7\n\
             Summary: Python library of Solvespace.\n\
             Home-page: https://github.com/KmolYuan/solvespace\n\
             License: GPLv3+\n\
             Requires-Python: >=3.6\n\
             Requires-Dist: cython\n\
             Requires-Dist: numpy\n\
             Description-Content-Type: text/markdown\n\
             \n\
             # Solvespace\n"
        );
    }
}
