use crate::PlotError;
use clap::ValueEnum;
use pgfplots::{Engine, Picture};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Standalone LaTeX source compiled to PDF
    #[default]
    Pdf,
    /// Standalone LaTeX source only
    Tex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatexEngine {
    #[default]
    #[value(name = "lualatex")]
    LuaLatex,
    #[value(name = "pdflatex")]
    PdfLatex,
}

impl From<LatexEngine> for Engine {
    fn from(engine: LatexEngine) -> Self {
        match engine {
            LatexEngine::LuaLatex => Engine::LuaLatex,
            LatexEngine::PdfLatex => Engine::PdfLatex,
        }
    }
}

/// Where and how figures are written.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputOptions {
    pub directory: PathBuf,
    pub format: OutputFormat,
    pub engine: LatexEngine,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            format: OutputFormat::default(),
            engine: LatexEngine::default(),
        }
    }
}

impl OutputOptions {
    pub fn new(directory: impl AsRef<Path>, format: OutputFormat, engine: LatexEngine) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            format,
            engine,
        }
    }

    pub fn subdirectory(&self, name: impl AsRef<Path>) -> Self {
        Self {
            directory: self.directory.join(name),
            ..self.clone()
        }
    }

    /**
    Writes `picture` as `<jobname>.tex` and, for PDF output, compiles it to `<jobname>.pdf`.

    Returns the files written. A failed compilation leaves the `.tex` file behind.
    */
    pub fn write_picture(&self, picture: &Picture, jobname: &str) -> Result<Vec<PathBuf>, PlotError> {
        std::fs::create_dir_all(&self.directory)?;

        let tex = self.directory.join(format!("{}.tex", jobname));
        std::fs::write(&tex, picture.standalone_string())?;
        let mut written = vec![tex];

        if self.format == OutputFormat::Pdf {
            let jobname = jobname.to_string();
            picture
                .to_pdf(self.directory.as_path(), &jobname, self.engine.into())
                .map_err(|e| PlotError::Compile {
                    jobname: jobname.clone(),
                    message: format!("{:?}", e),
                })?;
            written.push(self.directory.join(format!("{}.pdf", jobname)));
        }
        info!("Wrote {}", written.last().map(|p| p.display().to_string()).unwrap_or_default());
        Ok(written)
    }
}

/// Strips the `.pdf` extension of a figure file name.
pub fn jobname(filename: &str) -> &str {
    filename.strip_suffix(".pdf").unwrap_or(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_tex_only() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputOptions::new(dir.path().join("figures"), OutputFormat::Tex, LatexEngine::LuaLatex);
        let picture = Picture::new();
        let written = output.write_picture(&picture, "dense_goodput_symbols").unwrap();
        assert_eq!(written, vec![dir.path().join("figures/dense_goodput_symbols.tex")]);
        let content = std::fs::read_to_string(&written[0]).unwrap();
        assert!(content.contains("tikzpicture"));
    }

    #[test]
    fn subdirectories() {
        let output = OutputOptions::default().subdirectory("encoder");
        assert_eq!(output.directory, PathBuf::from("./encoder"));
        assert_eq!(jobname("all_sparse_goodput_vs_symbols.pdf"), "all_sparse_goodput_vs_symbols");
    }
}
