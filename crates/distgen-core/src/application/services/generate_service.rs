//! Generate Service - main application orchestrator.
//!
//! This service coordinates the whole generation workflow:
//! 1. Read the template file
//! 2. Render it against the bindings
//! 3. Write the result to the output file
//!
//! Any failure aborts the run; nothing is written unless rendering succeeded.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, TemplateRenderer},
    },
    domain::{Bindings, RenderedOutput},
    error::{DistgenError, DistgenResult},
};

/// One generation run: where to read, where to write, what to bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub template_path: PathBuf,
    pub output_path: PathBuf,
    pub bindings: Bindings,
}

/// Outcome of a successful run, suitable for display or JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateReport {
    pub template: PathBuf,
    pub output: PathBuf,
    pub bindings: Bindings,
    pub bytes_written: usize,
    /// Variables the template referenced that were not bound.
    pub unresolved: Vec<String>,
}

/// Main generation service.
pub struct GenerateService {
    filesystem: Box<dyn Filesystem>,
    renderer: Box<dyn TemplateRenderer>,
}

impl GenerateService {
    /// Create a new generate service with the given adapters.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use distgen_core::application::GenerateService;
    ///
    /// let service = GenerateService::new(
    ///     filesystem, // impl Filesystem
    ///     renderer,   // impl TemplateRenderer
    /// );
    /// ```
    pub fn new(filesystem: Box<dyn Filesystem>, renderer: Box<dyn TemplateRenderer>) -> Self {
        Self {
            filesystem,
            renderer,
        }
    }

    /// Read and render a template without writing anything.
    #[instrument(skip_all, fields(template = %template_path.display()))]
    pub fn render(
        &self,
        template_path: &Path,
        bindings: &Bindings,
    ) -> DistgenResult<RenderedOutput> {
        let source = self.filesystem.read_to_string(template_path)?;
        debug!(bytes = source.len(), "Template read");

        let rendered = self
            .renderer
            .render(&source, bindings)
            .map_err(|e| attach_template_path(e, template_path))?;

        if !rendered.is_complete() {
            warn!(
                unresolved = ?rendered.unresolved(),
                "Template references unbound variables"
            );
        }

        Ok(rendered)
    }

    /// Render the template and write the result.
    ///
    /// This is the main use case. The output is written in a single call, and
    /// only after rendering succeeded.
    #[instrument(
        skip_all,
        fields(
            template = %request.template_path.display(),
            output = %request.output_path.display()
        )
    )]
    pub fn generate(&self, request: &GenerateRequest) -> DistgenResult<GenerateReport> {
        let names: Vec<_> = request.bindings.iter().map(|(name, _)| name).collect();
        info!(bindings = ?names, "Generating contract source");

        let rendered = self.render(&request.template_path, &request.bindings)?;

        self.filesystem
            .write_file(&request.output_path, rendered.as_str())?;
        let bytes_written = rendered.as_str().len();
        info!(bytes = bytes_written, "Output written");

        Ok(GenerateReport {
            template: request.template_path.clone(),
            output: request.output_path.clone(),
            bindings: request.bindings.clone(),
            bytes_written,
            unresolved: rendered.unresolved().to_vec(),
        })
    }
}

/// Domain errors carry no file context; name the template they came from.
fn attach_template_path(err: DistgenError, path: &Path) -> DistgenError {
    match err {
        DistgenError::Domain(source) => ApplicationError::InvalidTemplate {
            path: path.to_path_buf(),
            source,
        }
        .into(),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::domain::{DomainError, MissingVariablePolicy, Template};

    #[derive(Default)]
    struct FakeFs {
        files: Mutex<HashMap<PathBuf, String>>,
    }

    impl FakeFs {
        fn has(&self, path: &str) -> bool {
            self.files.lock().unwrap().contains_key(Path::new(path))
        }

        fn with_file(path: &str, content: &str) -> Self {
            let fs = Self::default();
            fs.files
                .lock()
                .unwrap()
                .insert(PathBuf::from(path), content.to_owned());
            fs
        }
    }

    impl Filesystem for Arc<FakeFs> {
        fn read_to_string(&self, path: &Path) -> DistgenResult<String> {
            self.files.lock().unwrap().get(path).cloned().ok_or_else(|| {
                ApplicationError::TemplateNotFound {
                    path: path.to_path_buf(),
                }
                .into()
            })
        }

        fn write_file(&self, path: &Path, content: &str) -> DistgenResult<()> {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), content.to_owned());
            Ok(())
        }
    }

    struct EngineRenderer(MissingVariablePolicy);

    impl TemplateRenderer for EngineRenderer {
        fn render(&self, source: &str, bindings: &Bindings) -> DistgenResult<RenderedOutput> {
            Ok(Template::parse(source)?.render(bindings, self.0)?)
        }
    }

    fn service(fs: &Arc<FakeFs>, policy: MissingVariablePolicy) -> GenerateService {
        GenerateService::new(Box::new(fs.clone()), Box::new(EngineRenderer(policy)))
    }

    fn request(network: &str) -> GenerateRequest {
        GenerateRequest {
            template_path: PathBuf::from("in.template"),
            output_path: PathBuf::from("out.sol"),
            bindings: Bindings::new().with("network", network),
        }
    }

    #[test]
    fn generate_writes_rendered_output() {
        let fs = Arc::new(FakeFs::with_file("in.template", "// network: {{ network }}"));

        let report = service(&fs, MissingVariablePolicy::Empty)
            .generate(&request("testnet"))
            .unwrap();

        assert_eq!(fs.read_to_string(Path::new("out.sol")).unwrap(), "// network: testnet");
        assert_eq!(report.bytes_written, "// network: testnet".len());
        assert!(report.unresolved.is_empty());
    }

    #[test]
    fn missing_template_writes_nothing() {
        let fs = Arc::new(FakeFs::default());

        let err = service(&fs, MissingVariablePolicy::Empty)
            .generate(&request("mainnet"))
            .unwrap_err();

        assert!(matches!(
            err,
            DistgenError::Application(ApplicationError::TemplateNotFound { .. })
        ));
        assert!(!fs.has("out.sol"));
    }

    #[test]
    fn syntax_error_names_template_and_writes_nothing() {
        let fs = Arc::new(FakeFs::with_file("in.template", "{{ network"));

        let err = service(&fs, MissingVariablePolicy::Empty)
            .generate(&request("mainnet"))
            .unwrap_err();

        match err {
            DistgenError::Application(ApplicationError::InvalidTemplate { path, source }) => {
                assert_eq!(path, PathBuf::from("in.template"));
                assert!(matches!(source, DomainError::TemplateSyntax { .. }));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(!fs.has("out.sol"));
    }

    #[test]
    fn report_lists_unresolved_names() {
        let fs = Arc::new(FakeFs::with_file("in.template", "{{ network }} {{ token }}"));

        let report = service(&fs, MissingVariablePolicy::Empty)
            .generate(&request("mainnet"))
            .unwrap();

        assert_eq!(report.unresolved, ["token"]);
        assert_eq!(fs.read_to_string(Path::new("out.sol")).unwrap(), "mainnet ");
    }

    #[test]
    fn strict_policy_aborts_before_writing() {
        let fs = Arc::new(FakeFs::with_file("in.template", "{{ token }}"));

        let result = service(&fs, MissingVariablePolicy::Strict).generate(&request("mainnet"));

        assert!(result.is_err());
        assert!(!fs.has("out.sol"));
    }

    #[test]
    fn render_does_not_write() {
        let fs = Arc::new(FakeFs::with_file("in.template", "{{ network }}"));

        let rendered = service(&fs, MissingVariablePolicy::Empty)
            .render(Path::new("in.template"), &Bindings::new().with("network", "bsc"))
            .unwrap();

        assert_eq!(rendered.as_str(), "bsc");
        assert_eq!(fs.files.lock().unwrap().len(), 1);
    }
}
