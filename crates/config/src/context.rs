//! Compile context threaded through the scanner and parser.

/// Target selection for a compile pass.
///
/// A stanza tree can describe many environments; a single pass always
/// compiles against one concrete target environment, and optionally a
/// single application within it.
#[derive(Debug, Clone)]
pub struct CompileContext {
    /// The environment this pass compiles for. Stanzas for any other
    /// environment are skipped wholesale; `*` stanzas are rewritten to
    /// this name.
    pub environment: String,
    /// Optional application filter; when set, application stanzas with
    /// any other name are skipped.
    pub application: Option<String>,
}

impl CompileContext {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            application: None,
        }
    }

    #[must_use]
    pub fn with_application(mut self, application: impl Into<String>) -> Self {
        self.application = Some(application.into());
        self
    }
}
