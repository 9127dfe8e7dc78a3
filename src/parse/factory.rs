use crate::parse::go::GoFrontend;
use crate::parse::java::JavaFrontend;
use crate::parse::python::PythonFrontend;
use crate::parse::rust::RustFrontend;
use crate::parse::ParseFrontend;
use crate::walk::Language;

/// Create a ParseFrontend for a given language.
pub fn create_frontend(lang: Language) -> Box<dyn ParseFrontend> {
    match lang {
        Language::Java => Box::new(JavaFrontend::new()),
        Language::Python => Box::new(PythonFrontend::new()),
        Language::Go => Box::new(GoFrontend::new()),
        Language::Rust => Box::new(RustFrontend::new()),
    }
}
