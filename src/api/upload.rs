//! Purpose: Form parts for uploading element values to the CMS.
//! Exports: `Uploadable`, `FormPart`, `FormContent`, `UploadableText`, `UploadableCheckbox`,
//! `UploadableFiles`, `UploadFactory`.
//! Role: Produces named parts only; multipart encoding belongs to the transport.
//! Invariants: Part names are `elements[<locale>][<name>]`, file parts add `[<index>]`.
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub enum FormContent {
    Text(String),
    File {
        path: PathBuf,
        mime_type: Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub content: FormContent,
}

pub trait Uploadable {
    fn locale(&self) -> &str;
    fn element_name(&self) -> &str;
    fn to_form(&self) -> Vec<FormPart>;

    fn parameter_name(&self) -> String {
        format!("elements[{}][{}]", self.locale(), self.element_name())
    }
}

#[derive(Clone, Debug)]
pub struct UploadableText {
    locale: String,
    name: String,
    text: String,
}

impl Uploadable for UploadableText {
    fn locale(&self) -> &str {
        &self.locale
    }

    fn element_name(&self) -> &str {
        &self.name
    }

    fn to_form(&self) -> Vec<FormPart> {
        vec![FormPart {
            name: self.parameter_name(),
            content: FormContent::Text(self.text.clone()),
        }]
    }
}

/// An unchecked box sends nothing; the server reads absence as `false`.
#[derive(Clone, Debug)]
pub struct UploadableCheckbox {
    locale: String,
    name: String,
    checked: bool,
}

impl Uploadable for UploadableCheckbox {
    fn locale(&self) -> &str {
        &self.locale
    }

    fn element_name(&self) -> &str {
        &self.name
    }

    fn to_form(&self) -> Vec<FormPart> {
        if !self.checked {
            return Vec::new();
        }
        vec![FormPart {
            name: self.parameter_name(),
            content: FormContent::Text("on".to_string()),
        }]
    }
}

#[derive(Clone, Debug)]
pub struct UploadableFiles {
    locale: String,
    name: String,
    files: Vec<PathBuf>,
    mime_type: Option<String>,
}

impl UploadableFiles {
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl Uploadable for UploadableFiles {
    fn locale(&self) -> &str {
        &self.locale
    }

    fn element_name(&self) -> &str {
        &self.name
    }

    fn to_form(&self) -> Vec<FormPart> {
        let base = self.parameter_name();
        self.files
            .iter()
            .enumerate()
            .map(|(index, path)| FormPart {
                name: format!("{base}[{index}]"),
                content: FormContent::File {
                    path: path.clone(),
                    mime_type: self.mime_type.clone(),
                },
            })
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct UploadFactory {
    locale: String,
}

impl UploadFactory {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }

    pub fn text(&self, name: impl Into<String>, text: impl Into<String>) -> UploadableText {
        UploadableText {
            locale: self.locale.clone(),
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn checkbox(&self, name: impl Into<String>, checked: bool) -> UploadableCheckbox {
        UploadableCheckbox {
            locale: self.locale.clone(),
            name: name.into(),
            checked,
        }
    }

    pub fn file(&self, name: impl Into<String>, path: impl Into<PathBuf>) -> UploadableFiles {
        self.files(name, [path.into()])
    }

    pub fn files<I>(&self, name: impl Into<String>, paths: I) -> UploadableFiles
    where
        I: IntoIterator,
        I::Item: Into<PathBuf>,
    {
        UploadableFiles {
            locale: self.locale.clone(),
            name: name.into(),
            files: paths.into_iter().map(Into::into).collect(),
            mime_type: None,
        }
    }

    /// Image uploads are sent as JPEG.
    pub fn images<I>(&self, name: impl Into<String>, paths: I) -> UploadableFiles
    where
        I: IntoIterator,
        I::Item: Into<PathBuf>,
    {
        self.files(name, paths).with_mime_type("image/jpeg")
    }
}

/// Parts of several uploadables, in order.
pub fn form_parts(elements: &[&dyn Uploadable]) -> Vec<FormPart> {
    elements.iter().flat_map(|element| element.to_form()).collect()
}
