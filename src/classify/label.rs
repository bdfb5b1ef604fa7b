use crate::error::Error;
use std::{fs, path::Path};

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum EncoderFile {
    Object { classes: Vec<String> },
    Bare(Vec<String>),
}

/// Shared mapping from class index to exercise name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub(crate) fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    /// Load the encoder at `path`; a missing file is not an error.
    pub(crate) fn load(path: &Path) -> Result<Option<Self>, Error> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::ReadLabelEncoder(e, path.to_path_buf()))?;
        let file: EncoderFile = serde_json::from_str(&contents)
            .map_err(|e| Error::ParseLabelEncoder(e, path.to_path_buf()))?;
        let classes = match file {
            EncoderFile::Object { classes } | EncoderFile::Bare(classes) => classes,
        };
        Ok(Some(Self::new(classes)))
    }

    pub(crate) fn classes(&self) -> &[String] {
        &self.classes
    }

    pub(crate) fn decode(&self, class: usize) -> Result<&str, Error> {
        self.classes
            .get(class)
            .map(String::as_str)
            .ok_or(Error::UnknownClass(class))
    }
}

/// Name of `class`, preferring the shared encoder over a model's own names.
pub(crate) fn decode(
    class: usize,
    encoder: Option<&LabelEncoder>,
    class_names: &[String],
) -> Result<String, Error> {
    if let Some(encoder) = encoder {
        return encoder.decode(class).map(str::to_owned);
    }
    if class_names.is_empty() {
        return Ok(format!("class_{}", class));
    }
    class_names
        .get(class)
        .cloned()
        .ok_or(Error::ClassOutOfRange(class, class_names.len()))
}

#[cfg(test)]
mod tests {
    use super::{decode, LabelEncoder};
    use std::io::Write;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|&n| n.to_owned()).collect()
    }

    #[test]
    fn encoder_wins_over_class_names() {
        let encoder = LabelEncoder::new(names(&["pushup", "squat"]));
        let model_names = names(&["a", "b"]);
        assert_eq!(decode(1, Some(&encoder), &model_names).unwrap(), "squat");
        assert!(decode(2, Some(&encoder), &model_names).is_err());
        assert_eq!(decode(0, None, &model_names).unwrap(), "a");
    }

    #[test]
    fn fallback_name_only_without_class_names() {
        assert_eq!(decode(4, None, &[]).unwrap(), "class_4");
        assert!(decode(2, None, &names(&["a"])).is_err());
        assert!(decode(5, None, &names(&["squat", "pushup"])).is_err());
    }

    #[test]
    fn load_both_layouts() {
        let dir = tempfile::tempdir().unwrap();
        let object = dir.path().join("object.json");
        write!(
            std::fs::File::create(&object).unwrap(),
            r#"{{"classes": ["pushup", "squat"]}}"#
        )
        .unwrap();
        let bare = dir.path().join("bare.json");
        std::fs::write(&bare, r#"["pushup", "squat"]"#).unwrap();

        let expected = LabelEncoder::new(names(&["pushup", "squat"]));
        assert_eq!(LabelEncoder::load(&object).unwrap(), Some(expected.clone()));
        assert_eq!(LabelEncoder::load(&bare).unwrap(), Some(expected));
        assert_eq!(
            LabelEncoder::load(&dir.path().join("missing.json")).unwrap(),
            None
        );

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{").unwrap();
        assert!(LabelEncoder::load(&broken).is_err());
    }
}
