use crate::resource::ObjectMeta;

/// Annotation holding the name of the external object.
pub const ANNOTATION_EXTERNAL_NAME: &str = "crossplane.io/external-name";

/// Name of the backend object a record maps to.
///
/// Reads the external-name annotation; a record that was never annotated
/// maps to an object named after the record itself.
pub fn external_name(meta: &ObjectMeta) -> &str {
    meta.annotations
        .get(ANNOTATION_EXTERNAL_NAME)
        .map(String::as_str)
        .filter(|n| !n.is_empty())
        .unwrap_or(&meta.name)
}

pub fn set_external_name(meta: &mut ObjectMeta, name: impl Into<String>) {
    meta.annotations
        .insert(ANNOTATION_EXTERNAL_NAME.to_string(), name.into());
}

pub fn has_external_name(meta: &ObjectMeta) -> bool {
    meta.annotations
        .get(ANNOTATION_EXTERNAL_NAME)
        .is_some_and(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_wins_over_record_name() {
        let mut meta = ObjectMeta::new("record");
        set_external_name(&mut meta, "backend");
        assert_eq!(external_name(&meta), "backend");
        assert!(has_external_name(&meta));
    }

    #[test]
    fn falls_back_to_record_name() {
        let meta = ObjectMeta::new("record");
        assert_eq!(external_name(&meta), "record");
        assert!(!has_external_name(&meta));
    }

    #[test]
    fn empty_annotation_is_ignored() {
        let mut meta = ObjectMeta::new("record");
        set_external_name(&mut meta, "");
        assert_eq!(external_name(&meta), "record");
    }
}
