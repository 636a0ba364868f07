mod types;

pub use types::SourceChunks;

use crate::shared::languages::LanguageProfile;

/// Split `source` into a preamble and function-level units.
///
/// A new unit starts at every line matching the language's unit-boundary
/// pattern; everything before the first boundary is the preamble. Lines keep
/// their original terminators, so `SourceChunks::reassemble` is exact.
pub fn split_chunks(source: &str, profile: &LanguageProfile) -> SourceChunks {
    let mut preamble = String::new();
    let mut units: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    for line in source.split_inclusive('\n') {
        if profile.is_unit_boundary(line) {
            if let Some(unit) = current.take() {
                units.push(unit);
            }
            current = Some(line.to_string());
        } else if let Some(unit) = current.as_mut() {
            unit.push_str(line);
        } else {
            preamble.push_str(line);
        }
    }
    if let Some(unit) = current {
        units.push(unit);
    }

    SourceChunks { preamble, units }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::languages::get_language_by_slug;
    use pretty_assertions::assert_eq;

    fn python() -> &'static crate::shared::languages::LanguageProfile {
        get_language_by_slug("python").unwrap()
    }

    #[test]
    fn splits_preamble_and_units() {
        let source = "import os\n\ndef a():\n    return 1\n\ndef b():\n    return 2\n";
        let chunks = split_chunks(source, python());
        assert_eq!(chunks.preamble, "import os\n\n");
        assert_eq!(chunks.units.len(), 2);
        assert_eq!(chunks.units[0], "def a():\n    return 1\n\n");
        assert_eq!(chunks.units[1], "def b():\n    return 2\n");
    }

    #[test]
    fn reassembly_is_byte_exact() {
        let source = "#!/usr/bin/env python\nimport sys\n\nclass C:\n    def m(self):\n        pass\n\ndef main():\n    sys.exit(0)\n";
        let chunks = split_chunks(source, python());
        assert_eq!(chunks.reassemble(), source);
    }

    #[test]
    fn file_without_units_is_all_preamble() {
        let source = "x = 1\ny = 2\n";
        let chunks = split_chunks(source, python());
        assert_eq!(chunks.preamble, source);
        assert!(chunks.units.is_empty());
    }

    #[test]
    fn missing_trailing_newline_survives_reassembly() {
        let source = "def a():\n    return 1";
        let chunks = split_chunks(source, python());
        assert_eq!(chunks.units, vec!["def a():\n    return 1".to_string()]);
        assert_eq!(chunks.reassemble(), source);
    }

    #[test]
    fn indented_methods_start_units() {
        let source = "class C:\n    def m(self):\n        pass\n";
        let chunks = split_chunks(source, python());
        // `class` and the indented `def` each open a unit
        assert_eq!(chunks.units.len(), 2);
        assert_eq!(chunks.preamble, "");
        assert_eq!(chunks.reassemble(), source);
    }

    #[test]
    fn rust_functions_split_on_fn() {
        let rust = get_language_by_slug("rust").unwrap();
        let source = "use std::io;\n\nfn a() {}\n\npub fn b() {}\n";
        let chunks = split_chunks(source, rust);
        assert_eq!(chunks.preamble, "use std::io;\n\n");
        assert_eq!(chunks.units.len(), 2);
        assert_eq!(chunks.reassemble(), source);
    }
}
