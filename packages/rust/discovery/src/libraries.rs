//! Built-in library enumeration.

use kwdoc_shared::{DiscoveryUnit, UnitKind};

/// Standard libraries shipped with the automation framework.
pub const BUILTIN_LIBRARIES: &[&str] = &[
    "BuiltIn",
    "Collections",
    "DateTime",
    "Dialogs",
    "Easter",
    "OperatingSystem",
    "Process",
    "Remote",
    "Reserved",
    "Screenshot",
    "String",
    "Telnet",
    "XML",
];

/// Built-in library names minus `excluded`, sorted.
pub fn builtin_libraries<S: AsRef<str>>(excluded: &[S]) -> Vec<String> {
    let mut names: Vec<String> = BUILTIN_LIBRARIES
        .iter()
        .filter(|name| !excluded.iter().any(|ex| ex.as_ref() == **name))
        .map(|name| (*name).to_string())
        .collect();
    names.sort();
    names
}

/// Built-in libraries as discovery units.
pub fn builtin_units<S: AsRef<str>>(excluded: &[S]) -> Vec<DiscoveryUnit> {
    builtin_libraries(excluded)
        .into_iter()
        .map(|name| DiscoveryUnit::library(name, UnitKind::BuiltinLibrary))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_exclusions_drop_non_representative_libraries() {
        let names = builtin_libraries(&["Easter", "Reserved"]);
        assert!(!names.iter().any(|n| n == "Easter" || n == "Reserved"));
        assert!(names.iter().any(|n| n == "BuiltIn"));
        assert_eq!(names.len(), BUILTIN_LIBRARIES.len() - 2);
    }

    #[test]
    fn names_are_sorted() {
        let names = builtin_libraries::<&str>(&[]);
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn units_carry_builtin_kind() {
        let units = builtin_units(&["Easter"]);
        assert!(units.iter().all(|u| u.kind == UnitKind::BuiltinLibrary));
        assert!(units.iter().all(|u| u.identifier == u.display_name));
    }
}
