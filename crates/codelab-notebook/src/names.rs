use std::collections::HashSet;

/// Hands out cell names that are unique across one conversion.
///
/// A taken name is disambiguated by appending ` 2`, ` 3`, ... to the requested base.
#[derive(Debug, Default)]
pub struct NameAllocator {
    used: HashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut suffix = 2;
        while self.used.contains(&name) {
            name = format!("{} {}", base, suffix);
            suffix += 1;
        }
        self.used.insert(name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unused_name_is_returned_as_is() {
        let mut names = NameAllocator::new();
        assert_eq!(names.allocate("Setup"), "Setup");
        assert_eq!(names.allocate("Setup 1"), "Setup 1");
    }

    #[test]
    fn collisions_probe_numeric_suffixes() {
        let mut names = NameAllocator::new();
        assert_eq!(names.allocate("Setup"), "Setup");
        assert_eq!(names.allocate("Setup"), "Setup 2");
        assert_eq!(names.allocate("Setup"), "Setup 3");
    }

    #[test]
    fn probing_skips_names_taken_verbatim() {
        let mut names = NameAllocator::new();
        names.allocate("Setup 2");
        names.allocate("Setup");
        assert_eq!(names.allocate("Setup"), "Setup 3");
    }
}
