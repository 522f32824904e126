use std::path::PathBuf;

/// Expand `~` in a user-supplied path.
pub fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde() {
        let expanded = expand("~/.aws/credentials");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().ends_with(".aws/credentials"));
    }

    #[test]
    fn test_expand_absolute_passthrough() {
        assert_eq!(expand("/etc/kubeconfig"), PathBuf::from("/etc/kubeconfig"));
    }
}
