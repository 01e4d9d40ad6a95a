#[cfg(test)]
mod tests {
    use crate::config::{self, AppConfig};
    use std::fs;
    use tempfile::NamedTempFile;

    fn write_temp_config(content: &str) -> NamedTempFile {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), content).unwrap();
        temp_file
    }

    fn load_err(content: &str) -> String {
        let file = write_temp_config(content);
        config::load_from_file(file.path()).unwrap_err().to_string()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "sqlite://data/resource-hub.db");
        assert_eq!(config.database.max_connections, 16);
        assert_eq!(config.storage.media_root, "media");
        assert_eq!(config.storage.media_url, "/media/");
        assert!(!config.storage.verify_on_startup);
        assert_eq!(config.qr.module_size, 10);
        assert_eq!(config.qr.cache_capacity, 256);
        assert!(config.security.is_none());

        assert_eq!(config.file_types["image"], vec!["jpg", "jpeg", "png", "gif", "svg"]);
        assert_eq!(config.file_types["pdf"], vec!["pdf"]);
        assert_eq!(config.file_types.len(), 2);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let file = write_temp_config(
            r#"
[server]
host = "0.0.0.0"
port = 3000

[storage]
public_base_url = "https://files.example.org/"

[file_types]
document = ["doc", "docx"]

[qr]
module_size = 4
cache_capacity = 0

[security]
enable_hsts = true
"#,
        );

        let config = config::load_from_file(file.path()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        // Untouched keys keep their defaults
        assert_eq!(config.database.url, "sqlite://data/resource-hub.db");
        assert_eq!(config.storage.media_url, "/media/");
        assert_eq!(config.storage.public_base_url, "https://files.example.org/");
        assert_eq!(config.file_types["document"], vec!["doc", "docx"]);
        assert!(config.file_types.contains_key("image"));
        assert_eq!(config.qr.module_size, 4);
        assert_eq!(config.qr.cache_capacity, 0);
        assert_eq!(config.security.and_then(|s| s.enable_hsts), Some(true));
    }

    #[test]
    fn test_invalid_server_port() {
        let err = load_err("[server]\nport = 0\n");
        assert!(err.contains("invalid server.port"), "{}", err);
    }

    #[test]
    fn test_invalid_max_connections() {
        let err = load_err("[database]\nmax_connections = 0\n");
        assert!(err.contains("database.max_connections"), "{}", err);
    }

    #[test]
    fn test_public_base_url_must_be_absolute() {
        for base in ["/relative", "storage.example.com", "https://", "ftp://example.com", "http://:::"] {
            let err = load_err(&format!("[storage]\npublic_base_url = \"{}\"\n", base));
            assert!(err.contains("storage.public_base_url"), "{}: {}", base, err);
        }
    }

    #[test]
    fn test_media_url_must_be_non_root_path() {
        for media_url in ["/", "media/", ""] {
            let err = load_err(&format!("[storage]\nmedia_url = \"{}\"\n", media_url));
            assert!(err.contains("storage.media_url"), "{:?}: {}", media_url, err);
        }
    }

    #[test]
    fn test_media_root_must_not_be_empty() {
        let err = load_err("[storage]\nmedia_root = \"  \"\n");
        assert!(err.contains("storage.media_root"), "{}", err);
    }

    #[test]
    fn test_qr_module_size_bounds() {
        assert!(load_err("[qr]\nmodule_size = 0\n").contains("qr.module_size"));
        assert!(load_err("[qr]\nmodule_size = 65\n").contains("qr.module_size"));
    }

    #[test]
    fn test_file_type_extension_listed_twice() {
        let err = load_err("[file_types]\ndocument = [\"PDF\"]\n");
        assert!(err.contains("listed under both"), "{}", err);
    }

    #[test]
    fn test_file_type_extension_with_dot_rejected() {
        let err = load_err("[file_types]\narchive = [\".zip\"]\n");
        assert!(err.contains("invalid extension"), "{}", err);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(config::load_from_file(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_ensure_sqlite_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/hub.db");
        config::ensure_sqlite_parent_dir(&format!("sqlite://{}?mode=rwc", nested.display())).unwrap();
        assert!(dir.path().join("a/b").is_dir());

        // Non-file URLs are left alone
        config::ensure_sqlite_parent_dir("sqlite::memory:").unwrap();
    }
}
