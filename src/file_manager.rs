//! # File Management Module
//!
//! Utilità sui nomi dei file e sulle dimensioni.
//!
//! ## Responsabilità:
//! - Determinazione del formato immagine a partire dal nome
//! - Filtri per lista di estensioni configurata
//! - Formattazione human-readable delle dimensioni
//!
//! ## Esempio:
//! ```rust,ignore
//! if FileManager::is_image("photo.JPG") {
//!     // process image
//! }
//! ```

use image::ImageFormat;
use std::path::Path;

/// File name helpers
pub struct FileManager;

impl FileManager {
    /// Check if a file name carries an image extension known to `image`
    pub fn is_image(name: &str) -> bool {
        ImageFormat::from_path(name).is_ok()
    }

    /// Check if a file name ends with one of `extensions` (case-insensitive)
    pub fn has_extension(name: &str, extensions: &[String]) -> bool {
        match Path::new(name).extension() {
            Some(ext) => {
                let ext_lower = ext.to_string_lossy().to_lowercase();
                extensions.iter().any(|allowed| allowed.to_lowercase() == ext_lower)
            }
            None => false,
        }
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}
